//! Article entity.

use crate::validation::rules::{non_blank, not_blank, web_url};
use crate::ArticleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tag marking an article as a product showcase.
pub const PRODUCT_TAG: &str = "product";

/// Article stored in the primary document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Immutable identifier.
    pub id: ArticleId,

    /// Display title; the slug is derived from it.
    pub title: String,

    /// Short description shown in listings.
    pub description: String,

    /// Markdown body.
    pub content: String,

    /// Cover image URL.
    pub cover_image: Option<String>,

    /// External product link.
    pub product_url: Option<String>,

    /// Free-form tags.
    pub tags: Vec<String>,

    /// Archived articles are hidden from public listings.
    pub archived: bool,

    /// Store-unique URL-safe alternate key.
    pub slug: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Builds a new article from validated input and an assigned slug.
    #[must_use]
    pub fn new(input: NewArticle, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: ArticleId::new(),
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            content: input.content,
            cover_image: non_blank(input.cover_image),
            product_url: non_blank(input.product_url),
            tags: normalize_tags(input.tags),
            archived: false,
            slug,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks if the article carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Applies a set of store-level changes and bumps `updated_at`.
    pub fn apply(&mut self, changes: &ArticleChanges) {
        let patch = &changes.patch;
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
        if let Some(cover_image) = &patch.cover_image {
            self.cover_image = non_blank(cover_image.clone());
        }
        if let Some(product_url) = &patch.product_url {
            self.product_url = non_blank(product_url.clone());
        }
        if let Some(tags) = &patch.tags {
            self.tags = normalize_tags(tags.clone());
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        if let Some(slug) = &changes.slug {
            self.slug.clone_from(slug);
        }
        self.updated_at = Utc::now();
    }

    /// Returns the listing projection of this article.
    #[must_use]
    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary::from(self)
    }
}

/// Listing projection of an article; the body is left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub title: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub product_url: Option<String>,
    pub tags: Vec<String>,
    pub archived: bool,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            description: article.description.clone(),
            cover_image: article.cover_image.clone(),
            product_url: article.product_url.clone(),
            tags: article.tags.clone(),
            archived: article.archived,
            slug: article.slug.clone(),
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// Input for creating an article.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewArticle {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: String,

    #[validate(length(min = 1, max = 300), custom(function = "not_blank"))]
    pub description: String,

    #[validate(custom(function = "not_blank"))]
    pub content: String,

    pub cover_image: Option<String>,

    #[validate(custom(function = "web_url"))]
    pub product_url: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewArticle {
    /// Trims the link fields and drops blank ones, ahead of validation.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            cover_image: non_blank(self.cover_image),
            product_url: non_blank(self.product_url),
            ..self
        }
    }
}

/// Partial update of an article.
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears
/// the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ArticlePatch {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 300))]
    pub description: Option<String>,

    #[validate(custom(function = "not_blank"))]
    pub content: Option<String>,

    pub cover_image: Option<Option<String>>,

    pub product_url: Option<Option<String>>,

    pub tags: Option<Vec<String>>,

    pub archived: Option<bool>,
}

impl ArticlePatch {
    /// Patch that only flips the archived flag.
    #[must_use]
    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }

    /// Trims the link fields ahead of validation. A blank link clears the
    /// stored value.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            cover_image: self.cover_image.map(non_blank),
            product_url: self.product_url.map(non_blank),
            ..self
        }
    }

    /// Checks whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.content.is_none()
            && self.cover_image.is_none()
            && self.product_url.is_none()
            && self.tags.is_none()
            && self.archived.is_none()
    }

    /// Validates the nested product URL, which the derive cannot reach.
    pub fn validate_product_url(&self) -> Result<(), validator::ValidationError> {
        match &self.product_url {
            Some(Some(url)) => web_url(url),
            _ => Ok(()),
        }
    }
}

/// Changes handed to the primary store: the caller's patch plus a slug when
/// the title changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleChanges {
    pub patch: ArticlePatch,
    pub slug: Option<String>,
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidateExt;

    fn new_article() -> NewArticle {
        NewArticle {
            title: "  Hello World!  ".to_string(),
            description: "A first post".to_string(),
            content: "# Hello".to_string(),
            cover_image: None,
            product_url: Some("https://example.com".to_string()),
            tags: vec![" product ".to_string(), String::new()],
        }
    }

    #[test]
    fn test_new_article_trims_fields() {
        let article = Article::new(new_article(), "hello-world".to_string());
        assert_eq!(article.title, "Hello World!");
        assert_eq!(article.tags, vec!["product".to_string()]);
        assert!(article.has_tag(PRODUCT_TAG));
        assert!(!article.archived);
        assert_eq!(article.created_at, article.updated_at);
    }

    #[test]
    fn test_new_article_validation() {
        assert!(new_article().validate_request().is_ok());

        let mut input = new_article();
        input.title = "x".repeat(101);
        assert!(input.validate_request().is_err());

        let mut input = new_article();
        input.content = "   ".to_string();
        assert!(input.validate_request().is_err());

        let mut input = new_article();
        input.product_url = Some("not a url".to_string());
        assert!(input.validate_request().is_err());
    }

    #[test]
    fn test_apply_changes() {
        let mut article = Article::new(new_article(), "hello-world".to_string());
        let changes = ArticleChanges {
            patch: ArticlePatch {
                title: Some("Renamed".to_string()),
                cover_image: Some(Some("/cover.png".to_string())),
                product_url: Some(None),
                ..ArticlePatch::default()
            },
            slug: Some("renamed".to_string()),
        };

        article.apply(&changes);

        assert_eq!(article.title, "Renamed");
        assert_eq!(article.slug, "renamed");
        assert_eq!(article.cover_image.as_deref(), Some("/cover.png"));
        assert!(article.product_url.is_none());
        assert_eq!(article.content, "# Hello");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ArticlePatch::default().is_empty());
        assert!(!ArticlePatch::archived(true).is_empty());
    }

    #[test]
    fn test_patch_rejects_blank_title() {
        let patch = ArticlePatch {
            title: Some(String::new()),
            ..ArticlePatch::default()
        };
        assert!(patch.validate_request().is_err());
    }

    #[test]
    fn test_patch_product_url() {
        let patch = ArticlePatch {
            product_url: Some(Some("ssh://host".to_string())),
            ..ArticlePatch::default()
        };
        assert!(patch.validate_product_url().is_err());
        assert!(ArticlePatch::default().validate_product_url().is_ok());
    }

    #[test]
    fn test_blank_links_read_as_absent() {
        let input = NewArticle {
            cover_image: Some("  ".to_string()),
            product_url: Some(String::new()),
            ..new_article()
        }
        .normalized();
        assert!(input.validate_request().is_ok());
        assert!(input.cover_image.is_none());
        assert!(input.product_url.is_none());

        let patch = ArticlePatch {
            cover_image: Some(Some(String::new())),
            product_url: Some(Some(String::new())),
            ..ArticlePatch::default()
        }
        .normalized();
        assert_eq!(patch.cover_image, Some(None));
        assert_eq!(patch.product_url, Some(None));
        assert!(patch.validate_product_url().is_ok());
    }

    #[test]
    fn test_padded_link_is_trimmed_before_validation() {
        let input = NewArticle {
            product_url: Some(" https://example.com/shop ".to_string()),
            ..new_article()
        }
        .normalized();
        assert!(input.validate_request().is_ok());
        assert_eq!(input.product_url.as_deref(), Some("https://example.com/shop"));

        let patch = ArticlePatch {
            product_url: Some(Some("\thttps://example.com ".to_string())),
            ..ArticlePatch::default()
        }
        .normalized();
        assert!(patch.validate_product_url().is_ok());
        assert_eq!(patch.product_url, Some(Some("https://example.com".to_string())));
    }

    #[test]
    fn test_summary_projection() {
        let article = Article::new(new_article(), "hello-world".to_string());
        let summary = article.summary();
        assert_eq!(summary.id, article.id);
        assert_eq!(summary.slug, "hello-world");
    }
}
