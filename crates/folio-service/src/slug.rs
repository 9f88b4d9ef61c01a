//! Slug derivation and collision handling.
//!
//! A slug is the URL-safe alternate key of an article. It is derived from
//! the title and made unique against the primary store by appending a
//! numeric suffix. The lookup is only an optimisation: the store rejects a
//! duplicate slug on write, and callers retry the whole assignment.

use folio_core::{ArticleId, FolioError, FolioResult};
use folio_repository::ArticleRepository;
use folio_resilience::with_timeout;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Slug collisions found while searching for a free candidate.
pub const SLUG_COLLISIONS_TOTAL: &str = "folio_slug_collisions_total";

/// Default cap on the numeric suffix.
pub const DEFAULT_MAX_SUFFIX: u32 = 100;

/// Lowercases `title`, turns every run of characters outside `[a-z0-9]`
/// into one hyphen and strips hyphens at both ends.
///
/// ```
/// use folio_service::slug::normalize;
///
/// assert_eq!(normalize("Hello World!"), "hello-world");
/// assert_eq!(normalize("  --Rust & Tokio--  "), "rust-tokio");
/// ```
#[must_use]
pub fn normalize(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Assigns store-unique slugs.
#[derive(Clone)]
pub struct SlugAssigner {
    articles: Arc<dyn ArticleRepository>,
    max_suffix: u32,
    query_timeout: Duration,
}

impl SlugAssigner {
    /// Creates an assigner checking candidates against `articles`.
    pub fn new(articles: Arc<dyn ArticleRepository>, max_suffix: u32, query_timeout: Duration) -> Self {
        Self {
            articles,
            max_suffix,
            query_timeout,
        }
    }

    /// Returns the first free slug for `title`: the normalised base, then
    /// `base-1`, `base-2` and so on up to the suffix cap.
    ///
    /// A slug held by `exclude` counts as free, so an article keeps its own
    /// slug when it is saved again.
    ///
    /// # Errors
    ///
    /// `Validation` if the title has no slug characters, `SlugExhausted`
    /// when every candidate is taken, and any store error met while checking candidates.
    pub async fn assign(&self, title: &str, exclude: Option<ArticleId>) -> FolioResult<String> {
        let base = normalize(title);
        if base.is_empty() {
            return Err(FolioError::validation(
                "title must contain at least one letter or digit",
            ));
        }

        if self.is_free(&base, exclude).await? {
            debug!(slug = %base, "Slug assigned");
            return Ok(base);
        }

        for suffix in 1..=self.max_suffix {
            counter!(SLUG_COLLISIONS_TOTAL).increment(1);
            let candidate = format!("{base}-{suffix}");
            if self.is_free(&candidate, exclude).await? {
                debug!(slug = %candidate, "Slug assigned after collision");
                return Ok(candidate);
            }
        }

        Err(FolioError::SlugExhausted {
            base,
            attempts: self.max_suffix.saturating_add(1),
        })
    }

    async fn is_free(&self, slug: &str, exclude: Option<ArticleId>) -> FolioResult<bool> {
        let holder = with_timeout(self.query_timeout, || self.articles.find_by_slug(slug)).await?;
        Ok(match holder {
            None => true,
            Some(article) => Some(article.id) == exclude,
        })
    }
}

impl std::fmt::Debug for SlugAssigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlugAssigner")
            .field("max_suffix", &self.max_suffix)
            .field("query_timeout", &self.query_timeout)
            .finish_non_exhaustive()
    }
}
