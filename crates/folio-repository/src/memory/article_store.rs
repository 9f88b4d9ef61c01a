use super::Instrumentation;
use crate::ArticleRepository;
use async_trait::async_trait;
use folio_core::{
    Article, ArticleChanges, ArticleId, ArticleQuery, ArticleSummary, FolioError, FolioResult,
    SortOrder,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Article store backed by a map, with a unique index on slugs.
#[derive(Debug, Default)]
pub struct InMemoryArticleRepository {
    articles: Mutex<HashMap<ArticleId, Article>>,
    instrumentation: Instrumentation,
}

impl InMemoryArticleRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with articles, bypassing the slug index check.
    #[must_use]
    pub fn with_articles(articles: Vec<Article>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.articles.lock();
            for article in articles {
                map.insert(article.id, article);
            }
        }
        repo
    }

    /// Inserts an article without counting a call; simulates a write by
    /// another process.
    pub fn insert_external(&self, article: Article) {
        self.articles.lock().insert(article.id, article);
    }

    /// Number of calls made to `operation` (e.g. `"find_by_id"`).
    #[must_use]
    pub fn calls(&self, operation: &str) -> usize {
        self.instrumentation.calls(operation)
    }

    /// Number of calls made to any operation.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.instrumentation.total_calls()
    }

    /// Clears the call counters.
    pub fn reset_calls(&self) {
        self.instrumentation.reset_calls();
    }

    /// Makes every subsequent call fail with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.instrumentation.set_failing(failing);
    }

    /// Number of stored articles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.articles.lock().len()
    }

    /// Checks whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.articles.lock().is_empty()
    }
}

fn slug_held_by_other(map: &HashMap<ArticleId, Article>, slug: &str, id: ArticleId) -> bool {
    map.values().any(|a| a.slug == slug && a.id != id)
}

fn matches_query(article: &Article, query: &ArticleQuery) -> bool {
    if article.archived && !query.include_archived {
        return false;
    }
    match &query.tag {
        Some(tag) => {
            let tag = tag.to_lowercase();
            article.tags.iter().any(|t| t.to_lowercase() == tag)
        }
        None => true,
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn find_by_id(&self, id: ArticleId) -> FolioResult<Option<Article>> {
        self.instrumentation.enter("find_by_id")?;
        debug!(%id, "Finding article by id");
        Ok(self.articles.lock().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> FolioResult<Option<Article>> {
        self.instrumentation.enter("find_by_slug")?;
        debug!(slug, "Finding article by slug");
        Ok(self
            .articles
            .lock()
            .values()
            .find(|a| a.slug == slug)
            .cloned())
    }

    async fn find_many(&self, query: &ArticleQuery) -> FolioResult<Vec<ArticleSummary>> {
        self.instrumentation.enter("find_many")?;
        debug!(fingerprint = %query.fingerprint(), "Listing articles");

        let mut articles: Vec<Article> = self
            .articles
            .lock()
            .values()
            .filter(|a| matches_query(a, query))
            .cloned()
            .collect();

        articles.sort_by(|a, b| {
            (a.created_at, a.id.into_inner()).cmp(&(b.created_at, b.id.into_inner()))
        });
        if query.sort == SortOrder::NewestFirst {
            articles.reverse();
        }
        if let Some(limit) = query.limit {
            articles.truncate(limit);
        }

        Ok(articles.iter().map(ArticleSummary::from).collect())
    }

    async fn create(&self, article: &Article) -> FolioResult<Article> {
        self.instrumentation.enter("create")?;
        let mut map = self.articles.lock();
        if slug_held_by_other(&map, &article.slug, article.id) {
            return Err(FolioError::slug_taken(article.slug.clone()));
        }
        if map.contains_key(&article.id) {
            return Err(FolioError::UniqueViolation {
                field: "id",
                value: article.id.to_string(),
            });
        }
        map.insert(article.id, article.clone());
        debug!(id = %article.id, slug = %article.slug, "Article inserted");
        Ok(article.clone())
    }

    async fn update_by_id(
        &self,
        id: ArticleId,
        changes: &ArticleChanges,
    ) -> FolioResult<Option<Article>> {
        self.instrumentation.enter("update_by_id")?;
        let mut map = self.articles.lock();
        if let Some(slug) = &changes.slug {
            if slug_held_by_other(&map, slug, id) {
                return Err(FolioError::slug_taken(slug.clone()));
            }
        }
        Ok(map.get_mut(&id).map(|article| {
            article.apply(changes);
            article.clone()
        }))
    }
}
