//! Article service implementation.

use crate::article_service::ArticleService;
use crate::settings::ContentSettings;
use crate::slug::SlugAssigner;
use async_trait::async_trait;
use folio_cache::{CacheClient, CacheKeys};
use folio_core::{
    Article, ArticleChanges, ArticleId, ArticlePatch, ArticleQuery, ArticleSummary, FolioError,
    FolioResult, NewArticle, ValidateExt,
};
use folio_repository::ArticleRepository;
use folio_resilience::{with_timeout, RetryPolicy};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Cache-aside article service.
pub struct ArticleServiceImpl {
    articles: Arc<dyn ArticleRepository>,
    cache: CacheClient,
    keys: CacheKeys,
    slugs: SlugAssigner,
    settings: ContentSettings,
}

impl ArticleServiceImpl {
    /// Creates a new article service.
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        cache: CacheClient,
        keys: CacheKeys,
        settings: ContentSettings,
    ) -> Self {
        let slugs = SlugAssigner::new(
            Arc::clone(&articles),
            settings.max_slug_suffix,
            settings.query_timeout,
        );
        Self {
            articles,
            cache,
            keys,
            slugs,
            settings,
        }
    }

    /// Runs a primary store call under the query timeout.
    async fn store<T, Fut>(&self, call: Fut) -> FolioResult<T>
    where
        Fut: Future<Output = FolioResult<T>>,
    {
        with_timeout(self.settings.query_timeout, || call).await
    }

    /// Stores an article under both its ID and its slug.
    async fn cache_article(&self, article: &Article) {
        let ttl = self.settings.detail_ttl;
        self.cache
            .set(&self.keys.article_detail(article.id), article, ttl)
            .await;
        self.cache
            .set(&self.keys.article_detail(&article.slug), article, ttl)
            .await;
    }

    /// Assigns a slug if the title changes, persists the patch and retries
    /// the pair when another writer takes the slug first.
    async fn save_changes(
        &self,
        current: &Article,
        patch: &ArticlePatch,
    ) -> FolioResult<Article> {
        let new_title = patch
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| *title != current.title);

        let policy = RetryPolicy::for_conflicts(self.settings.persist_attempts);
        policy
            .execute_when(FolioError::is_unique_violation, || async move {
                let slug = match new_title {
                    Some(title) => Some(self.slugs.assign(title, Some(current.id)).await?),
                    None => None,
                };
                let changes = ArticleChanges {
                    patch: patch.clone(),
                    slug: slug.filter(|slug| *slug != current.slug),
                };
                self.store(self.articles.update_by_id(current.id, &changes))
                    .await?
                    .ok_or_else(|| FolioError::not_found("Article", current.id))
            })
            .await
    }
}

#[async_trait]
impl ArticleService for ArticleServiceImpl {
    async fn get_article(&self, id: ArticleId) -> FolioResult<Article> {
        debug!("Getting article: {}", id);

        let key = self.keys.article_detail(id);
        if let Some(article) = self.cache.get::<Article>(&key).await {
            return Ok(article);
        }

        let article = self
            .store(self.articles.find_by_id(id))
            .await?
            .ok_or_else(|| FolioError::not_found("Article", id))?;

        self.cache_article(&article).await;
        Ok(article)
    }

    async fn get_article_by_slug(&self, slug: &str) -> FolioResult<Article> {
        debug!("Getting article by slug: {}", slug);

        let key = self.keys.article_detail(slug);
        if let Some(article) = self.cache.get::<Article>(&key).await {
            return Ok(article);
        }

        let article = self
            .store(self.articles.find_by_slug(slug))
            .await?
            .ok_or_else(|| FolioError::not_found("Article", slug))?;

        self.cache_article(&article).await;
        Ok(article)
    }

    async fn get_article_by_id_or_slug(&self, id_or_slug: &str) -> FolioResult<Article> {
        match ArticleId::parse(id_or_slug) {
            Ok(id) => match self.get_article(id).await {
                Err(FolioError::NotFound { .. }) => self.get_article_by_slug(id_or_slug).await,
                result => result,
            },
            Err(_) => self.get_article_by_slug(id_or_slug).await,
        }
    }

    async fn list_articles(&self, query: &ArticleQuery) -> FolioResult<Vec<ArticleSummary>> {
        let key = self.keys.article_list(query);
        debug!("Listing articles: {}", key);

        self.cache
            .get_or_load(&key, self.settings.list_ttl, || {
                self.store(self.articles.find_many(query))
            })
            .await
    }

    async fn list_products(&self) -> FolioResult<Vec<ArticleSummary>> {
        let key = self.keys.product_list();
        let query = ArticleQuery::products();

        self.cache
            .get_or_load(&key, self.settings.list_ttl, || {
                self.store(self.articles.find_many(&query))
            })
            .await
    }

    async fn create_article(&self, input: NewArticle) -> FolioResult<Article> {
        debug!("Creating article: {}", input.title);

        let input = input.normalized();
        input.validate_request()?;

        let policy = RetryPolicy::for_conflicts(self.settings.persist_attempts);
        let article = policy
            .execute_when(FolioError::is_unique_violation, || {
                let input = input.clone();
                async move {
                    let slug = self.slugs.assign(&input.title, None).await?;
                    let article = Article::new(input, slug);
                    self.store(self.articles.create(&article)).await
                }
            })
            .await?;

        self.invalidate_article(article.id, &article.slug, None).await;
        self.invalidate_lists().await;

        info!("Article created: {} ({})", article.id, article.slug);
        Ok(article)
    }

    async fn update_article(&self, id: ArticleId, patch: ArticlePatch) -> FolioResult<Article> {
        debug!("Updating article: {}", id);

        if patch.is_empty() {
            return Err(FolioError::validation("No fields to update"));
        }
        let patch = patch.normalized();
        patch.validate_request()?;
        patch
            .validate_product_url()
            .map_err(|_| FolioError::validation("product_url: invalid URL"))?;

        let current = self
            .store(self.articles.find_by_id(id))
            .await?
            .ok_or_else(|| FolioError::not_found("Article", id))?;

        let updated = self.save_changes(&current, &patch).await?;

        let previous_slug = (updated.slug != current.slug).then_some(current.slug.as_str());
        self.invalidate_article(id, &updated.slug, previous_slug).await;
        self.invalidate_lists().await;

        info!("Article updated: {} ({})", id, updated.slug);
        Ok(updated)
    }

    async fn archive_article(&self, id: ArticleId) -> FolioResult<Article> {
        info!("Archiving article: {}", id);
        self.update_article(id, ArticlePatch::archived(true)).await
    }

    async fn restore_article(&self, id: ArticleId) -> FolioResult<Article> {
        info!("Restoring article: {}", id);
        self.update_article(id, ArticlePatch::archived(false)).await
    }

    async fn invalidate_article(&self, id: ArticleId, slug: &str, previous_slug: Option<&str>) {
        self.cache.delete(&self.keys.article_detail(id)).await;
        self.cache.delete(&self.keys.article_detail(slug)).await;
        if let Some(previous) = previous_slug {
            self.cache.delete(&self.keys.article_detail(previous)).await;
        }
    }

    async fn invalidate_lists(&self) {
        self.cache.delete(&self.keys.product_list()).await;
        self.cache
            .delete_by_pattern(&self.keys.article_list_pattern())
            .await;
    }
}

impl std::fmt::Debug for ArticleServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleServiceImpl")
            .field("keys", &self.keys)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
