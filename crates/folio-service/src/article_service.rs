//! Article service trait definition.

use folio_core::{
    Article, ArticleId, ArticlePatch, ArticleQuery, ArticleSummary, FolioResult, Interface,
    NewArticle,
};
use async_trait::async_trait;

/// Cache-aside facade over the article store.
///
/// Reads are served from the cache when possible and populate it on a miss.
/// Every mutation invalidates the affected detail keys and all list keys
/// before it returns, so the next read goes to the store.
#[async_trait]
pub trait ArticleService: Interface + Send + Sync {
    /// Gets an article by ID.
    async fn get_article(&self, id: ArticleId) -> FolioResult<Article>;

    /// Gets an article by slug.
    async fn get_article_by_slug(&self, slug: &str) -> FolioResult<Article>;

    /// Gets an article by ID when `id_or_slug` parses as one, by slug
    /// otherwise.
    async fn get_article_by_id_or_slug(&self, id_or_slug: &str) -> FolioResult<Article>;

    /// Lists article summaries matching the query.
    async fn list_articles(&self, query: &ArticleQuery) -> FolioResult<Vec<ArticleSummary>>;

    /// Lists the public product showcase: non-archived articles tagged
    /// `product`, newest first.
    async fn list_products(&self) -> FolioResult<Vec<ArticleSummary>>;

    /// Creates an article with a freshly assigned slug.
    async fn create_article(&self, input: NewArticle) -> FolioResult<Article>;

    /// Updates an article. The slug is re-derived only if the title changes.
    async fn update_article(&self, id: ArticleId, patch: ArticlePatch) -> FolioResult<Article>;

    /// Hides an article from public listings.
    async fn archive_article(&self, id: ArticleId) -> FolioResult<Article>;

    /// Makes an archived article public again.
    async fn restore_article(&self, id: ArticleId) -> FolioResult<Article>;

    /// Drops the detail entries of one article, under its ID, its slug and
    /// a previous slug if the slug just changed.
    async fn invalidate_article(&self, id: ArticleId, slug: &str, previous_slug: Option<&str>);

    /// Drops every cached article listing.
    async fn invalidate_lists(&self);
}
