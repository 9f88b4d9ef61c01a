//! Primary store trait definitions.

use folio_core::{
    Article, ArticleChanges, ArticleId, ArticleQuery, ArticleSummary, Banner, BannerId,
    BannerPatch, FolioResult, Interface,
};
use async_trait::async_trait;

/// Article store.
///
/// The store owns slug uniqueness: `create` and `update_by_id` fail with
/// `FolioError::UniqueViolation` when the slug is already held by another
/// article.
#[async_trait]
pub trait ArticleRepository: Interface + Send + Sync {
    /// Finds an article by ID.
    async fn find_by_id(&self, id: ArticleId) -> FolioResult<Option<Article>>;

    /// Finds an article by slug.
    async fn find_by_slug(&self, slug: &str) -> FolioResult<Option<Article>>;

    /// Lists article summaries matching the query.
    async fn find_many(&self, query: &ArticleQuery) -> FolioResult<Vec<ArticleSummary>>;

    /// Inserts a new article.
    async fn create(&self, article: &Article) -> FolioResult<Article>;

    /// Applies changes to an article, returning the updated article or
    /// `None` if it does not exist.
    async fn update_by_id(
        &self,
        id: ArticleId,
        changes: &ArticleChanges,
    ) -> FolioResult<Option<Article>>;
}

/// Banner store.
#[async_trait]
pub trait BannerRepository: Interface + Send + Sync {
    /// Finds a banner by ID.
    async fn find_by_id(&self, id: BannerId) -> FolioResult<Option<Banner>>;

    /// Lists banners, newest first.
    async fn find_many(&self, include_archived: bool) -> FolioResult<Vec<Banner>>;

    /// Inserts a new banner.
    async fn create(&self, banner: &Banner) -> FolioResult<Banner>;

    /// Applies a patch to a banner, returning the updated banner or `None`
    /// if it does not exist.
    async fn update_by_id(&self, id: BannerId, patch: &BannerPatch) -> FolioResult<Option<Banner>>;
}
