//! Banner service trait definition.

use folio_core::{Banner, BannerId, BannerPatch, FolioResult, Interface, NewBanner};
use async_trait::async_trait;

/// Banner service.
///
/// Only the public banner list is cached; single banners and the admin list
/// always come from the store.
#[async_trait]
pub trait BannerService: Interface + Send + Sync {
    /// Lists non-archived banners, newest first.
    async fn list_banners(&self) -> FolioResult<Vec<Banner>>;

    /// Lists every banner including archived ones, newest first.
    async fn list_all_banners(&self) -> FolioResult<Vec<Banner>>;

    /// Gets a banner by ID.
    async fn get_banner(&self, id: BannerId) -> FolioResult<Banner>;

    /// Creates a banner.
    async fn create_banner(&self, input: NewBanner) -> FolioResult<Banner>;

    /// Updates a banner.
    async fn update_banner(&self, id: BannerId, patch: BannerPatch) -> FolioResult<Banner>;

    /// Hides a banner from the public list.
    async fn archive_banner(&self, id: BannerId) -> FolioResult<Banner>;

    /// Drops the cached banner list.
    async fn invalidate_banners(&self);
}
