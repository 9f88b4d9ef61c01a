//! Banner service implementation.

use crate::banner_service::BannerService;
use crate::settings::ContentSettings;
use async_trait::async_trait;
use folio_cache::{CacheClient, CacheKeys};
use folio_core::{Banner, BannerId, BannerPatch, FolioError, FolioResult, NewBanner, ValidateExt};
use folio_repository::BannerRepository;
use folio_resilience::with_timeout;
use std::sync::Arc;
use tracing::{debug, info};

/// Banner service with a cached public list.
pub struct BannerServiceImpl {
    banners: Arc<dyn BannerRepository>,
    cache: CacheClient,
    keys: CacheKeys,
    settings: ContentSettings,
}

impl BannerServiceImpl {
    /// Creates a new banner service.
    pub fn new(
        banners: Arc<dyn BannerRepository>,
        cache: CacheClient,
        keys: CacheKeys,
        settings: ContentSettings,
    ) -> Self {
        Self {
            banners,
            cache,
            keys,
            settings,
        }
    }
}

#[async_trait]
impl BannerService for BannerServiceImpl {
    async fn list_banners(&self) -> FolioResult<Vec<Banner>> {
        let key = self.keys.banner_list();
        self.cache
            .get_or_load(&key, self.settings.list_ttl, || {
                with_timeout(self.settings.query_timeout, || self.banners.find_many(false))
            })
            .await
    }

    async fn list_all_banners(&self) -> FolioResult<Vec<Banner>> {
        with_timeout(self.settings.query_timeout, || self.banners.find_many(true)).await
    }

    async fn get_banner(&self, id: BannerId) -> FolioResult<Banner> {
        debug!("Getting banner: {}", id);

        with_timeout(self.settings.query_timeout, || self.banners.find_by_id(id))
            .await?
            .ok_or_else(|| FolioError::not_found("Banner", id))
    }

    async fn create_banner(&self, input: NewBanner) -> FolioResult<Banner> {
        debug!("Creating banner: {}", input.title);

        let input = input.normalized();
        input.validate_request()?;
        if let Some(action) = &input.action {
            action.check_complete()?;
        }

        let banner = Banner::new(input);
        let saved = with_timeout(self.settings.query_timeout, || self.banners.create(&banner)).await?;

        self.invalidate_banners().await;

        info!("Banner created: {}", saved.id);
        Ok(saved)
    }

    async fn update_banner(&self, id: BannerId, patch: BannerPatch) -> FolioResult<Banner> {
        debug!("Updating banner: {}", id);

        if patch.is_empty() {
            return Err(FolioError::validation("No fields to update"));
        }
        let patch = patch.normalized();
        patch.validate_request()?;
        if let Some(Some(action)) = &patch.action {
            action.validate_request()?;
            action.check_complete()?;
        }

        let updated = with_timeout(self.settings.query_timeout, || {
            self.banners.update_by_id(id, &patch)
        })
        .await?
        .ok_or_else(|| FolioError::not_found("Banner", id))?;

        self.invalidate_banners().await;

        info!("Banner updated: {}", id);
        Ok(updated)
    }

    async fn archive_banner(&self, id: BannerId) -> FolioResult<Banner> {
        info!("Archiving banner: {}", id);
        self.update_banner(id, BannerPatch::archived(true)).await
    }

    async fn invalidate_banners(&self) {
        self.cache.delete(&self.keys.banner_list()).await;
    }
}

impl std::fmt::Debug for BannerServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BannerServiceImpl")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_cache::{CacheStore, InMemoryCacheStore, DEFAULT_COMMAND_TIMEOUT};
    use folio_core::BannerAction;
    use folio_repository::InMemoryBannerRepository;

    fn service() -> (BannerServiceImpl, Arc<InMemoryBannerRepository>, Arc<InMemoryCacheStore>) {
        let repo = Arc::new(InMemoryBannerRepository::new());
        let store = Arc::new(InMemoryCacheStore::new());
        let cache = CacheClient::new(Arc::clone(&store) as Arc<dyn CacheStore>, DEFAULT_COMMAND_TIMEOUT);
        let service = BannerServiceImpl::new(
            Arc::clone(&repo) as Arc<dyn BannerRepository>,
            cache,
            CacheKeys::default(),
            ContentSettings::default(),
        );
        (service, repo, store)
    }

    fn new_banner(title: &str) -> NewBanner {
        NewBanner {
            title: title.to_string(),
            ..NewBanner::default()
        }
    }

    #[tokio::test]
    async fn test_list_is_cached() {
        let (service, repo, _) = service();
        service.create_banner(new_banner("Spring sale")).await.unwrap();

        service.list_banners().await.unwrap();
        let banners = service.list_banners().await.unwrap();

        assert_eq!(banners.len(), 1);
        assert_eq!(repo.calls("find_many"), 1);
    }

    #[tokio::test]
    async fn test_mutations_invalidate_list() {
        let (service, _, store) = service();
        let banner = service.create_banner(new_banner("One")).await.unwrap();
        service.list_banners().await.unwrap();
        assert!(store.contains("folio:banners:list"));

        service.archive_banner(banner.id).await.unwrap();

        assert!(!store.contains("folio:banners:list"));
        assert!(service.list_banners().await.unwrap().is_empty());
        assert_eq!(service.list_all_banners().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_action_url_requires_text() {
        let (service, repo, _) = service();
        let input = NewBanner {
            action: Some(BannerAction {
                action_text: None,
                action_url: Some("https://example.com".to_string()),
                is_external: true,
            }),
            ..new_banner("Broken")
        };

        let err = service.create_banner(input).await.unwrap_err();

        assert!(matches!(err, FolioError::Validation(_)));
        assert_eq!(repo.calls("create"), 0);
    }

    #[tokio::test]
    async fn test_padded_action_and_blank_image() {
        let (service, _, _) = service();
        let input = NewBanner {
            banner_image: Some(" /banners/a.png ".to_string()),
            action: Some(BannerAction {
                action_text: Some("Shop".to_string()),
                action_url: Some(" https://example.com/sale ".to_string()),
                is_external: false,
            }),
            ..new_banner("Padded")
        };
        let banner = service.create_banner(input).await.unwrap();

        assert_eq!(banner.banner_image.as_deref(), Some("/banners/a.png"));
        let action = banner.action.clone().unwrap();
        assert_eq!(action.action_url.as_deref(), Some("https://example.com/sale"));

        let patch = BannerPatch {
            banner_image: Some(Some(String::new())),
            action: Some(Some(BannerAction {
                action_text: Some(" ".to_string()),
                action_url: Some(String::new()),
                is_external: false,
            })),
            ..BannerPatch::default()
        };
        let updated = service.update_banner(banner.id, patch).await.unwrap();

        assert!(updated.banner_image.is_none());
        assert!(updated.action.is_none());
    }

    #[tokio::test]
    async fn test_update_missing_banner() {
        let (service, _, _) = service();
        let err = service
            .update_banner(BannerId::new(), BannerPatch::archived(true))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_banner_skips_cache() {
        let (service, repo, store) = service();
        let banner = service.create_banner(new_banner("Direct")).await.unwrap();

        service.get_banner(banner.id).await.unwrap();
        service.get_banner(banner.id).await.unwrap();

        assert_eq!(repo.calls("find_by_id"), 2);
        assert!(store.keys().is_empty());
    }
}
