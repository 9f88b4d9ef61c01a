use super::Instrumentation;
use crate::BannerRepository;
use async_trait::async_trait;
use folio_core::{Banner, BannerId, BannerPatch, FolioError, FolioResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Banner store backed by a map.
#[derive(Debug, Default)]
pub struct InMemoryBannerRepository {
    banners: Mutex<HashMap<BannerId, Banner>>,
    instrumentation: Instrumentation,
}

impl InMemoryBannerRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with banners.
    #[must_use]
    pub fn with_banners(banners: Vec<Banner>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.banners.lock();
            for banner in banners {
                map.insert(banner.id, banner);
            }
        }
        repo
    }

    /// Number of calls made to `operation`.
    #[must_use]
    pub fn calls(&self, operation: &str) -> usize {
        self.instrumentation.calls(operation)
    }

    /// Makes every subsequent call fail with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.instrumentation.set_failing(failing);
    }
}

#[async_trait]
impl BannerRepository for InMemoryBannerRepository {
    async fn find_by_id(&self, id: BannerId) -> FolioResult<Option<Banner>> {
        self.instrumentation.enter("find_by_id")?;
        Ok(self.banners.lock().get(&id).cloned())
    }

    async fn find_many(&self, include_archived: bool) -> FolioResult<Vec<Banner>> {
        self.instrumentation.enter("find_many")?;
        debug!(include_archived, "Listing banners");
        let mut banners: Vec<Banner> = self
            .banners
            .lock()
            .values()
            .filter(|b| include_archived || !b.archived)
            .cloned()
            .collect();
        banners.sort_by(|a, b| {
            (b.created_at, b.id.into_inner()).cmp(&(a.created_at, a.id.into_inner()))
        });
        Ok(banners)
    }

    async fn create(&self, banner: &Banner) -> FolioResult<Banner> {
        self.instrumentation.enter("create")?;
        let mut map = self.banners.lock();
        if map.contains_key(&banner.id) {
            return Err(FolioError::UniqueViolation {
                field: "id",
                value: banner.id.to_string(),
            });
        }
        map.insert(banner.id, banner.clone());
        Ok(banner.clone())
    }

    async fn update_by_id(&self, id: BannerId, patch: &BannerPatch) -> FolioResult<Option<Banner>> {
        self.instrumentation.enter("update_by_id")?;
        Ok(self.banners.lock().get_mut(&id).map(|banner| {
            banner.apply(patch);
            banner.clone()
        }))
    }
}
