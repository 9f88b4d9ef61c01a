//! Wiring of the services from configuration.

use crate::article_service::ArticleService;
use crate::auth_guard::{AdminSetupGuard, LoginGuard};
use crate::banner_service::BannerService;
use crate::r#impl::{ArticleServiceImpl, BannerServiceImpl};
use crate::settings::ContentSettings;
use folio_cache::{register_metrics, CacheClient, CacheKeys, CacheStore, InMemoryCacheStore};
use folio_config::AppConfig;
use folio_core::FolioResult;
use folio_repository::{
    ArticleRepository, BannerRepository, InMemoryArticleRepository, InMemoryBannerRepository,
};
use folio_resilience::RateLimiter;
use std::sync::Arc;
use tracing::info;

/// Holds every service built on one cache client.
pub struct ServiceContainer {
    articles: Arc<dyn ArticleService>,
    banners: Arc<dyn BannerService>,
    login_guard: LoginGuard,
    admin_setup_guard: AdminSetupGuard,
    cache: CacheClient,
}

impl ServiceContainer {
    /// Builds the services on an existing cache client and primary store.
    pub fn new(
        config: &AppConfig,
        cache: CacheClient,
        article_repository: Arc<dyn ArticleRepository>,
        banner_repository: Arc<dyn BannerRepository>,
    ) -> Self {
        let keys = CacheKeys::new(config.redis.key_prefix.clone());
        let settings = ContentSettings::from_config(config);
        let limiter = RateLimiter::new(cache.clone());

        Self {
            articles: Arc::new(ArticleServiceImpl::new(
                article_repository,
                cache.clone(),
                keys.clone(),
                settings,
            )),
            banners: Arc::new(BannerServiceImpl::new(
                banner_repository,
                cache.clone(),
                keys.clone(),
                settings,
            )),
            login_guard: LoginGuard::new(limiter.clone(), keys.clone(), config.rate_limit.login),
            admin_setup_guard: AdminSetupGuard::new(limiter, keys, config.rate_limit.admin_setup),
            cache,
        }
    }

    /// Connects the configured cache and builds the services on the given
    /// primary store.
    ///
    /// # Errors
    ///
    /// Fails if Redis is enabled but cannot be reached.
    pub async fn connect(
        config: &AppConfig,
        article_repository: Arc<dyn ArticleRepository>,
        banner_repository: Arc<dyn BannerRepository>,
    ) -> FolioResult<Self> {
        if config.observability.metrics_enabled {
            register_metrics();
        }

        let cache = folio_cache::connect(&config.redis, &config.cache).await?;
        info!(
            enabled = cache.is_enabled(),
            prefix = %config.redis.key_prefix,
            "Service container ready"
        );
        Ok(Self::new(config, cache, article_repository, banner_repository))
    }

    /// Builds the services on in-memory stores, for development and tests.
    #[must_use]
    pub fn in_memory(config: &AppConfig) -> Self {
        let cache = CacheClient::new(
            Arc::new(InMemoryCacheStore::new()) as Arc<dyn CacheStore>,
            config.cache.command_timeout(),
        );
        Self::new(
            config,
            cache,
            Arc::new(InMemoryArticleRepository::new()),
            Arc::new(InMemoryBannerRepository::new()),
        )
    }

    /// Article service.
    #[must_use]
    pub fn articles(&self) -> Arc<dyn ArticleService> {
        Arc::clone(&self.articles)
    }

    /// Banner service.
    #[must_use]
    pub fn banners(&self) -> Arc<dyn BannerService> {
        Arc::clone(&self.banners)
    }

    /// Login attempt guard.
    #[must_use]
    pub const fn login_guard(&self) -> &LoginGuard {
        &self.login_guard
    }

    /// Admin setup attempt guard.
    #[must_use]
    pub const fn admin_setup_guard(&self) -> &AdminSetupGuard {
        &self.admin_setup_guard
    }

    /// Shared cache client.
    #[must_use]
    pub const fn cache(&self) -> &CacheClient {
        &self.cache
    }

    /// Closes the cache connections.
    pub async fn close(&self) {
        self.cache.close().await;
        info!("Service container closed");
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("cache_enabled", &self.cache.is_enabled())
            .finish_non_exhaustive()
    }
}
