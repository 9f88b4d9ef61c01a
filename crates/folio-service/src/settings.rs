//! Tunables shared by the content services.

use folio_config::AppConfig;
use std::time::Duration;

/// Cache lifetimes, store timeout and slug limits used by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSettings {
    /// Lifetime of single-entity entries.
    pub detail_ttl: Duration,
    /// Lifetime of listing entries.
    pub list_ttl: Duration,
    /// Upper bound on every primary store call.
    pub query_timeout: Duration,
    /// Highest slug suffix tried.
    pub max_slug_suffix: u32,
    /// Persist attempts when the store reports a slug collision.
    pub persist_attempts: u32,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ContentSettings {
    /// Reads the settings from the application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            detail_ttl: config.cache.detail_ttl(),
            list_ttl: config.cache.list_ttl(),
            query_timeout: config.database.query_timeout(),
            max_slug_suffix: config.slug.max_suffix,
            persist_attempts: config.slug.persist_retries,
        }
    }
}
