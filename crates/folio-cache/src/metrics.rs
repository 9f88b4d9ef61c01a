//! Cache metrics.

use metrics::{counter, describe_counter};

/// Metric names for the cache layer.
pub mod names {
    /// Lookups answered from the cache.
    pub const CACHE_HITS_TOTAL: &str = "folio_cache_hits_total";
    /// Lookups that fell through to the primary store.
    pub const CACHE_MISSES_TOTAL: &str = "folio_cache_misses_total";
    /// Cache commands that failed or timed out and were swallowed.
    pub const CACHE_ERRORS_TOTAL: &str = "folio_cache_errors_total";
    /// Keys deleted by invalidation.
    pub const CACHE_INVALIDATIONS_TOTAL: &str = "folio_cache_invalidations_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::CACHE_HITS_TOTAL, "Total number of cache hits");
    describe_counter!(names::CACHE_MISSES_TOTAL, "Total number of cache misses");
    describe_counter!(
        names::CACHE_ERRORS_TOTAL,
        "Total number of swallowed cache errors"
    );
    describe_counter!(
        names::CACHE_INVALIDATIONS_TOTAL,
        "Total number of cache keys invalidated"
    );
}

/// Cache metrics recorder.
#[derive(Clone)]
pub struct CacheMetrics;

impl CacheMetrics {
    /// Record a hit.
    pub fn hit() {
        counter!(names::CACHE_HITS_TOTAL).increment(1);
    }

    /// Record a miss.
    pub fn miss() {
        counter!(names::CACHE_MISSES_TOTAL).increment(1);
    }

    /// Record a swallowed error.
    pub fn error(operation: &'static str) {
        counter!(names::CACHE_ERRORS_TOTAL, "operation" => operation).increment(1);
    }

    /// Record deleted keys.
    pub fn invalidated(count: u64) {
        counter!(names::CACHE_INVALIDATIONS_TOTAL).increment(count);
    }
}
