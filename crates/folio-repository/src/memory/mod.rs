//! In-memory reference stores.
//!
//! Used for local development and as instrumented test doubles: every
//! store counts calls per operation and can be switched into a failing
//! state to simulate an outage of the primary store.

mod article_store;
mod banner_store;

pub use article_store::InMemoryArticleRepository;
pub use banner_store::InMemoryBannerRepository;

use folio_core::{FolioError, FolioResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Call counters and fault switch shared by the in-memory stores.
#[derive(Debug, Default)]
pub(crate) struct Instrumentation {
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: AtomicBool,
}

impl Instrumentation {
    /// Records a call and fails it when the store is switched off.
    pub(crate) fn enter(&self, operation: &'static str) -> FolioResult<()> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(FolioError::Database(format!(
                "store unavailable during {operation}"
            )));
        }
        Ok(())
    }

    pub(crate) fn calls(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub(crate) fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}
