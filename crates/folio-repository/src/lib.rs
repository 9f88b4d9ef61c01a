//! # Folio Repository
//!
//! Access to the primary document store.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn ArticleRepository> / Arc<dyn BannerRepository>
//! store implementation          (external, or the in-memory reference store)
//! ```
//!
//! The store is authoritative and enforces slug uniqueness. The in-memory
//! stores in [`memory`] implement the same contract and are instrumented
//! for tests.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryArticleRepository, InMemoryBannerRepository};
pub use traits::*;
