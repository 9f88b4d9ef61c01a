//! # Folio Service
//!
//! Content services for Folio: a cache-aside facade over articles and
//! banners with synchronous invalidation, store-unique slug assignment, and
//! fixed-window guards for the login and admin setup paths.
//!
//! ```text
//! ArticleService / BannerService      LoginGuard / AdminSetupGuard
//!   ↓ CacheClient   ↓ repositories       ↓ RateLimiter
//! cache store       primary store        cache store
//! ```

pub mod article_service;
pub mod auth_guard;
pub mod banner_service;
pub mod container;
pub mod r#impl;
pub mod settings;
pub mod slug;

pub use article_service::*;
pub use auth_guard::*;
pub use banner_service::*;
pub use container::ServiceContainer;
pub use r#impl::{ArticleServiceImpl, BannerServiceImpl};
pub use settings::ContentSettings;
pub use slug::SlugAssigner;
