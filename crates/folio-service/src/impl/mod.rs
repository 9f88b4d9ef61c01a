//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `article_service.rs`).

pub mod article_service_impl;
pub mod banner_service_impl;

pub use article_service_impl::ArticleServiceImpl;
pub use banner_service_impl::BannerServiceImpl;
