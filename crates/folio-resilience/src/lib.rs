//! # Folio Resilience
//!
//! Resilience patterns for Folio.
//! Provides the fixed-window rate limiter, retry, and timeouts.

pub mod rate_limiter;
pub mod retry;
pub mod timeout;

pub use rate_limiter::*;
pub use retry::*;
pub use timeout::*;
