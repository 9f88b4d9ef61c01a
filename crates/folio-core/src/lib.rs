//! # Folio Core
//!
//! Core types, errors, and domain entities shared by every Folio crate.
//! Articles and banners live here together with the list query model used
//! to fingerprint cached collections.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
