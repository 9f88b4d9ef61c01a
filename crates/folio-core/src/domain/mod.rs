//! # Folio Domain
//!
//! Content entities persisted in the primary document store and the query
//! model used to list them.

pub mod article;
pub mod banner;
pub mod query;

pub use article::*;
pub use banner::*;
pub use query::*;
