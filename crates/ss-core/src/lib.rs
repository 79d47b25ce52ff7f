//! stylesync/crates/ss-core/src/lib.rs
//!
//! Domain models, query model, and port definitions for StyleSync.

pub mod error;
pub mod models;
pub mod query;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use query::*;
pub use traits::*;
