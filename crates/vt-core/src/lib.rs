//! vtube/crates/vt-core/src/lib.rs
//!
//! The central domain logic and interface definitions for the video platform.

pub mod error;
pub mod media;
pub mod models;
pub mod pagination;
pub mod services;
pub mod traits;
pub mod validate;

// Re-exporting for easier access in other crates
pub use error::*;
pub use media::*;
pub use models::*;
pub use pagination::*;
pub use traits::*;
