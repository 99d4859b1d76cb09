//! # Services
//!
//! One module per resource. Each operation validates its input (actor,
//! identifiers, then fields), performs a single data operation through the
//! ports, and returns domain values. Nothing here calls another resource's
//! service.

pub mod comment;
pub mod dashboard;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod video;
