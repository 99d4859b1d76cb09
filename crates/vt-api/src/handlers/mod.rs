//! One module per resource. Handlers stay thin: extract, call the service,
//! wrap the result.

pub mod comment;
pub mod dashboard;
pub mod health;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod video;
