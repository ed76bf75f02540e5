//! Custom extractors for Axum handlers.
//!
//! These reject with [`AppError`](crate::errors::AppError) so malformed input
//! is answered with the standard error envelope.

pub mod json_body;
pub mod uuid_path;

pub use json_body::JsonBody;
pub use uuid_path::UuidPath;
