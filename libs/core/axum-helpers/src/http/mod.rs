//! HTTP middleware module.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::create_cors_layer;
//!
//! let app = Router::new().layer(create_cors_layer(&settings.allowed_hosts)?);
//! ```

pub mod cors;

pub use cors::create_cors_layer;
