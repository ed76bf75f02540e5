//! # Axum Helpers
//!
//! Shared building blocks for the Axum services in this workspace.
//!
//! ## Modules
//!
//! - **[`server`]**: Router assembly, server startup, graceful shutdown
//! - **[`http`]**: CORS configuration from the allowed origins setting
//! - **[`errors`]**: The JSON error envelope every failed request returns
//! - **[`extractors`]**: Extractors that reject with that envelope

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

// Re-export server types
pub use server::{
    ShutdownCoordinator, create_production_app, create_router, shutdown_signal,
};

// Re-export HTTP middleware
pub use http::create_cors_layer;

// Re-export error types
pub use errors::{AppError, ErrorResponse};

// Re-export extractors
pub use extractors::{JsonBody, UuidPath};
