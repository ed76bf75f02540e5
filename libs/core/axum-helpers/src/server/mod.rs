//! Server infrastructure module.
//!
//! This module provides:
//! - Router assembly with OpenAPI documentation and shared middleware
//! - Server startup
//! - Graceful shutdown coordination
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router};
//!
//! let router = create_router::<ApiDoc>(api_routes, &settings)?;
//! create_production_app(router, &settings.server(), Duration::from_secs(30), cleanup).await?;
//! ```

pub mod app;
pub mod shutdown;

// Re-export commonly used types and functions
pub use app::{create_production_app, create_router};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
