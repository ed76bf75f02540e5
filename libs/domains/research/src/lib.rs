//! Research Domain
//!
//! Glue between the HTTP service and the external research pipeline:
//!
//! - [`error`]: domain-tagged errors rendered as the 400 envelope
//! - [`pipeline`]: locates the external pipeline checkout at startup
//! - [`tasks`]: the background tasks run by the task worker
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_research::{ResearchPipeline, tasks::{default_registry, TaskSettings}};
//! use task_worker::{TaskWorker, WorkerConfig};
//!
//! let pipeline = ResearchPipeline::load(&settings.research_pipeline_path)?;
//! let worker = TaskWorker::new(default_registry(&TaskSettings::default()), WorkerConfig::default());
//! ```

pub mod error;
pub mod pipeline;
pub mod tasks;

// Re-export commonly used types
pub use error::{DomainError, DomainErrorKind, DomainResult};
pub use pipeline::{ComponentRef, PipelineComponent, PipelineError, ResearchPipeline};
