//! Handle on the external research pipeline checkout.
//!
//! The imputation, EDA and feature-selection algorithms live outside this
//! workspace. The service only needs to know where they are: the directory
//! is resolved once at startup and the service refuses to start without it.

use std::io;
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "research pipeline not found at {} (set RESEARCH_PIPELINE_PATH to the pipeline checkout)",
        .0.display()
    )]
    NotFound(PathBuf),

    #[error(
        "research pipeline path {} is not a directory (check RESEARCH_PIPELINE_PATH)",
        .0.display()
    )]
    NotADirectory(PathBuf),

    #[error("failed to resolve research pipeline path {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The four entry points the pipeline exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, IntoStaticStr, EnumIter)]
pub enum PipelineComponent {
    #[strum(serialize = "FeatureImputer")]
    FeatureImputer,
    #[strum(serialize = "EDA")]
    Eda,
    #[strum(serialize = "DataLoader")]
    DataLoader,
    #[strum(serialize = "FeatureSelection")]
    FeatureSelection,
}

impl PipelineComponent {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// A component resolved against the pipeline root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRef<'a> {
    pub kind: PipelineComponent,
    pub name: &'static str,
    pub root: &'a Path,
}

#[derive(Debug, Clone)]
pub struct ResearchPipeline {
    root: PathBuf,
}

impl ResearchPipeline {
    /// Resolve the pipeline directory.
    ///
    /// # Errors
    /// - [`PipelineError::NotFound`] if `path` does not exist
    /// - [`PipelineError::NotADirectory`] if it exists but is a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();

        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PipelineError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(PipelineError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if !metadata.is_dir() {
            return Err(PipelineError::NotADirectory(path.to_path_buf()));
        }

        let root = path.canonicalize().map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(root = %root.display(), components = ?Self::exports(), "Research pipeline loaded");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Exported component names, in declaration order.
    pub fn exports() -> [&'static str; 4] {
        [
            PipelineComponent::FeatureImputer.name(),
            PipelineComponent::Eda.name(),
            PipelineComponent::DataLoader.name(),
            PipelineComponent::FeatureSelection.name(),
        ]
    }

    pub fn component(&self, kind: PipelineComponent) -> ComponentRef<'_> {
        ComponentRef {
            kind,
            name: kind.name(),
            root: &self.root,
        }
    }

    pub fn components(&self) -> impl Iterator<Item = ComponentRef<'_>> {
        PipelineComponent::iter().map(|kind| self.component(kind))
    }
}
