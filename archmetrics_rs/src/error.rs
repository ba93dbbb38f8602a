//! Failure taxonomy for metric scanners.
//!
//! A scanner never panics and never aborts bundle assembly: it returns one of
//! these errors and the coordinator records the metric as unavailable.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricError {
    /// The source file could not be read (missing, permission denied, I/O).
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file declares no class or interface the metric can anchor on.
    #[error("no class or interface declared in {}", path.display())]
    NoTypeDeclaration { path: PathBuf },

    /// Path has no parent directory, so sibling files cannot be enumerated.
    #[error("cannot determine the directory of {}", path.display())]
    NoParentDirectory { path: PathBuf },
}

impl MetricError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        MetricError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn no_type(path: &Path) -> Self {
        MetricError::NoTypeDeclaration {
            path: path.to_path_buf(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MetricError>;
