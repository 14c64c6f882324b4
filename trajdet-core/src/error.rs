//! Error taxonomy shared by every detector component.
//!
//! Out-of-range histogram samples are not errors: they are dropped.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by histograms, detectors, sinks and the replay engine
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Bad histogram bounds, channel count, bin index or configuration value
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Disk error while writing or reading an artifact
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The engine refused to register a listener
    #[error("setup failed: {0}")]
    Setup(String),

    /// Malformed trace, table, log or configuration file
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl DetectorError {
    pub fn invalid(message: impl Into<String>) -> Self {
        DetectorError::InvalidArgument(message.into())
    }

    /// Attach an artifact path to an I/O error
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        DetectorError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// The artifact path involved in the failure, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            DetectorError::Io { path, .. } | DetectorError::Parse { path, .. } => Some(path),
            _ => None,
        }
    }
}
