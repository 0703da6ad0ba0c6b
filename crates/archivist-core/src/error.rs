//! Error types for the archive-build pipeline.
//!
//! Every variant here aborts the run. Stale source references are not
//! errors: the archive builder reports them as [`crate::EntryOutcome::Skipped`].

use std::path::PathBuf;

/// Result type for pipeline operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors that abort an archive build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Configuration file unreadable, malformed or invalid.
    #[error("configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Catalog could not be opened or queried.
    #[error("data source error: {context}")]
    DataSource {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Tree traversal failed under `WalkPolicy::Abort`.
    #[error("cannot walk {}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Archive file or one of its sources failed at the I/O level.
    #[error("archive I/O failed for {}", path.display())]
    ArchiveIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The zip writer rejected an entry or could not finalize.
    #[error("zip writer failed for {}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Finalized archive could not be reopened or hashed.
    #[error("cannot record integrity of {}", path.display())]
    Integrity {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be encoded, written or read back.
    #[error("manifest I/O failed for {}: {message}", path.display())]
    ManifestWrite { path: PathBuf, message: String },
}

impl BuildError {
    /// Wrap a catalog failure with a description of what was being read.
    pub fn data_source(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DataSource {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the operator's input rather than the environment.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            _ => 1,
        }
    }
}

impl From<rusqlite::Error> for BuildError {
    fn from(err: rusqlite::Error) -> Self {
        Self::data_source("sqlite", err)
    }
}
