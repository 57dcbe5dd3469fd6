//! Error taxonomy for an import run.
//!
//! Every failure surfaced by the library is an [`ImportError`]. The binary
//! prints it as a single `Error: ...` line and exits with status 1.

use std::fmt;
use std::path::PathBuf;

use crate::error_codes::{
    PIM_ACT_001_POST_ACTION_FAILED, PIM_IO_001_FILE_NOT_FOUND, PIM_IO_002_IO_FAILURE,
    PIM_MAN_001_INVALID_MANIFEST, PIM_MAN_002_LAYOUT_CONFLICT, PIM_PRS_001_INVALID_REQUIREMENT,
    PIM_USG_001_USAGE,
};
use crate::requirement::RequirementError;

/// Which input a missing path was supposed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Requirements,
    Constraints,
    Manifest,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Requirements => write!(f, "requirements file"),
            FileKind::Constraints => write!(f, "constraints file"),
            FileKind::Manifest => write!(f, "manifest"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Malformed command line: missing flag value, duplicate group, orphaned
    /// constraints file, unknown option or option value.
    #[error("{0}")]
    Usage(String),

    #[error("unable to locate the {kind}: {}", path.display())]
    NotFound { kind: FileKind, path: PathBuf },

    #[error("{}:{line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: RequirementError,
    },

    #[error("{} is not valid TOML: {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },

    /// An existing manifest key holds a value of the wrong type.
    #[error("manifest key `{key}` must be {expected}")]
    ManifestLayout { key: String, expected: &'static str },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    PostAction(String),
}

impl ImportError {
    pub fn usage(message: impl Into<String>) -> Self {
        ImportError::Usage(message.into())
    }

    pub fn not_found(kind: FileKind, path: impl Into<PathBuf>) -> Self {
        ImportError::NotFound {
            kind,
            path: path.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable error code, see [`crate::error_codes`].
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::Usage(_) => PIM_USG_001_USAGE,
            ImportError::NotFound { .. } => PIM_IO_001_FILE_NOT_FOUND,
            ImportError::Parse { .. } => PIM_PRS_001_INVALID_REQUIREMENT,
            ImportError::InvalidManifest { .. } => PIM_MAN_001_INVALID_MANIFEST,
            ImportError::ManifestLayout { .. } => PIM_MAN_002_LAYOUT_CONFLICT,
            ImportError::Io { .. } => PIM_IO_002_IO_FAILURE,
            ImportError::PostAction(_) => PIM_ACT_001_POST_ACTION_FAILED,
        }
    }
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;
