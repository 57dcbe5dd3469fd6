//! Run configuration taken from the environment

use std::path::PathBuf;

/// Environment variable overriding the manifest location.
pub const MANIFEST_PATH_ENV: &str = "PYPROJECT_CUSTOM_PATH";

/// Manifest file used when no override is set.
pub const DEFAULT_MANIFEST: &str = "pyproject.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub manifest_path: PathBuf,
}

impl ImportConfig {
    /// Read [`MANIFEST_PATH_ENV`], falling back to `pyproject.toml` in the
    /// working directory. An empty value counts as unset.
    pub fn from_env() -> Self {
        Self::from_override(std::env::var_os(MANIFEST_PATH_ENV).map(PathBuf::from))
    }

    pub fn with_manifest(path: impl Into<PathBuf>) -> Self {
        ImportConfig {
            manifest_path: path.into(),
        }
    }

    fn from_override(value: Option<PathBuf>) -> Self {
        match value {
            Some(path) if !path.as_os_str().is_empty() => Self::with_manifest(path),
            _ => Self::default(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::with_manifest(DEFAULT_MANIFEST)
    }
}
