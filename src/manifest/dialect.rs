//! Manifest dialect selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use toml_edit::{DocumentMut, Item};

use crate::error::ImportError;

/// Where root dependencies live in `pyproject.toml`.
///
/// Named groups use `tool.poetry.group.<name>.dependencies` in both dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Poetry 1.x: root dependencies in the `tool.poetry.dependencies` table
    V1,
    /// Poetry 2.x: root dependencies in the `project.dependencies` array
    V2,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::V1 => "v1",
            Dialect::V2 => "v2",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dialect requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialectChoice {
    V1,
    #[default]
    V2,
    /// Decide from the manifest's existing layout
    Auto,
}

impl DialectChoice {
    pub fn resolve(self, doc: &DocumentMut) -> Dialect {
        match self {
            DialectChoice::V1 => Dialect::V1,
            DialectChoice::V2 => Dialect::V2,
            DialectChoice::Auto => detect_dialect(doc),
        }
    }
}

impl FromStr for DialectChoice {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(DialectChoice::V1),
            "v2" | "2" => Ok(DialectChoice::V2),
            "auto" => Ok(DialectChoice::Auto),
            _ => Err(ImportError::usage(format!(
                "Unsupported Poetry version: {}. Must be v1, v2 or auto",
                s
            ))),
        }
    }
}

/// Guess the dialect from the document layout.
///
/// A `project.dependencies` entry means v2, otherwise a `tool.poetry` table
/// means v1. Anything else is treated as a new v2 project.
pub fn detect_dialect(doc: &DocumentMut) -> Dialect {
    let has_project_deps = doc
        .get("project")
        .and_then(Item::as_table_like)
        .is_some_and(|project| project.contains_key("dependencies"));
    if has_project_deps {
        return Dialect::V2;
    }

    let has_poetry = doc
        .get("tool")
        .and_then(|tool| tool.get("poetry"))
        .is_some();
    if has_poetry {
        Dialect::V1
    } else {
        Dialect::V2
    }
}
