//! Output types for the `import` command
//!
//! JSON responses are wrapped in [`JsonResponse`] so scripts get a schema
//! version and an execution ID alongside the payload.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ImportError;

/// Version of the JSON envelope
pub const POETRY_IMPORT_JSON_SCHEMA_VERSION: &str = "1.0.0";

/// Wrapper for all JSON responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    pub schema_version: String,
    pub execution_id: String,
    pub tool: String,
    /// RFC 3339, second precision, UTC
    pub timestamp: String,
    pub data: T,
}

impl<T> JsonResponse<T> {
    pub fn new(data: T, execution_id: &str) -> Self {
        JsonResponse {
            schema_version: POETRY_IMPORT_JSON_SCHEMA_VERSION.to_string(),
            execution_id: execution_id.to_string(),
            tool: env!("CARGO_PKG_NAME").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            data,
        }
    }
}

/// Response for errors in JSON mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code, e.g. `PIM-IO-001`
    pub error: String,
    pub message: String,
}

impl From<&ImportError> for ErrorResponse {
    fn from(err: &ImportError) -> Self {
        ErrorResponse {
            error: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Human,
    /// Compact JSON, one line
    Json,
    /// Indented JSON
    Pretty,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Pretty)
    }
}

impl FromStr for OutputFormat {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            _ => Err(ImportError::usage(format!(
                "Invalid output format: {}. Must be human, json, or pretty",
                s
            ))),
        }
    }
}

/// Generate a unique execution ID for this run
///
/// Uses timestamp + process ID for uniqueness.
pub fn generate_execution_id() -> String {
    let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
    format!("{:x}-{:x}", timestamp, std::process::id())
}

/// Serialize `data` as JSON in the requested layout.
pub fn render_json<T: Serialize>(data: &T, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(data),
        _ => serde_json::to_string(data),
    }
}

/// Output JSON to stdout
pub fn output_json<T: Serialize>(data: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render_json(data, format)?);
    Ok(())
}
