//! poetry-import error codes
//!
//! Error codes follow the pattern: PIM-{CATEGORY}-{3-digit number}
//!
//! Categories (2-3 uppercase letters):
//! - USG: Command-line usage errors (grouping, flags, option values)
//! - IO: File-system errors (missing files, read/write failures)
//! - PRS: Requirement line parse errors
//! - MAN: Manifest (pyproject.toml) errors
//! - ACT: Post-import actions (poetry lock / install)
//!
//! Each error code is stable and should not be reused.

/// Malformed command line
pub const PIM_USG_001_USAGE: &str = "PIM-USG-001";

/// Requirements, constraints or manifest file not found
pub const PIM_IO_001_FILE_NOT_FOUND: &str = "PIM-IO-001";

/// Reading or writing a file failed
pub const PIM_IO_002_IO_FAILURE: &str = "PIM-IO-002";

/// Requirement line could not be parsed
pub const PIM_PRS_001_INVALID_REQUIREMENT: &str = "PIM-PRS-001";

/// Manifest is not valid TOML
pub const PIM_MAN_001_INVALID_MANIFEST: &str = "PIM-MAN-001";

/// Manifest key has an unexpected type
pub const PIM_MAN_002_LAYOUT_CONFLICT: &str = "PIM-MAN-002";

/// poetry lock / install failed
pub const PIM_ACT_001_POST_ACTION_FAILED: &str = "PIM-ACT-001";

/// Error code documentation
///
/// | Code | Description | Remediation |
/// |------|-------------|-------------|
/// | PIM-USG-001 | Malformed command line | See `poetry-import --help`; every `-g` and `-c` needs a value |
/// | PIM-IO-001 | File not found | Check the path; set `PYPROJECT_CUSTOM_PATH` for a non-default manifest |
/// | PIM-IO-002 | I/O failure | Check file permissions |
/// | PIM-PRS-001 | Invalid requirement line | Fix the reported line in the requirements file |
/// | PIM-MAN-001 | Invalid manifest | Fix the TOML syntax of pyproject.toml |
/// | PIM-MAN-002 | Manifest layout conflict | The reported key must be a table (or an array for `project.dependencies`) |
/// | PIM-ACT-001 | Post action failed | Run `poetry lock` / `poetry install` manually to see the full output |
pub const ERROR_CODE_DOCUMENTATION: &str = "Error code documentation available in source";
