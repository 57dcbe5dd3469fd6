//! Version and build information
//!
//! Build metadata (commit SHA, rustc version) is injected by `build.rs`.

/// Full version string: "poetry-import {version} ({commit}) rustc {rustc_version}"
pub fn version() -> String {
    format!(
        "poetry-import {} ({}) rustc {}",
        package_version(),
        build_commit(),
        rustc_version()
    )
}

/// Get the package version (e.g., "2.1.0")
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns "unknown" if not built with commit info
pub fn build_commit() -> &'static str {
    option_env!("POETRY_IMPORT_COMMIT_SHA").unwrap_or("unknown")
}

/// Returns "unknown" if not built with rustc version info
pub fn rustc_version() -> &'static str {
    option_env!("POETRY_IMPORT_RUSTC_VERSION").unwrap_or("unknown")
}
