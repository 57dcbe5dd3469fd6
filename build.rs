use std::env;
use std::process::Command;

/// Trimmed stdout of a successful command, if there is any.
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    let commit = command_output("git", &["rev-parse", "--short", "HEAD"]);

    // Cargo hands build scripts the compiler it is using.
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version = command_output(&rustc, &["--version"])
        .and_then(|line| line.split_whitespace().nth(1).map(str::to_string));

    println!(
        "cargo:rustc-env=POETRY_IMPORT_COMMIT_SHA={}",
        commit.as_deref().unwrap_or("unknown")
    );
    println!(
        "cargo:rustc-env=POETRY_IMPORT_RUSTC_VERSION={}",
        rustc_version.as_deref().unwrap_or("unknown")
    );
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
