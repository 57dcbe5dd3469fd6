//! CLI argument parsing for poetry-import
//!
//! Only the options of the `import` command are interpreted here. File
//! arguments, `-g` and `-c` are left in the token list for the grouper, which
//! needs their exact positions.

use anyhow::Result;
use poetry_import::{DialectChoice, OutputFormat, PostActions};

pub fn print_usage() {
    eprintln!("poetry-import - Import requirements.txt files into pyproject.toml");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  poetry-import import [FILES]... [-g <GROUP> <FILES>...]... [-c <FILE>] [options]");
    eprintln!("  poetry-import --help");
    eprintln!("  poetry-import --version");
    eprintln!();
    eprintln!("Import arguments:");
    eprintln!("  FILES                      Requirements files for the main dependencies");
    eprintln!("  -g, --group <GROUP>        Put the files that follow into dependency group GROUP");
    eprintln!("  -c, --constraint <FILE>    Constraints file overriding requirement versions");
    eprintln!("  --poetry-version <V>       Manifest layout: v1, v2 (default) or auto");
    eprintln!("  --lock                     Run `poetry lock` afterwards");
    eprintln!("  --no-update                Pass --no-update to `poetry lock`");
    eprintln!("  --install                  Run `poetry lock` and `poetry install` afterwards");
    eprintln!("  --output <FORMAT>          Output format: human (default), json or pretty");
    eprintln!("  -v, --verbose              Log debug output to stderr");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PYPROJECT_CUSTOM_PATH      Manifest to update (default: ./pyproject.toml)");
    eprintln!("  RUST_LOG                   Log filter, e.g. poetry_import=debug");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportArgs {
    /// Every token after `import`, options included
    pub tokens: Vec<String>,
    pub dialect: DialectChoice,
    pub actions: PostActions,
    pub output_format: OutputFormat,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Import(ImportArgs),
    Help,
    Version,
}

/// Split `--name=value` into its parts.
fn split_inline(arg: &str) -> (&str, Option<&str>) {
    match arg.split_once('=') {
        Some((name, value)) if name.starts_with("--") => (name, Some(value)),
        _ => (arg, None),
    }
}

/// Value of an option given either inline or as the next argument.
fn option_value<'a>(
    args: &'a [String],
    i: usize,
    name: &str,
    inline: Option<&'a str>,
) -> Result<(&'a str, usize)> {
    if let Some(value) = inline {
        return Ok((value, 1));
    }
    match args.get(i + 1) {
        Some(value) => Ok((value.as_str(), 2)),
        None => Err(anyhow::anyhow!("{} requires an argument", name)),
    }
}

/// Parse the full argument vector, program name first.
pub fn parse_args_impl(args: &[String]) -> Result<Command> {
    if args.len() < 2 {
        return Err(anyhow::anyhow!("Missing command"));
    }

    let command = &args[1];

    if command == "--version" || command == "-V" {
        return Ok(Command::Version);
    }
    if command == "--help" || command == "-h" {
        return Ok(Command::Help);
    }

    match command.as_str() {
        "import" => {
            let tokens = args[2..].to_vec();
            let mut dialect = DialectChoice::default();
            let mut actions = PostActions::default();
            let mut output_format = OutputFormat::Human;
            let mut verbose = false;

            let mut i = 0;
            while i < tokens.len() {
                let (name, inline) = split_inline(&tokens[i]);
                match name {
                    "--help" | "-h" => return Ok(Command::Help),
                    "-g" | "--group" | "-c" | "--constraint" => {
                        i += 2;
                    }
                    "--poetry-version" => {
                        let (value, step) = option_value(&tokens, i, name, inline)?;
                        dialect = value.parse()?;
                        i += step;
                    }
                    "--output" => {
                        let (value, step) = option_value(&tokens, i, name, inline)?;
                        output_format = value.parse()?;
                        i += step;
                    }
                    "--lock" => {
                        actions.lock = true;
                        i += 1;
                    }
                    "--no-update" => {
                        actions.no_update = true;
                        i += 1;
                    }
                    "--install" => {
                        actions.install = true;
                        i += 1;
                    }
                    "--verbose" | "-v" => {
                        verbose = true;
                        i += 1;
                    }
                    // Files and unknown options are left to the grouper
                    _ => i += 1,
                }
            }

            Ok(Command::Import(ImportArgs {
                tokens,
                dialect,
                actions,
                output_format,
                verbose,
            }))
        }
        _ => Err(anyhow::anyhow!("Unknown command: {}", command)),
    }
}

/// Convenience wrapper around parse_args_impl that reads the process arguments
pub fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_impl(&args)
}

/// Output format requested anywhere on the command line, used to report
/// errors raised before parsing completes.
pub fn requested_output_format(args: &[String]) -> OutputFormat {
    args.iter()
        .enumerate()
        .find_map(|(i, arg)| match split_inline(arg) {
            ("--output", Some(value)) => Some(value),
            ("--output", None) => args.get(i + 1).map(String::as_str),
            _ => None,
        })
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}
