//! poetry-import CLI - Import requirements.txt files into pyproject.toml
//!
//! Usage: poetry-import import [FILES]... [-g GROUP FILES...]... [-c FILE]

mod cli;
mod import_cmd;

use poetry_import::error_codes::PIM_USG_001_USAGE;
use poetry_import::output::{output_json, ErrorResponse};
use poetry_import::{ImportConfig, ImportError, OutputFormat};
use std::process::ExitCode;

use cli::{parse_args, print_usage, requested_output_format, Command};

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn report_error(err: &anyhow::Error, output_format: OutputFormat) {
    if output_format.is_json() {
        let response = match err.downcast_ref::<ImportError>() {
            Some(import_err) => ErrorResponse::from(import_err),
            None => ErrorResponse {
                error: PIM_USG_001_USAGE.to_string(),
                message: err.to_string(),
            },
        };
        if let Err(e) = output_json(&response, output_format) {
            log::debug!("could not write the JSON error response: {}", e);
        }
    }
    eprintln!("Error: {}", err);
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let output_format = requested_output_format(&args);

    match parse_args() {
        Ok(Command::Help) => {
            print_usage();
            ExitCode::SUCCESS
        }
        Ok(Command::Version) => {
            println!("{}", poetry_import::version::version());
            ExitCode::SUCCESS
        }
        Ok(Command::Import(import_args)) => {
            init_logging(import_args.verbose);
            let output_format = import_args.output_format;
            let config = ImportConfig::from_env();
            log::debug!("manifest: {}", config.manifest_path.display());

            if let Err(e) = import_cmd::run_import_command(import_args, config) {
                report_error(&e, output_format);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_error(&e, output_format);
            ExitCode::from(1)
        }
    }
}
