//! Output formatting for CLI commands

pub mod command;

pub use command::{
    generate_execution_id, output_json, render_json, ErrorResponse, JsonResponse, OutputFormat,
};
