//! Import command implementation

use anyhow::Result;
use poetry_import::output::{generate_execution_id, output_json, JsonResponse};
use poetry_import::{
    import_option_table, run_import, ImportConfig, ImportOptions, ImportReport, OutputFormat,
    PoetryCli, PostStep,
};

use crate::cli::ImportArgs;

pub fn run_import_command(args: ImportArgs, config: ImportConfig) -> Result<()> {
    let mut poetry = PoetryCli::for_manifest(&config.manifest_path);
    let options = ImportOptions {
        tokens: args.tokens,
        options: import_option_table(),
        config,
        dialect: args.dialect,
        actions: args.actions,
    };

    let report = run_import(&options, &mut poetry)?;

    match args.output_format {
        OutputFormat::Human => print_human(&report),
        format => {
            let exec_id = generate_execution_id();
            output_json(&JsonResponse::new(&report, &exec_id), format)?;
        }
    }
    Ok(())
}

fn print_human(report: &ImportReport) {
    if report.written {
        println!(
            "Imported {} dependenc{} into {} ({} layout)",
            report.added_count(),
            if report.added_count() == 1 { "y" } else { "ies" },
            report.manifest.display(),
            report.dialect
        );
    } else {
        println!("{} is already up to date", report.manifest.display());
    }

    for group in &report.groups {
        if group.added.is_empty() && group.already_present.is_empty() {
            continue;
        }
        print!("  {}: {} added", group.section, group.added.len());
        if !group.already_present.is_empty() {
            print!(", {} already present", group.already_present.len());
        }
        println!();
    }

    for step in &report.post_steps {
        match step {
            PostStep::Lock { no_update: true } => println!("Ran poetry lock --no-update"),
            PostStep::Lock { no_update: false } => println!("Ran poetry lock"),
            PostStep::Install => println!("Ran poetry install"),
        }
    }

    if !report.missing_versions.is_empty() {
        eprintln!(
            "Warning: one or more package(s) doesn't include version, please run `poetry add {}` separately",
            report.missing_versions.join(" ")
        );
    }
}
