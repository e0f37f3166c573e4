//! tabmerge CLI
//!
//! Merges every supported tabular file in a folder into a single xlsx
//! workbook, one sheet per source table, with deterministic sheet naming.
//!
//! Usage:
//!     tabmerge --input-folder ./tables --output-name merged.xlsx

use clap::Parser;
use std::path::PathBuf;
use tabmerge_core::{build_plan, write_workbook, Error, ExtractOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tabmerge")]
#[command(about = "Merge all tables in a folder into a single workbook", long_about = None)]
#[command(version)]
struct Cli {
    /// Folder containing the tables (.xlsx/.xls/.csv/.tsv/.txt)
    #[arg(short, long)]
    input_folder: PathBuf,

    /// Output workbook filename, written inside the input folder
    #[arg(short, long)]
    output_name: String,

    /// Suppress info logs (warnings and errors only)
    #[arg(short, long)]
    quiet: bool,

    /// Print the resolved merge plan as JSON instead of writing the workbook
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&cli) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> tabmerge_core::Result<()> {
    let folder = &cli.input_folder;
    if !folder.is_dir() {
        return Err(Error::FolderNotFound(folder.clone()));
    }

    let plan = build_plan(folder, &ExtractOptions::default())?;

    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&plan.summary())?);
        return Ok(());
    }

    let out_path = folder.join(&cli.output_name);
    write_workbook(&out_path, &plan)?;

    Ok(())
}
