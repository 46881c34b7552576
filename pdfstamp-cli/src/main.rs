//! pdfstamp - Stamp every PDF in a folder with its page count.
//!
//! Stamped copies are written next to the originals, in a separate folder,
//! and a summary of the run is printed at the end.

mod cli;

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdfstamp::batch::BatchStamper;
use pdfstamp::error::PdfStampError;
use pdfstamp::output::{OutputFormatter, display_file_report, display_run_summary};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Run the application and handle errors
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Default log filter when `RUST_LOG` is not set.
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "pdfstamp=debug" } else { "warn" }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    // A second subscriber (e.g. under tests) is not an error worth reporting.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main application logic.
///
/// Files that fail to stamp do not make the run fail; they are listed in the
/// summary instead.
async fn run(cli: Cli) -> Result<(), PdfStampError> {
    // Validate CLI arguments
    cli.validate()?;

    let config = cli.to_config().await?;
    let formatter = OutputFormatter::from_config(&config);

    // Print header
    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfstamp::NAME, pdfstamp::VERSION));
        formatter.info(&format!("Input folder:  {}", config.input_dir.display()));
        formatter.info(&format!(
            "Output folder: {}",
            config.resolved_output_dir().display()
        ));
        formatter.blank_line();
    }

    let stamper = BatchStamper::new(config);
    let summary = stamper
        .run_with_progress(|report| display_file_report(&formatter, report))
        .await?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| PdfStampError::other(format!("Failed to serialize summary: {e}")))?;
        println!("{json}");
    } else {
        display_run_summary(&formatter, &summary);
    }

    Ok(())
}
