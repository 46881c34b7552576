//! Output formatting and display for pdfstamp.
//!
//! This module handles all user-facing output:
//! - Formatted status messages
//! - Per-file progress lines
//! - The end-of-run summary
//!
//! # Examples
//!
//! ```no_run
//! use pdfstamp::output::OutputFormatter;
//! use pdfstamp::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Found 3 PDF file(s) to process.");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::batch::{FileReport, FileStatus, RunSummary};

const RULE: &str = "============================================================";

/// One-line description of a processed file.
pub fn file_report_line(report: &FileReport) -> String {
    let name = report.file_name();
    match report.status {
        FileStatus::Stamped => {
            let pages = report.page_count.unwrap_or_default();
            match &report.output {
                Some(output) => format!("{name}: {pages} page(s), saved to {}", output.display()),
                None => format!("{name}: {pages} page(s)"),
            }
        }
        FileStatus::Skipped | FileStatus::Failed => {
            let verb = if report.status == FileStatus::Skipped {
                "skipped"
            } else {
                "failed"
            };
            match &report.message {
                Some(message) => format!("{name}: {verb}: {}", first_line(message)),
                None => format!("{name}: {verb}"),
            }
        }
    }
}

/// Display the outcome of one file.
pub fn display_file_report(formatter: &OutputFormatter, report: &FileReport) {
    let line = file_report_line(report);
    match report.status {
        FileStatus::Stamped => formatter.success(&line),
        FileStatus::Skipped => formatter.warning(&line),
        FileStatus::Failed => formatter.error(&line),
    }

    if let Some(message) = &report.message
        && message.contains('\n')
    {
        formatter.detail("Details", message);
    }
}

/// Summary block printed at the end of a run.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    vec![
        RULE.to_string(),
        "Processing Summary".to_string(),
        RULE.to_string(),
        format!("Total files found:    {}", summary.found),
        format!("Successfully stamped: {}", summary.succeeded),
        format!("Failed:               {}", summary.failed),
        format!("Skipped:              {}", summary.skipped),
        RULE.to_string(),
    ]
}

/// Display the end-of-run summary.
pub fn display_run_summary(formatter: &OutputFormatter, summary: &RunSummary) {
    if summary.found == 0 {
        formatter.warning(&format!(
            "No PDF files found in {}",
            summary.input_dir.display()
        ));
        return;
    }

    formatter.blank_line();
    for line in summary_lines(summary) {
        formatter.info(&line);
    }

    formatter.detail("Output folder", &summary.output_dir.display().to_string());
    formatter.detail("Pages stamped", &summary.total_pages().to_string());
    formatter.detail(
        "Elapsed",
        &format!("{:.2}s", summary.elapsed.as_secs_f64()),
    );

    if summary.has_failures() {
        formatter.warning(&format!("{} file(s) could not be stamped", summary.failed));
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or(message)
}
