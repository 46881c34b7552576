//! CLI argument parsing for pdfstamp.
//!
//! This module defines the command-line interface using `clap` and turns the
//! parsed arguments into a validated [`Config`].

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use pdfstamp::config::{Config, DEFAULT_PREFIX};
use pdfstamp::error::{PdfStampError, Result};
use pdfstamp::stamp::{Color, Corner, StampLayout};

/// Stamp every PDF in a folder with its page count.
///
/// Each PDF found directly inside INPUT_DIR gets a red "Received and
/// Reviewed / N Pages" stamp on its first page. The stamped copy is saved as
/// `<prefix><name>` in OUTPUT_DIR; the original is left untouched.
#[derive(Parser, Debug)]
#[command(name = "pdfstamp")]
#[command(version)]
#[command(about = "Stamp every PDF in a folder with its page count", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Folder containing the PDF files to stamp
    ///
    /// Only files directly inside this folder are processed; subfolders are
    /// ignored. Files are matched by a `.pdf` extension in any letter case.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Folder that receives the stamped copies
    ///
    /// Created if it does not exist. Defaults to a `stamped_pdfs` folder
    /// inside INPUT_DIR.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Prefix added to the name of each stamped copy
    #[arg(long, value_name = "TEXT", default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// JSON file describing the stamp layout
    ///
    /// Any field left out keeps its default value. Unknown fields are
    /// rejected.
    ///
    /// Example:
    ///   { "header_text": "Approved", "font_size": 12, "corner": "top-right" }
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Page corner for the stamp, overriding the layout file. `auto` picks
    /// the corner with the least text under it
    #[arg(long, value_name = "CORNER")]
    #[arg(value_parser = ["top-left", "top-right", "bottom-left", "bottom-right", "auto"])]
    pub corner: Option<String>,

    /// Stamp colour as six hex digits (e.g. ff0000), overriding the layout file
    #[arg(long, value_name = "RRGGBB")]
    pub color: Option<String>,

    /// Number of files processed concurrently
    ///
    /// Output and report order do not depend on this value.
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Compress streams in the stamped copies
    ///
    /// Off by default so that everything except the stamp is written back
    /// exactly as it was read.
    #[arg(long)]
    pub compress: bool,

    /// Print the run summary as JSON on stdout instead of progress messages
    #[arg(long)]
    pub json: bool,

    /// Verbose output - show details and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// Loads the layout file if one was given, then applies `--corner` and
    /// `--color` on top of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout file cannot be read or is invalid, or
    /// if any argument is out of range.
    pub async fn to_config(&self) -> Result<Config> {
        let mut layout = match &self.layout {
            Some(path) => StampLayout::load(path).await?,
            None => StampLayout::default(),
        };

        if let Some(corner) = &self.corner {
            layout.corner = Corner::from_str(corner)?;
        }

        if let Some(color) = &self.color {
            layout.color =
                Color::parse_hex(color).map_err(|e| PdfStampError::invalid_config(e.to_string()))?;
        }

        let config = Config {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            prefix: self.prefix.clone(),
            layout,
            jobs: self.jobs,
            compress: self.compress,
            // JSON owns stdout; -v then only raises the log level on stderr.
            quiet: self.quiet || self.json,
            verbose: self.verbose && !self.json,
        };

        config.validate().map_err(|e| {
            PdfStampError::invalid_config(format!("Configuration validation failed: {e:#}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before any file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(PdfStampError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if self.prefix.is_empty() {
            return Err(PdfStampError::invalid_config("Output prefix cannot be empty"));
        }

        if let Some(ref corner) = self.corner {
            Corner::from_str(corner)?;
        }

        if let Some(ref color) = self.color {
            Color::parse_hex(color).map_err(|e| PdfStampError::invalid_config(e.to_string()))?;
        }

        Ok(())
    }
}
