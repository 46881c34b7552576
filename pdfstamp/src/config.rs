//! Configuration module for pdfstamp.
//!
//! This module holds the validated settings of a stamping run, built from CLI
//! arguments by the binary. It handles:
//! - Validation of argument combinations
//! - Application of defaults
//! - Output path resolution

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use crate::stamp::StampLayout;

/// Name of the output directory created inside the input directory when no
/// output directory is given.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "stamped_pdfs";

/// File name prefix of stamped copies.
pub const DEFAULT_PREFIX: &str = "stamped_";

/// Complete configuration for a stamping run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for input PDFs (non-recursive).
    pub input_dir: PathBuf,

    /// Directory receiving stamped copies. `None` means
    /// `<input_dir>/stamped_pdfs`.
    pub output_dir: Option<PathBuf>,

    /// Prefix prepended to each input file name.
    pub prefix: String,

    /// Stamp appearance and placement.
    pub layout: StampLayout,

    /// Number of files processed concurrently.
    pub jobs: usize,

    /// Compress streams in the output files.
    pub compress: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Verbose output mode.
    pub verbose: bool,
}

impl Config {
    /// Configuration with default settings for `input_dir`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            prefix: DEFAULT_PREFIX.to_string(),
            layout: StampLayout::default(),
            jobs: 1,
            compress: false,
            quiet: false,
            verbose: false,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The prefix is empty or contains a path separator
    /// - The stamp layout is invalid
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.jobs == 0 {
            bail!("Number of jobs must be at least 1");
        }

        if self.prefix.is_empty() {
            bail!("Output prefix cannot be empty");
        }

        if self.prefix.contains(['/', '\\']) {
            bail!(
                "Output prefix cannot contain a path separator: {}",
                self.prefix
            );
        }

        self.layout.validate()?;

        Ok(())
    }

    /// Directory that receives the stamped copies.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.input_dir.join(DEFAULT_OUTPUT_DIR_NAME))
    }

    /// Output path for an input file: `<output_dir>/<prefix><file name>`.
    pub fn output_path_for(&self, output_dir: &Path, input: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        output_dir.join(format!("{}{name}", self.prefix))
    }

    /// Check if progress output should be displayed.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }
}
