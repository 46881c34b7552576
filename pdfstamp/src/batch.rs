//! Batch stamping of a directory of PDFs.
//!
//! [`BatchStamper`] drives one run: it checks the input directory, creates the
//! output directory, discovers input files and runs
//! load → render → merge → write for each of them. A file that cannot be
//! processed is recorded in the [`RunSummary`] and the run continues with the
//! next one; only setup problems abort the run.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstamp::batch::BatchStamper;
//! use pdfstamp::config::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let summary = BatchStamper::new(Config::new("scans")).run().await?;
//! println!("{} of {} stamped", summary.succeeded, summary.found);
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::discovery;
use crate::error::{PdfStampError, Result};
use crate::io::{PdfReader, PdfWriter, WriteOptions};
use crate::stamp::{OverlayRenderer, PageMerger};

/// Outcome of a single input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// A stamped copy was written.
    Stamped,
    /// The file was left alone (it has no pages).
    Skipped,
    /// The file could not be read, stamped or written.
    Failed,
}

/// Per-file entry of a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    /// Input file.
    pub input: PathBuf,
    /// Output file, when one was written.
    pub output: Option<PathBuf>,
    /// What happened to the file.
    pub status: FileStatus,
    /// Page count, when the file could be read.
    pub page_count: Option<u32>,
    /// Error or skip reason.
    pub message: Option<String>,
}

impl FileReport {
    fn stamped(input: PathBuf, output: PathBuf, page_count: u32) -> Self {
        Self {
            input,
            output: Some(output),
            status: FileStatus::Stamped,
            page_count: Some(page_count),
            message: None,
        }
    }

    fn from_error(input: PathBuf, err: &PdfStampError) -> Self {
        let (status, page_count) = if err.is_skip() {
            (FileStatus::Skipped, Some(0))
        } else {
            (FileStatus::Failed, None)
        };

        Self {
            input,
            output: None,
            status,
            page_count,
            message: Some(err.to_string()),
        }
    }

    /// File name of the input, for display.
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// Aggregate result of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Directory that was scanned.
    pub input_dir: PathBuf,
    /// Directory that received the stamped copies.
    pub output_dir: PathBuf,
    /// Number of PDF files discovered.
    pub found: usize,
    /// Number of files stamped and written.
    pub succeeded: usize,
    /// Number of files that could not be processed.
    pub failed: usize,
    /// Number of files deliberately left alone.
    pub skipped: usize,
    /// One report per discovered file, in discovery order.
    pub reports: Vec<FileReport>,
    /// Wall-clock duration of the run.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunSummary {
    fn new(input_dir: PathBuf, output_dir: PathBuf, found: usize) -> Self {
        Self {
            input_dir,
            output_dir,
            found,
            reports: Vec::with_capacity(found),
            ..Default::default()
        }
    }

    /// Count a file report.
    pub fn record(&mut self, report: FileReport) {
        match report.status {
            FileStatus::Stamped => self.succeeded += 1,
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Failed => self.failed += 1,
        }
        self.reports.push(report);
    }

    /// Whether any file failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Total number of pages across stamped files.
    pub fn total_pages(&self) -> u64 {
        self.reports
            .iter()
            .filter(|r| r.status == FileStatus::Stamped)
            .filter_map(|r| r.page_count)
            .map(u64::from)
            .sum()
    }
}

/// Runs the stamping pipeline over a directory.
#[derive(Debug, Clone)]
pub struct BatchStamper {
    config: Config,
    reader: PdfReader,
    renderer: OverlayRenderer,
    merger: PageMerger,
    writer: PdfWriter,
}

impl BatchStamper {
    /// Create a stamper for `config`.
    pub fn new(config: Config) -> Self {
        let renderer = OverlayRenderer::new(config.layout.clone());
        let writer = PdfWriter::with_options(WriteOptions {
            compress: config.compress,
            ..Default::default()
        });

        Self {
            config,
            reader: PdfReader::new(),
            renderer,
            merger: PageMerger::new(),
            writer,
        }
    }

    /// Configuration of this run.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stamp every PDF in the input directory.
    ///
    /// # Errors
    ///
    /// Only setup failures are returned: a missing input directory, an input
    /// path that is not a directory, or an output directory that cannot be
    /// created. Per-file problems are reported in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with_progress(|_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_progress` with each file report
    /// as it completes, in discovery order.
    #[instrument(skip(self, on_progress), fields(input_dir = %self.config.input_dir.display()))]
    pub async fn run_with_progress<F>(&self, mut on_progress: F) -> Result<RunSummary>
    where
        F: FnMut(&FileReport),
    {
        let start = Instant::now();
        let input_dir = self.config.input_dir.clone();

        discovery::check_input_dir(&input_dir)?;

        let output_dir = self.config.resolved_output_dir();
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| PdfStampError::FailedToCreateOutputDir {
                path: output_dir.clone(),
                source,
            })?;

        let inputs = discovery::discover_pdfs(&input_dir)?;
        info!(
            found = inputs.len(),
            output_dir = %output_dir.display(),
            jobs = self.config.jobs,
            "Starting batch"
        );

        let mut summary = RunSummary::new(input_dir, output_dir.clone(), inputs.len());

        let tasks = inputs.into_iter().map(|input| {
            let output = self.config.output_path_for(&output_dir, &input);
            async move { self.process_file(input, output).await }
        });

        let mut reports = stream::iter(tasks).buffered(self.config.jobs.max(1));
        while let Some(report) = reports.next().await {
            on_progress(&report);
            summary.record(report);
        }

        summary.elapsed = start.elapsed();
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            elapsed = ?summary.elapsed,
            "Batch finished"
        );

        Ok(summary)
    }

    async fn process_file(&self, input: PathBuf, output: PathBuf) -> FileReport {
        match self.stamp_file(&input, &output).await {
            Ok(page_count) => {
                info!(input = %input.display(), page_count, "Stamped");
                FileReport::stamped(input, output, page_count)
            }
            Err(err) => {
                if err.is_skip() {
                    info!(input = %input.display(), reason = %err, "Skipped");
                } else {
                    info!(input = %input.display(), error = %err, "Failed");
                }
                FileReport::from_error(input, &err)
            }
        }
    }

    /// Stamp a single file and write the result to `output`.
    ///
    /// Returns the page count of the stamped document.
    pub async fn stamp_file(&self, input: &Path, output: &Path) -> Result<u32> {
        let loaded = self.reader.load(input).await?;
        let page_count = loaded.page_count;
        let first_page = loaded.first_page()?;
        let mut document = loaded.document;

        let renderer = self.renderer.clone();
        let merger = self.merger;
        let document = task::spawn_blocking(move || {
            let overlay = renderer.render_for_page(&document, first_page, page_count)?;
            merger.merge(&mut document, first_page, overlay)?;
            Ok::<_, PdfStampError>(document)
        })
        .await
        .map_err(|e| PdfStampError::other(format!("Stamp task failed: {e}")))??;

        let stats = self.writer.save_with_stats(document, output).await?;
        debug!(
            output = %stats.output_path.display(),
            size = %stats.format_file_size(),
            "Saved stamped copy"
        );

        Ok(page_count)
    }
}
