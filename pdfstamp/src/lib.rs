//! pdfstamp - Stamp every PDF in a folder with its page count.
//!
//! For each PDF found directly inside an input folder, pdfstamp draws a small
//! stamp on the first page (a rounded box reading "Received and Reviewed" and
//! "`N` Pages", followed by two blank rules for a signature and a date) and
//! saves the result under a prefixed name in an output folder. Input files are
//! never modified.
//!
//! # Examples
//!
//! ## Stamping a folder
//!
//! ```no_run
//! use pdfstamp::batch::BatchStamper;
//! use pdfstamp::config::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::new("scans");
//! config.jobs = 4;
//!
//! let summary = BatchStamper::new(config).run().await?;
//! println!(
//!     "found {}, stamped {}, failed {}, skipped {}",
//!     summary.found, summary.succeeded, summary.failed, summary.skipped
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Using individual components
//!
//! ```no_run
//! use pdfstamp::io::{PdfReader, PdfWriter};
//! use pdfstamp::stamp::{OverlayRenderer, PageMerger, StampLayout};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = PdfReader::new().load(Path::new("scan.pdf")).await?;
//! let first_page = loaded.first_page()?;
//! let mut document = loaded.document;
//!
//! let overlay = OverlayRenderer::new(StampLayout::default())
//!     .render_for_page(&document, first_page, loaded.page_count)?;
//! PageMerger::new().merge(&mut document, first_page, overlay)?;
//!
//! PdfWriter::new().save(document, Path::new("stamped_scan.pdf")).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod config;
pub mod discovery;
pub mod error;
pub mod io;
pub mod output;
pub mod stamp;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use batch::{BatchStamper, FileReport, FileStatus, RunSummary};
pub use config::Config;
pub use error::{PdfStampError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
