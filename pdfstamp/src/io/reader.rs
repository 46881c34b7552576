//! PDF loading.
//!
//! Files are read with `tokio::fs` and parsed on the blocking pool, so a large
//! or malformed document never stalls the async runtime.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstamp::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(Path::new("invoice.pdf")).await?;
//! println!("{} pages in {:?}", loaded.page_count, loaded.load_time);
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, ObjectId};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, instrument};

use crate::error::{PdfStampError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document. Always at least one.
    pub page_count: u32,

    /// Time taken to read and parse the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    /// Object id of the first page.
    pub fn first_page(&self) -> Result<ObjectId> {
        self.document
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or_else(|| PdfStampError::empty_document(self.path.clone()))
    }
}

/// PDF reader.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// - [`PdfStampError::UnreadableInput`] if the file cannot be read or is
    ///   not a valid PDF
    /// - [`PdfStampError::EncryptedPdf`] if the document is encrypted
    /// - [`PdfStampError::EmptyDocument`] if the document has no pages
    #[instrument(skip(self), level = "debug")]
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();
        let start = Instant::now();

        let bytes = tokio::fs::read(&path_buf)
            .await
            .map_err(|e| PdfStampError::unreadable(path_buf.clone(), e.to_string()))?;
        let file_size = bytes.len() as u64;

        let parse_path = path_buf.clone();
        let document = task::spawn_blocking(move || {
            Document::load_mem(&bytes).map_err(|e| {
                let err_msg = e.to_string();
                let lower = err_msg.to_lowercase();
                if lower.contains("encrypt") || lower.contains("decrypt") || lower.contains("password")
                {
                    PdfStampError::encrypted_pdf(parse_path)
                } else {
                    PdfStampError::unreadable(parse_path, err_msg)
                }
            })
        })
        .await
        .map_err(|e| PdfStampError::other(format!("Load task failed: {e}")))??;

        if document.is_encrypted() {
            return Err(PdfStampError::encrypted_pdf(path_buf));
        }

        let pages = document.get_pages().len();
        if pages == 0 {
            return Err(PdfStampError::empty_document(path_buf));
        }
        let page_count = u32::try_from(pages).map_err(|_| {
            PdfStampError::unreadable(path_buf.clone(), format!("too many pages: {pages}"))
        })?;

        let load_time = start.elapsed();
        debug!(page_count, file_size, ?load_time, "Loaded PDF");

        Ok(LoadedPdf {
            document,
            path: path_buf,
            page_count,
            load_time,
            file_size,
        })
    }
}
