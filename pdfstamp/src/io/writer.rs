//! PDF writing.
//!
//! Output files are written atomically by default: the document is saved to a
//! hidden sibling file which is then renamed over the destination, so a
//! crashed or failed write never leaves a truncated PDF behind. An existing
//! file at the destination is replaced.
//!
//! Stream compression is off by default, which keeps every stream the stamp
//! did not touch byte-for-byte as it was read.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstamp::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let stats = PdfWriter::new()
//!     .save_with_stats(doc, Path::new("stamped_invoice.pdf"))
//!     .await?;
//! println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, instrument, warn};

use crate::error::{PdfStampError, Result};
use crate::io::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Compress uncompressed streams before writing.
    pub compress: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: false,
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Whether compression was applied.
    pub compressed: bool,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer that compresses streams.
    pub fn with_compression() -> Self {
        Self {
            options: WriteOptions {
                compress: true,
                ..Default::default()
            },
        }
    }

    /// Options used by this writer.
    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Save a PDF document to a file.
    pub async fn save(&self, doc: Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStampError::WriteFailure`] if the file cannot be created,
    /// written or moved into place.
    #[instrument(skip(self, doc), level = "debug")]
    pub async fn save_with_stats(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        let stats = task::spawn_blocking(move || write_document(doc, path_buf, &options))
            .await
            .map_err(|e| PdfStampError::other(format!("Write task failed: {e}")))??;

        debug!(
            size = %stats.format_file_size(),
            write_time = ?stats.write_time,
            "Wrote PDF"
        );

        Ok(stats)
    }
}

fn write_document(
    mut doc: Document,
    path: PathBuf,
    options: &WriteOptions,
) -> Result<WriteStatistics> {
    let start = Instant::now();

    if options.compress {
        doc.compress();
    }

    let write_path = if options.atomic {
        temp_path_for(&path)
    } else {
        path.clone()
    };

    let result = save_to_path(&mut doc, &write_path, options.buffer_size).and_then(|size| {
        if options.atomic {
            std::fs::rename(&write_path, &path).map_err(|e| PdfStampError::WriteFailure {
                path: path.clone(),
                source: e,
            })?;
        }
        Ok(size)
    });

    let file_size = match result {
        Ok(size) => size,
        Err(err) => {
            if options.atomic
                && write_path.exists()
                && let Err(e) = std::fs::remove_file(&write_path)
            {
                warn!(path = %write_path.display(), error = %e, "Could not remove temporary file");
            }
            return Err(err);
        }
    };

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size,
        output_path: path,
        compressed: options.compress,
    })
}

/// Save `doc` to `path` and return the size of the written file.
fn save_to_path(doc: &mut Document, path: &Path, buffer_size: usize) -> Result<u64> {
    let failure = |source: std::io::Error| PdfStampError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(failure)?;
    let mut writer = std::io::BufWriter::with_capacity(buffer_size, file);

    doc.save_to(&mut writer)
        .map_err(|e| failure(std::io::Error::other(e.to_string())))?;
    writer.flush().map_err(failure)?;

    let size = writer.get_ref().metadata().map_err(failure)?.len();
    Ok(size)
}

/// Hidden sibling of `path` used as the target of an atomic write.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
