//! Error types for pdfstamp.
//!
//! Errors fall into two groups. Per-file errors (an unreadable or empty input,
//! a failed render or write) are recorded in the run summary and the batch
//! moves on. Setup errors (a missing input directory, an output directory that
//! cannot be created, an invalid configuration) stop the run before any file
//! is touched.

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfstamp operations.
pub type Result<T> = std::result::Result<T, PdfStampError>;

/// Main error type for pdfstamp operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfStampError {
    /// Input directory does not exist.
    #[error("Input folder does not exist: {}", path.display())]
    InputDirNotFound {
        /// Path that was given as the input directory.
        path: PathBuf,
    },

    /// Input path exists but is not a directory.
    #[error("Not a directory: {}", path.display())]
    NotADirectory {
        /// Path that was given as the input directory.
        path: PathBuf,
    },

    /// Output directory could not be created.
    #[error("Failed to create output folder: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input file could not be read or parsed as a PDF.
    #[error("Could not read PDF: {}\n  Reason: {reason}", path.display())]
    UnreadableInput {
        /// Path to the input file.
        path: PathBuf,
        /// Reason reported by the reader.
        reason: String,
    },

    /// Input file is encrypted.
    #[error(
        "PDF is encrypted and cannot be stamped: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// Input PDF has no pages.
    #[error("PDF has no pages: {}", path.display())]
    EmptyDocument {
        /// Path to the empty PDF.
        path: PathBuf,
    },

    /// Output file could not be written.
    #[error("Failed to write output file: {}\n  Reason: {source}", path.display())]
    WriteFailure {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The overlay page could not be rendered.
    #[error("Failed to render stamp: {reason}")]
    RenderFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// The overlay could not be merged onto the target page.
    #[error("Failed to merge stamp onto page: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// A layout file could not be read.
    #[error("Failed to read layout file: {}\n  Reason: {source}", path.display())]
    FailedToReadLayout {
        /// Path to the layout file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A layout file was read but its contents are invalid.
    #[error("Invalid layout file: {}\n  Details: {reason}", path.display())]
    InvalidLayout {
        /// Path to the layout file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfStampError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for PdfStampError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(format!("{err:#}"))
    }
}

impl PdfStampError {
    /// Create an UnreadableInput error.
    pub fn unreadable(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::UnreadableInput {
            path,
            reason: reason.into(),
        }
    }

    /// Create an EmptyDocument error.
    pub fn empty_document(path: PathBuf) -> Self {
        Self::EmptyDocument { path }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create a RenderFailed error.
    pub fn render_failed(reason: impl Into<String>) -> Self {
        Self::RenderFailed {
            reason: reason.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single input file.
    ///
    /// The batch driver records these and continues with the next file.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnreadableInput { .. }
                | Self::EncryptedPdf { .. }
                | Self::EmptyDocument { .. }
                | Self::WriteFailure { .. }
                | Self::RenderFailed { .. }
                | Self::MergeFailed { .. }
        )
    }

    /// Check if this error aborts the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InputDirNotFound { .. }
                | Self::NotADirectory { .. }
                | Self::FailedToCreateOutputDir { .. }
                | Self::FailedToReadLayout { .. }
                | Self::InvalidLayout { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Check if this error means the file should be counted as skipped
    /// rather than failed.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::EmptyDocument { .. })
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputDirNotFound { .. } => 2,
            Self::NotADirectory { .. } => 2,
            Self::FailedToCreateOutputDir { .. } => 5,
            Self::UnreadableInput { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::EmptyDocument { .. } => 3,
            Self::WriteFailure { .. } => 5,
            Self::RenderFailed { .. } => 6,
            Self::MergeFailed { .. } => 6,
            Self::FailedToReadLayout { .. } => 2,
            Self::InvalidLayout { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
