//! Input discovery.
//!
//! Only regular files directly inside the input directory are considered.
//! Subdirectories, including the default output directory, are never entered.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{PdfStampError, Result};

/// Check that `path` is an existing directory.
pub fn check_input_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PdfStampError::InputDirNotFound {
            path: path.to_path_buf(),
        });
    }

    if !path.is_dir() {
        return Err(PdfStampError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Whether `path` has a `.pdf` extension, ignoring ASCII case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// List the PDF files directly inside `dir`, sorted by file name.
///
/// Symbolic links are followed. Entries that cannot be inspected are logged
/// and left out.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    check_input_dir(dir)?;

    let mut found = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "Skipping unreadable directory entry");
                continue;
            }
        };

        if entry.file_type().is_file() && has_pdf_extension(entry.path()) {
            found.push(entry.into_path());
        }
    }

    debug!(dir = %dir.display(), count = found.len(), "Discovered PDFs");

    Ok(found)
}
