//! Archive extraction with unconditional cleanup.
//!
//! HistData zips bundle the tick CSV with a plain-text copy of the same
//! data. Extraction expands everything, deletes the archive no matter what
//! happened, then drops the redundant `.txt` files from the destination.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Extension of the auxiliary text copies removed after extraction.
pub const AUXILIARY_EXTENSION: &str = "txt";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("corrupt archive {archive}: {reason}")]
    Corrupt { archive: PathBuf, reason: String },

    #[error("I/O error during extraction: {0}")]
    Io(#[from] io::Error),
}

/// Expands one archive into a directory.
pub trait Unpack {
    /// Extract `archive` into `dest` and delete `archive`.
    ///
    /// Returns the data files placed in `dest`. The archive is gone
    /// afterwards whether or not extraction succeeded.
    fn unpack(&self, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, ExtractError>;
}

/// Zip extractor used for HistData archives.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl Unpack for ZipExtractor {
    fn unpack(&self, archive: &Path, dest: &Path) -> Result<Vec<PathBuf>, ExtractError> {
        let _cleanup = RemoveOnDrop(archive);

        let mut placed = extract_zip(archive, dest)?;
        remove_auxiliary_files(dest);
        placed.retain(|p| p.exists());

        debug!(archive = %archive.display(), files = placed.len(), "extracted");
        Ok(placed)
    }
}

/// Deletes a file when dropped; a file that is already gone is fine.
struct RemoveOnDrop<'a>(&'a Path);

impl Drop for RemoveOnDrop<'_> {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(self.0) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Could not delete {} - {e}", self.0.display());
            }
        }
    }
}

fn corrupt(archive: &Path, reason: impl ToString) -> ExtractError {
    ExtractError::Corrupt {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Expand every entry into a scratch directory inside `dest`, then move
/// the results into place. A bad entry aborts before anything reaches
/// `dest`; the scratch directory is removed on drop.
fn extract_zip(archive_path: &Path, dest: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| corrupt(archive_path, e))?;

    let scratch = tempfile::Builder::new()
        .prefix(".unpack-")
        .tempdir_in(dest)?;

    let mut dirs: Vec<PathBuf> = Vec::new();
    let mut files: Vec<PathBuf> = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| corrupt(archive_path, e))?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!("skipping entry with unsafe path {:?}", entry.name());
            continue;
        };

        let staged = scratch.path().join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&staged)?;
            dirs.push(relative);
            continue;
        }

        if let Some(parent) = staged.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&staged)?;
        io::copy(&mut entry, &mut out).map_err(|e| corrupt(archive_path, e))?;
        files.push(relative);
    }

    for dir in &dirs {
        fs::create_dir_all(dest.join(dir))?;
    }

    let mut placed = Vec::with_capacity(files.len());
    for relative in files {
        let target = dest.join(&relative);
        if let Err(e) = move_into_place(&scratch.path().join(&relative), &target) {
            roll_back(&placed);
            return Err(e.into());
        }
        placed.push(target);
    }

    Ok(placed)
}

fn move_into_place(staged: &Path, target: &Path) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(staged, target)
}

/// Remove files an interrupted move already placed.
fn roll_back(placed: &[PathBuf]) {
    for path in placed {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not roll back {} - {e}", path.display());
        }
    }
}

fn is_auxiliary(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(AUXILIARY_EXTENSION))
}

/// Remove every `.txt` file directly inside `dir`. Failures are warnings.
pub fn remove_auxiliary_files(dir: &Path) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not list {} - {e}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !is_auxiliary(&path) {
            continue;
        }
        if let Err(e) = fs::remove_file(&path) {
            warn!(
                "Could not delete {} - {e}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );
        }
    }
}
