//! Snapshot file I/O
//!
//! Whole-document reads and crash-safe whole-document writes.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::codec::EMPTY_DOCUMENT;

/// Replace the file at `path` with `bytes`
///
/// Writes a sibling temp file, fsyncs it, then renames it over the target,
/// so a crash leaves either the old document or the new one on disk.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = temp_path(path);

    let result = (|| -> Result<()> {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Read the whole snapshot file
pub fn read(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// Write an empty document if no snapshot file exists yet
///
/// Returns `true` if the file was created.
pub fn ensure_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    write_atomic(path, EMPTY_DOCUMENT)?;
    tracing::info!("Created empty snapshot at {}", path.display());
    Ok(true)
}

/// Temp file used while replacing `path` ("data.json" → "data.json.tmp")
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
