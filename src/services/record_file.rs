//! On-disk encoding shared by the staging store and the team archive.
//!
//! One record per file, pretty JSON, named after its [`RecordKey`]. Writes go
//! through `<path>.tmp` and a rename so an interrupted write never leaves a
//! half-written record under a valid key.
//!
//! [`RecordKey`]: crate::models::RecordKey

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DropError, DropResult};
use crate::models::DropRecord;

pub fn write_record(path: &Path, record: &DropRecord, overwrite: bool) -> DropResult<()> {
    if path.exists() && !overwrite {
        return Err(DropError::Conflict(display_name(path)));
    }

    let json = serde_json::to_vec_pretty(record).map_err(|source| DropError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp_path = tmp_path_for(path);
    let mut file = File::create(&tmp_path)?;
    file.write_all(&json)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;

    debug!("Wrote record {}", path.display());
    Ok(())
}

pub fn read_record(path: &Path) -> DropResult<DropRecord> {
    let bytes = fs::read(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => DropError::NotFound(display_name(path)),
        _ => DropError::Io(err),
    })?;
    serde_json::from_slice(&bytes).map_err(|source| DropError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Moves `from` to `to`, replacing `to` if present.
pub fn move_file(from: &Path, to: &Path) -> DropResult<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // rename cannot cross filesystems
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}

/// Sorted names of the regular files directly inside `dir`.
pub fn list_file_names(dir: &Path) -> DropResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Sorted names of the directories directly inside `dir`.
pub fn list_dir_names(dir: &Path) -> DropResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// A bare file name is the only thing a caller may use to address an entry.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".tmp");
    PathBuf::from(raw)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
