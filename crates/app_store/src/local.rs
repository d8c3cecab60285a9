//! Local filesystem side of bulk transfers

use crate::{Result, StoreError};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Every regular file under `dir`, paired with its `/`-separated relative key
pub(crate) fn collect_local_files(dir: &Path) -> Result<Vec<(PathBuf, String)>> {
    if !dir.is_dir() {
        return Err(StoreError::InvalidPath(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|_| StoreError::InvalidPath(entry.path().display().to_string()))?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((entry.into_path(), key));
    }
    Ok(files)
}

/// Local path for a key relative to a download root.
///
/// Keys with `..`, `.` or absolute components are refused so a download can
/// never write outside `root`.
pub(crate) fn local_target(root: &Path, relative_key: &str) -> Result<PathBuf> {
    let relative = Path::new(relative_key);
    if relative_key.is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(StoreError::InvalidPath(relative_key.to_string()));
    }
    Ok(root.join(relative))
}
