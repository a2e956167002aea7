use crate::config::format_from_extension;
use crate::error::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Lists the supported image files directly inside `dir`.
///
/// The result is sorted by path, not kept in directory listing order, so
/// folders with matching file names line up index by index.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| AppError::DirectoryScan {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut image_files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();

    image_files.sort();
    Ok(image_files)
}

/// Returns true if the path carries one of the supported image extensions.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(format_from_extension)
        .is_some()
}

/// Final path component as a string, or the whole input when it has none.
///
/// Accepts both `/` and `\` separated names since display names come from
/// the renderer verbatim.
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or(name)
}

pub trait PathExt {
    fn format_for_log(&self) -> String;
}

impl PathExt for Path {
    fn format_for_log(&self) -> String {
        format!("\"{}\"", self.display())
    }
}
