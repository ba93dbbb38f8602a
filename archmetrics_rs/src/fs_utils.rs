use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{MetricError, Result};

/// Directories never walked during workspace enumeration.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "build",
    "target",
    "bin",
    "out",
    "node_modules",
    ".git",
    ".gradle",
    ".idea",
    ".settings",
];

pub const JAVA_EXTENSION: &str = "java";

pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| MetricError::io(path, e))
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == extension)
}

/// Contents of every other `.java` file in the same directory
/// (non-recursive). Unreadable siblings are skipped; an unreadable
/// directory is an error.
pub fn sibling_sources(path: &Path) -> Result<Vec<(PathBuf, String)>> {
    let dir = match path.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
        Some(dir) => dir,
        None => {
            return Err(MetricError::NoParentDirectory {
                path: path.to_path_buf(),
            });
        }
    };
    let own_name = path.file_name();

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| MetricError::io(dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && has_extension(p, JAVA_EXTENSION))
        .filter(|p| p.file_name() != own_name)
        .collect();
    entries.sort();

    let mut siblings = Vec::with_capacity(entries.len());
    for sibling in entries {
        match fs::read_to_string(&sibling) {
            Ok(content) => siblings.push((sibling, content)),
            Err(e) => debug!("skipping unreadable sibling {}: {e}", sibling.display()),
        }
    }
    Ok(siblings)
}

/// Every file under `root` with the given extension, skipping excluded
/// directory names at any depth. Sorted for stable output.
pub fn gather_files(root: &Path, extension: &str, excluded_dirs: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !excluded_dirs
                    .iter()
                    .any(|ex| entry.file_name().to_str() == Some(ex.as_str()))
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("walk error: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), extension))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}
