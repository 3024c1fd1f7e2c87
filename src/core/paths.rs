//! Scan-root resolution and display helpers.

use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::core::errors::{Result, SweepError};

/// Resolve and validate a scan root.
///
/// The path must exist and be a directory (symlinks to directories are
/// accepted at the root only). The result is canonical when the filesystem
/// allows it, otherwise absolute and syntactically normalized.
pub fn resolve_scan_root(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    match fs::metadata(&absolute) {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            return Err(SweepError::InvalidRoot {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(fs::canonicalize(&absolute).unwrap_or_else(|_| normalize_syntactic(&absolute)))
}

/// `path` with the `root` prefix stripped; paths outside `root` come back whole.
#[must_use]
pub fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}
