//! Destination path resolution and pre-flight checks

use std::path::{Path, PathBuf};

use crate::error::ScaffoldError;
use crate::fsutil::is_writable;

/// A resolved, validated destination for a new project.
#[derive(Debug, Clone)]
pub struct Destination {
    pub path: PathBuf,
    /// Whether the directory already existed (only possible with `force`).
    pub already_existed: bool,
    pub parent: PathBuf,
}

/// Resolve `target_dir/project_name` and verify it can be created.
///
/// An existing destination is an error unless `force` is set. The parent
/// directory must already exist and be writable; nothing is created here.
pub fn resolve_destination(
    project_name: &str,
    target_dir: &Path,
    force: bool,
) -> Result<Destination, ScaffoldError> {
    let path = target_dir.join(project_name);

    let already_existed = path.exists();
    if already_existed && !force {
        return Err(ScaffoldError::DestinationExists {
            name: project_name.to_string(),
        });
    }

    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if !parent.exists() {
        return Err(ScaffoldError::ParentMissing { path: parent });
    }
    if !is_writable(&parent) {
        return Err(ScaffoldError::NotWritable { path: parent });
    }

    Ok(Destination {
        path,
        already_existed,
        parent,
    })
}
