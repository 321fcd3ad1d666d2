//! Small filesystem helpers shared by the install and template halves

use std::path::Path;

/// Effective write access to `path` for the current process.
pub(crate) fn is_writable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use nix::unistd::{access, AccessFlags};
        access(path, AccessFlags::W_OK).is_ok()
    }
    #[cfg(not(unix))]
    {
        std::fs::metadata(path)
            .map(|meta| !meta.permissions().readonly())
            .unwrap_or(false)
    }
}
