//! Template scanning, placeholder substitution, and copying
//!
//! This module provides:
//! - Recursive template scanning with binary/text classification
//! - Project-name variable derivation and placeholder substitution
//! - The bounded-concurrency copy pipeline with post-copy validation
//! - Destination and template-root resolution

pub mod copier;
pub mod dest;
pub mod placeholder;
pub mod scanner;

use std::path::{Path, PathBuf};

use crate::error::ScaffoldError;

pub use copier::{
    build_mappings, copy_all, ensure_directories, validate, CopyFailure, CopyOptions,
    CopyProgress, CopyReport, FileMapping, SizeMismatch, ValidationReport,
    DEFAULT_COPY_CONCURRENCY,
};
pub use dest::{resolve_destination, Destination};
pub use placeholder::{substitute, ProjectVariables};
pub use scanner::{analyze, classify, scan, FileDescriptor, FileKind, TemplateAnalysis};

/// Environment variable overriding where the bundled template lives.
pub const TEMPLATE_DIR_ENV: &str = "CREATE_SPARK_TEMPLATE_DIR";

/// Relative location of the bundled template tree.
pub const DEFAULT_TEMPLATE_SUBDIR: &str = "templates/create-spark";

/// Locate the template source tree.
///
/// Order: an explicit path, the [`TEMPLATE_DIR_ENV`] override, the
/// bundled tree relative to the working directory, then the bundled tree
/// relative to the executable's ancestors (for installed binaries).
pub fn resolve_template_root(explicit: Option<&Path>) -> Result<PathBuf, ScaffoldError> {
    if let Some(path) = explicit {
        return if path.is_dir() {
            Ok(path.to_path_buf())
        } else {
            Err(ScaffoldError::TemplateMissing {
                path: path.to_path_buf(),
            })
        };
    }

    if let Ok(value) = std::env::var(TEMPLATE_DIR_ENV) {
        let path = PathBuf::from(value);
        return if path.is_dir() {
            Ok(path)
        } else {
            Err(ScaffoldError::TemplateMissing { path })
        };
    }

    let local = PathBuf::from(DEFAULT_TEMPLATE_SUBDIR);
    if local.is_dir() {
        return Ok(local);
    }

    if let Ok(exe) = std::env::current_exe() {
        for ancestor in exe.ancestors().skip(1) {
            let candidate = ancestor.join(DEFAULT_TEMPLATE_SUBDIR);
            if candidate.is_dir() {
                return Ok(candidate);
            }
        }
    }

    Err(ScaffoldError::TemplateMissing { path: local })
}
