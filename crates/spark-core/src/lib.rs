//! Spark Core - Project scaffolding and dependency installation
//!
//! This library powers the `create-spark` CLI. It covers the two halves of
//! scaffolding a new project from the bundled template:
//!
//! - **Copy half**: scan the template tree, derive name variables from the
//!   project name, and copy files with bounded concurrency, substituting
//!   placeholders in text files and validating the result.
//! - **Install half**: detect an available package manager, pre-check the
//!   environment, and drive the manager's install subprocess with timeout
//!   escalation and live progress parsing.
//!
//! The halves are independent; the CLI composes them. Rendering (progress
//! bars, colored summaries) happens in the binary — the library reports
//! progress through plain callbacks and returns report values.
//!
//! # Example (copy half)
//!
//! ```ignore
//! use spark_core::template::{self, CopyOptions, ProjectVariables};
//!
//! let files = template::scan(&template_root)?;
//! let vars = ProjectVariables::derive("My App");
//! let mappings = template::build_mappings(&files, &destination);
//! template::ensure_directories(&mappings).await?;
//! let report = template::copy_all(&mappings, &vars, &CopyOptions::default(), |p| {
//!     eprintln!("{}/{}", p.completed, p.total);
//! })
//! .await;
//! ```

pub mod error;
pub mod install;
pub mod manager;
pub mod process;
pub mod progress;
pub mod template;

mod fsutil;

// Re-export main types for convenience
pub use error::{InstallError, ProcessError, ScaffoldError};
pub use install::{install, install_with_manager, InstallOptions, InstallResult, PackageManifest};
pub use manager::{DetectionResult, PackageManager};
pub use progress::{InstallProgress, ProgressState};
pub use template::{
    CopyOptions, CopyReport, FileDescriptor, FileKind, FileMapping, ProjectVariables,
    TemplateAnalysis, ValidationReport,
};
