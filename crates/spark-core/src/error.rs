//! Error types shared across the scaffolding and install subsystems
//!
//! Pre-flight failures (manifest, detection, environment) abort an operation
//! before any subprocess is spawned or file is copied. Process-level failures
//! carry the captured output so callers can inspect what the package manager
//! printed. Per-file copy and validation problems are never raised as errors;
//! they are collected into reports by the copy pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::install::InstallResult;
use crate::manager::PackageManager;
use crate::process::CommandCapture;

/// Failures while supervising a single external command.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable could not be started at all.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process did not exit before the configured timeout and was
    /// terminated (softly, then forcefully after the grace window).
    #[error("`{command}` timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },

    /// The process exited with a non-zero code. The full capture is kept so
    /// the caller can inspect stdout/stderr and the exit code.
    #[error("`{command}` exited with code {}", .capture.exit_code)]
    Failed {
        command: String,
        capture: CommandCapture,
    },

    /// I/O failure while reading the process streams or waiting for exit.
    #[error("i/o error while supervising `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the "install dependencies" operation.
#[derive(Debug, Error)]
pub enum InstallError {
    /// No supported package manager is available on this system.
    #[error("no package manager found; please install npm, yarn, or pnpm")]
    Detection,

    /// The project manifest is missing or unparseable. Checked before any
    /// subprocess is spawned.
    #[error("invalid package.json at {}: {reason}", .path.display())]
    Manifest { path: PathBuf, reason: String },

    /// Blocking environment issues (e.g. no write permission on the project
    /// directory). Non-blocking findings stay in the environment report as
    /// warnings and never produce this error.
    #[error("environment check failed: {}", .issues.join("; "))]
    Environment { issues: Vec<String> },

    /// A process-level failure from the selected manager's install command.
    #[error("{}: {source}", .manager.display_name())]
    Process {
        manager: PackageManager,
        #[source]
        source: ProcessError,
    },
}

impl InstallError {
    /// The terminal [`InstallResult`] of a failed install attempt, when one
    /// exists (the process ran and exited non-zero).
    pub fn install_result(&self) -> Option<InstallResult> {
        match self {
            Self::Process {
                manager,
                source: ProcessError::Failed { command, capture },
            } => Some(InstallResult::from_capture(
                *manager,
                command.clone(),
                capture.clone(),
            )),
            _ => None,
        }
    }
}

/// Failures of the template-copy half of the engine.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// The template source tree does not exist.
    #[error("template directory not found: {}", .path.display())]
    TemplateMissing { path: PathBuf },

    /// The destination directory already exists and overwriting was not
    /// requested.
    #[error("directory \"{name}\" already exists; pass --force to overwrite")]
    DestinationExists { name: String },

    /// The parent of the destination directory does not exist.
    #[error("parent directory does not exist: {}", .path.display())]
    ParentMissing { path: PathBuf },

    /// The parent of the destination directory is not writable.
    #[error("no write permission for directory: {}", .path.display())]
    NotWritable { path: PathBuf },

    /// The template walk failed partway through.
    #[error("failed to scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A destination directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
