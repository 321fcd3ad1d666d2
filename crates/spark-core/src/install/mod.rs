//! Dependency installation orchestration
//!
//! Composes manager detection, environment pre-checks, and the supervised
//! install subprocess into a single operation. Manifest and detection
//! problems fail fast, before any process is spawned; process-level
//! failures propagate with manager context attached. This is the only
//! module that mutates a project's dependency tree (via the subprocess).

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use serde::Deserialize;

use crate::error::InstallError;
use crate::fsutil::is_writable;
use crate::manager::{self, PackageManager};
use crate::process::{self, CommandCapture, OutputStream, RunOptions};
use crate::progress::{InstallProgress, ProgressState};

/// Default timeout for one install attempt (5 minutes).
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Registry host resolved for the best-effort connectivity warning.
pub const REGISTRY_HOST: &str = "registry.npmjs.org";

/// Caller-tunable knobs for one install attempt.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// How long the install subprocess may run.
    pub timeout: Duration,
    /// Environment variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Pass the manager-specific silence flag to the install command.
    pub silent: bool,
    /// Surface manager warnings and stderr chatter to the caller.
    pub verbose: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_INSTALL_TIMEOUT,
            env: Vec::new(),
            silent: false,
            verbose: false,
        }
    }
}

/// Terminal value of one install attempt. Immutable once produced.
#[derive(Debug, Clone)]
pub struct InstallResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub succeeded: bool,
    pub manager: PackageManager,
    pub command: String,
}

impl InstallResult {
    pub(crate) fn from_capture(
        manager: PackageManager,
        command: String,
        capture: CommandCapture,
    ) -> Self {
        Self {
            exit_code: capture.exit_code,
            stdout: capture.stdout,
            stderr: capture.stderr,
            succeeded: capture.succeeded,
            manager,
            command,
        }
    }
}

/// Summary of a parsed `package.json`.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Size of the union of dependencies, devDependencies, and
    /// peerDependencies.
    pub dependency_count: usize,
    pub scripts: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "peerDependencies")]
    peer_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    scripts: BTreeMap<String, String>,
}

/// Validate that a parseable `package.json` exists at `project_path`.
///
/// Fails with [`InstallError::Manifest`]; no subprocess is ever spawned
/// for a project that fails this check.
pub async fn validate_manifest(project_path: &Path) -> Result<PackageManifest, InstallError> {
    let path = project_path.join("package.json");

    let raw = tokio::fs::read_to_string(&path).await.map_err(|source| {
        let reason = if source.kind() == std::io::ErrorKind::NotFound {
            "package.json not found in project directory".to_string()
        } else {
            source.to_string()
        };
        InstallError::Manifest {
            path: path.clone(),
            reason,
        }
    })?;

    let manifest: RawManifest =
        serde_json::from_str(&raw).map_err(|source| InstallError::Manifest {
            path: path.clone(),
            reason: source.to_string(),
        })?;

    let dependency_names: BTreeSet<&String> = manifest
        .dependencies
        .keys()
        .chain(manifest.dev_dependencies.keys())
        .chain(manifest.peer_dependencies.keys())
        .collect();

    Ok(PackageManifest {
        name: manifest.name,
        version: manifest.version,
        dependency_count: dependency_names.len(),
        scripts: manifest.scripts,
    })
}

/// Outcome of the environment pre-checks: blocking issues versus
/// non-blocking warnings.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentReport {
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl EnvironmentReport {
    pub fn can_proceed(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check the environment before spawning the install process.
///
/// A missing write permission on the project directory is a blocking
/// issue. Failing to resolve the registry host is only a warning: the
/// install may still succeed against a cache or a configured mirror.
pub async fn check_environment(project_path: &Path) -> EnvironmentReport {
    let mut report = EnvironmentReport::default();

    if !is_writable(project_path) {
        report.issues.push(format!(
            "No write permission for project directory: {}",
            project_path.display()
        ));
    }

    if tokio::net::lookup_host((REGISTRY_HOST, 443)).await.is_err() {
        report
            .warnings
            .push("Network connectivity check failed - installation may fail".to_string());
    }

    report
}

/// Install the project's dependencies with the best available manager.
///
/// Validates the manifest, detects and selects a manager, then delegates
/// to [`install_with_manager`]. Fails with [`InstallError::Detection`]
/// before any subprocess when no manager is available.
pub async fn install<F>(
    project_path: &Path,
    options: &InstallOptions,
    on_progress: F,
) -> Result<InstallResult, InstallError>
where
    F: FnMut(&ProgressState),
{
    let manifest = validate_manifest(project_path).await?;

    let detection = manager::detect(project_path).await;
    let manager = detection.selected.ok_or(InstallError::Detection)?;

    run_install(manager, project_path, &manifest, options, on_progress).await
}

/// Install with an already-selected manager (e.g. from a prior
/// [`manager::detect`] call shown to the user).
///
/// Progress snapshots are pushed through `on_progress` as install output
/// arrives; rendering is entirely the caller's concern. Errors follow the
/// taxonomy on [`InstallError`]; a non-zero exit embeds the full
/// [`InstallResult`] for inspection.
pub async fn install_with_manager<F>(
    manager: PackageManager,
    project_path: &Path,
    options: &InstallOptions,
    on_progress: F,
) -> Result<InstallResult, InstallError>
where
    F: FnMut(&ProgressState),
{
    let manifest = validate_manifest(project_path).await?;
    run_install(manager, project_path, &manifest, options, on_progress).await
}

async fn run_install<F>(
    manager: PackageManager,
    project_path: &Path,
    manifest: &PackageManifest,
    options: &InstallOptions,
    mut on_progress: F,
) -> Result<InstallResult, InstallError>
where
    F: FnMut(&ProgressState),
{
    let environment = check_environment(project_path).await;
    if !environment.can_proceed() {
        return Err(InstallError::Environment {
            issues: environment.issues,
        });
    }
    for warning in &environment.warnings {
        eprintln!("{} {}", "Warning:".yellow(), warning);
    }

    let args = manager.install_args(options.silent);
    let command = format!("{} {}", manager.command(), args.join(" "));

    let run_options = RunOptions {
        cwd: Some(PathBuf::from(project_path)),
        env: options.env.clone(),
        timeout: options.timeout,
    };

    let mut progress = InstallProgress::new(manager, manifest.dependency_count as u32);

    let capture = process::run(manager.command(), &args, &run_options, |chunk| {
        if options.verbose && chunk.stream == OutputStream::Stderr && !chunk.data.trim().is_empty()
        {
            eprintln!("{}", chunk.data.trim().red());
        }
        progress.update(chunk);
        on_progress(&progress.state());
    })
    .await
    .map_err(|source| InstallError::Process { manager, source })?;

    Ok(InstallResult::from_capture(manager, command, capture))
}
