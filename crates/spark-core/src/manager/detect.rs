//! Availability probing and per-project manager selection

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use super::descriptor::PackageManager;

/// Upper bound on a single availability probe. A probe that has not
/// answered within this window counts as unavailable.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one detection pass. Created per invocation, never persisted.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Available managers, sorted ascending by priority.
    pub available: Vec<PackageManager>,
    /// The manager chosen for the project, if any manager is available.
    pub selected: Option<PackageManager>,
}

/// Check whether a manager is usable by running its version command.
///
/// Spawn errors, non-zero exits, and timeouts all mean "unavailable";
/// none of them surface to the caller.
pub async fn probe(manager: PackageManager) -> bool {
    probe_command(manager.command(), manager.probe_args()).await
}

async fn probe_command(program: &str, args: &[&str]) -> bool {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output();

    matches!(timeout(PROBE_TIMEOUT, output).await, Ok(Ok(out)) if out.status.success())
}

/// Probe every known manager and return the available ones sorted
/// ascending by priority. Probes run concurrently; the result order does
/// not depend on which probe answers first.
pub async fn detect_available() -> Vec<PackageManager> {
    let [npm, yarn, pnpm] = PackageManager::ALL;
    let (npm_ok, yarn_ok, pnpm_ok) = tokio::join!(probe(npm), probe(yarn), probe(pnpm));

    let mut available: Vec<PackageManager> = [(npm, npm_ok), (yarn, yarn_ok), (pnpm, pnpm_ok)]
        .into_iter()
        .filter_map(|(manager, ok)| ok.then_some(manager))
        .collect();
    available.sort_by_key(|manager| manager.priority());
    available
}

/// Choose the manager for a project.
///
/// The first available manager whose lock file exists at `project_path`
/// wins; lock-file presence always overrides priority order. Without a
/// matching lock file the lowest-priority available manager is returned.
/// An empty `available` set yields `None`.
pub fn select(project_path: &Path, available: &[PackageManager]) -> Option<PackageManager> {
    for manager in available {
        if project_path.join(manager.lock_file()).exists() {
            return Some(*manager);
        }
    }
    available.first().copied()
}

/// Probe and select in one step.
pub async fn detect(project_path: &Path) -> DetectionResult {
    let available = detect_available().await;
    let selected = select(project_path, &available);
    DetectionResult {
        available,
        selected,
    }
}
