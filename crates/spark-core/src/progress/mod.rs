//! Manager-aware install progress parsing
//!
//! Each package manager reports progress in its own shape: npm prints an
//! `added N packages` summary, yarn prints `[x/y]` step brackets, pnpm
//! prints `Progress:` lines with a `x/y` pair. The parser consumes output
//! lines in arrival order and keeps a single normalized [`ProgressState`];
//! later matches overwrite earlier counts. Lines that match nothing are
//! ignored, never an error.
//!
//! When no numeric signal has been seen the percent falls back to an
//! elapsed-time estimate against an assumed total duration, capped below
//! completion so a running install is never reported as finished. The
//! assumed duration is a placeholder heuristic, not a measurement.

use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::manager::PackageManager;
use crate::process::{OutputChunk, OutputStream};

/// Assumed install duration for the time-based fallback estimate.
const ASSUMED_INSTALL_DURATION: Duration = Duration::from_secs(60);

/// Ceiling for the time-based estimate, so the bar never signals
/// completion before the process actually exits.
const ESTIMATE_CAP: u8 = 95;

static NPM_ADDED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"added (\d+) packages").expect("valid regex"));
static STEP_BRACKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)/(\d+)\]").expect("valid regex"));
static COUNT_PAIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)/(\d+)").expect("valid regex"));
static CURRENT_PACKAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)installing\s+([^\s@]+)").expect("valid regex"));

/// Numeric fields extracted from a single output line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialProgress {
    pub installed: Option<u32>,
    pub total: Option<u32>,
    pub current_package: Option<String>,
}

impl PartialProgress {
    fn is_empty(&self) -> bool {
        self.installed.is_none() && self.total.is_none() && self.current_package.is_none()
    }
}

impl PackageManager {
    /// Extract a progress signal from one line of install output.
    ///
    /// Returns `None` for lines carrying no signal for this manager.
    pub fn parse_line(&self, line: &str) -> Option<PartialProgress> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut partial = PartialProgress::default();

        match self {
            PackageManager::Npm => {
                if let Some(caps) = NPM_ADDED.captures(line) {
                    partial.installed = caps[1].parse().ok();
                }
            }
            PackageManager::Yarn => {
                if line.contains("Installing") || line.contains("Resolving") {
                    if let Some(caps) = STEP_BRACKET.captures(line) {
                        partial.installed = caps[1].parse().ok();
                        partial.total = caps[2].parse().ok();
                    }
                }
            }
            PackageManager::Pnpm => {
                if line.contains("Progress:") {
                    if let Some(caps) = COUNT_PAIR.captures(line) {
                        partial.installed = caps[1].parse().ok();
                        partial.total = caps[2].parse().ok();
                    }
                }
            }
        }

        // Any manager may name the package currently being installed
        if let Some(caps) = CURRENT_PACKAGE.captures(line) {
            partial.current_package = Some(caps[1].to_string());
        }

        (!partial.is_empty()).then_some(partial)
    }
}

/// Normalized progress snapshot, replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub installed: u32,
    pub total: u32,
    pub current_package: Option<String>,
    pub elapsed: Duration,
    pub percent: u8,
}

/// Stateful tracker for one install run.
///
/// Owns the only mutable progress state in the system; callers receive
/// snapshots via [`state`](Self::state) and never alias the internals.
#[derive(Debug)]
pub struct InstallProgress {
    manager: PackageManager,
    installed: u32,
    total: u32,
    current_package: Option<String>,
    started: Instant,
}

impl InstallProgress {
    /// Create a tracker scoped to one install invocation.
    ///
    /// `total_hint` is the dependency count from the project manifest; a
    /// manager-reported total overwrites it as soon as one is parsed.
    pub fn new(manager: PackageManager, total_hint: u32) -> Self {
        Self {
            manager,
            installed: 0,
            total: total_hint,
            current_package: None,
            started: Instant::now(),
        }
    }

    /// Feed one chunk of process output into the tracker.
    ///
    /// Only stdout carries progress signals; stderr chunks are accepted
    /// and ignored so the runner callback can forward everything.
    pub fn update(&mut self, chunk: &OutputChunk) {
        if chunk.stream != OutputStream::Stdout {
            return;
        }
        for line in chunk.data.lines() {
            let Some(partial) = self.manager.parse_line(line) else {
                continue;
            };
            if let Some(installed) = partial.installed {
                self.installed = installed;
            }
            if let Some(total) = partial.total {
                self.total = total;
            }
            if let Some(package) = partial.current_package {
                self.current_package = Some(package);
            }
        }
    }

    /// Current snapshot. Computed synchronously; no history is kept.
    pub fn state(&self) -> ProgressState {
        let elapsed = self.started.elapsed();
        ProgressState {
            installed: self.installed,
            total: self.total,
            current_package: self.current_package.clone(),
            elapsed,
            percent: self.percent_at(elapsed),
        }
    }

    fn percent_at(&self, elapsed: Duration) -> u8 {
        if self.total > 0 {
            let ratio = f64::from(self.installed) / f64::from(self.total);
            (ratio * 100.0).round().min(100.0) as u8
        } else {
            estimated_percent(elapsed)
        }
    }
}

/// Time-based fallback estimate used while no numeric signal has been
/// observed, capped at [`ESTIMATE_CAP`]. Placeholder heuristic: the
/// assumed duration is not derived from measurement.
pub fn estimated_percent(elapsed: Duration) -> u8 {
    let ratio = elapsed.as_secs_f64() / ASSUMED_INSTALL_DURATION.as_secs_f64();
    ((ratio * 100.0).round() as u64).min(u64::from(ESTIMATE_CAP)) as u8
}
