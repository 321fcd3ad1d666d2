//! Bounded-concurrency file copying with placeholder substitution

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tokio::fs;

use super::placeholder::{substitute, ProjectVariables};
use super::scanner::{FileDescriptor, FileKind};
use crate::error::ScaffoldError;

/// Default number of in-flight file copies per batch.
pub const DEFAULT_COPY_CONCURRENCY: usize = 5;

/// One source file mapped to its destination. 1:1 with the scanned files.
#[derive(Debug, Clone)]
pub struct FileMapping {
    pub descriptor: FileDescriptor,
    pub destination_path: PathBuf,
    pub destination_dir: PathBuf,
}

/// Map every scanned file under `destination_root`, preserving the
/// relative structure. Pure; touches no filesystem state.
pub fn build_mappings(files: &[FileDescriptor], destination_root: &Path) -> Vec<FileMapping> {
    files
        .iter()
        .map(|descriptor| {
            let destination_path = destination_root.join(&descriptor.relative_path);
            let destination_dir = destination_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| destination_root.to_path_buf());
            FileMapping {
                descriptor: descriptor.clone(),
                destination_path,
                destination_dir,
            }
        })
        .collect()
}

/// Pre-create every distinct destination directory.
///
/// Runs before any file copy so concurrent copies never race on
/// create-if-missing for a shared directory. Idempotent.
pub async fn ensure_directories(mappings: &[FileMapping]) -> Result<(), ScaffoldError> {
    let directories: BTreeSet<&PathBuf> =
        mappings.iter().map(|mapping| &mapping.destination_dir).collect();
    for directory in directories {
        fs::create_dir_all(directory)
            .await
            .map_err(|source| ScaffoldError::CreateDir {
                path: directory.clone(),
                source,
            })?;
    }
    Ok(())
}

/// Knobs for one copy run.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Maximum in-flight copies per batch.
    pub concurrency: usize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_COPY_CONCURRENCY,
        }
    }
}

/// Progress snapshot pushed to the caller after every finished copy.
#[derive(Debug, Clone)]
pub struct CopyProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    pub current: PathBuf,
    pub error: Option<String>,
}

/// A single file that failed to copy.
#[derive(Debug, Clone)]
pub struct CopyFailure {
    pub relative_path: PathBuf,
    pub error: String,
}

/// Aggregated outcome of one copy run.
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<CopyFailure>,
}

/// Copy every mapping, at most `concurrency` in flight at a time.
///
/// Mappings are partitioned into sequential batches; copies within a
/// batch run concurrently, batches run in order, so cross-batch ordering
/// is deterministic. Text files are read, substituted, and written;
/// binary and unrecognized files are copied byte-for-byte. A failed file
/// is recorded in the report and never aborts its batch or later batches
/// — the report is a fold over per-file results, not an early return.
///
/// Destination directories must already exist (see [`ensure_directories`]).
pub async fn copy_all<F>(
    mappings: &[FileMapping],
    variables: &ProjectVariables,
    options: &CopyOptions,
    mut on_progress: F,
) -> CopyReport
where
    F: FnMut(&CopyProgress),
{
    let total = mappings.len();
    let mut report = CopyReport {
        total,
        ..CopyReport::default()
    };
    let mut completed = 0usize;

    for batch in mappings.chunks(options.concurrency.max(1)) {
        let mut handles = Vec::with_capacity(batch.len());
        for mapping in batch {
            let mapping = mapping.clone();
            let variables = variables.clone();
            handles.push(tokio::spawn(
                async move { copy_one(&mapping, &variables).await },
            ));
        }

        for (mapping, handle) in batch.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(format!("copy task failed: {}", join_error)),
            };

            completed += 1;
            let error = outcome.as_ref().err().cloned();
            on_progress(&CopyProgress {
                completed,
                total,
                percent: percent_of(completed, total),
                current: mapping.descriptor.relative_path.clone(),
                error: error.clone(),
            });

            match outcome {
                Ok(()) => report.succeeded += 1,
                Err(error) => report.failed.push(CopyFailure {
                    relative_path: mapping.descriptor.relative_path.clone(),
                    error,
                }),
            }
        }
    }

    report
}

async fn copy_one(mapping: &FileMapping, variables: &ProjectVariables) -> Result<(), String> {
    let source = &mapping.descriptor.source_path;
    let destination = &mapping.destination_path;

    let result = match mapping.descriptor.kind {
        FileKind::Text => match fs::read_to_string(source).await {
            Ok(content) => fs::write(destination, substitute(&content, variables)).await,
            Err(error) => Err(error),
        },
        FileKind::Binary | FileKind::Other => fs::copy(source, destination).await.map(|_| ()),
    };

    result.map_err(|error| {
        format!(
            "Failed to copy {} to {}: {}",
            source.display(),
            destination.display(),
            error
        )
    })
}

fn percent_of(completed: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    }
}

/// A copied file whose destination size does not match its source.
#[derive(Debug, Clone)]
pub struct SizeMismatch {
    pub relative_path: PathBuf,
    pub source_size: u64,
    pub destination_size: u64,
}

/// Post-copy check outcome. Mismatches and missing files are entries in
/// the report, never errors; validation always completes.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub total: usize,
    pub size_matches: usize,
    pub size_mismatches: Vec<SizeMismatch>,
    pub missing_destinations: Vec<PathBuf>,
}

/// Compare source and destination sizes for every mapping.
///
/// Substituted text files legitimately change size; callers deciding
/// what to surface can cross-reference the mapping's [`FileKind`].
pub async fn validate(mappings: &[FileMapping]) -> ValidationReport {
    let mut report = ValidationReport {
        total: mappings.len(),
        ..ValidationReport::default()
    };

    for mapping in mappings {
        let source_size = fs::metadata(&mapping.descriptor.source_path)
            .await
            .map(|meta| meta.len());
        let destination_size = fs::metadata(&mapping.destination_path)
            .await
            .map(|meta| meta.len());

        match (source_size, destination_size) {
            (Ok(source_size), Ok(destination_size)) => {
                if source_size == destination_size {
                    report.size_matches += 1;
                } else {
                    report.size_mismatches.push(SizeMismatch {
                        relative_path: mapping.descriptor.relative_path.clone(),
                        source_size,
                        destination_size,
                    });
                }
            }
            _ => report
                .missing_destinations
                .push(mapping.descriptor.relative_path.clone()),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::scanner::scan;
    use std::fs as std_fs;
    use std::path::Path;

    fn touch(path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            std_fs::create_dir_all(parent).unwrap();
        }
        std_fs::write(path, contents).unwrap();
    }

    async fn scaffold_fixture(
        source: &Path,
        destination: &Path,
    ) -> (Vec<FileMapping>, ProjectVariables) {
        let files = scan(source).unwrap();
        let mappings = build_mappings(&files, destination);
        ensure_directories(&mappings).await.unwrap();
        (mappings, ProjectVariables::derive("Demo App"))
    }

    #[test]
    fn test_build_mappings_is_one_to_one() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.ts"), b"a");
        touch(&dir.path().join("nested/b.ts"), b"b");

        let files = scan(dir.path()).unwrap();
        let mappings = build_mappings(&files, Path::new("/out"));

        assert_eq!(mappings.len(), files.len());
        let nested = mappings
            .iter()
            .find(|m| m.descriptor.relative_path == Path::new("nested/b.ts"))
            .unwrap();
        assert_eq!(nested.destination_path, Path::new("/out/nested/b.ts"));
        assert_eq!(nested.destination_dir, Path::new("/out/nested"));
    }

    #[tokio::test]
    async fn test_ensure_directories_is_idempotent() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        touch(&source.path().join("deep/tree/file.ts"), b"x");

        let files = scan(source.path()).unwrap();
        let mappings = build_mappings(&files, dest.path());
        ensure_directories(&mappings).await.unwrap();
        ensure_directories(&mappings).await.unwrap();
        assert!(dest.path().join("deep/tree").is_dir());
    }

    #[tokio::test]
    async fn test_copy_all_substitutes_text_and_preserves_binary() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        touch(
            &source.path().join("app.json"),
            br#"{"name": "{{PROJECT_NAME}}"}"#,
        );
        touch(&source.path().join("icon.png"), &[0x89, 0x50, 0x4e, 0x47]);

        let (mappings, vars) = scaffold_fixture(source.path(), dest.path()).await;
        let report = copy_all(&mappings, &vars, &CopyOptions::default(), |_p| {}).await;

        assert_eq!(report.succeeded, 2);
        assert!(report.failed.is_empty());
        let app_json = std_fs::read_to_string(dest.path().join("app.json")).unwrap();
        assert_eq!(app_json, r#"{"name": "Demo App"}"#);
        let icon = std_fs::read(dest.path().join("icon.png")).unwrap();
        assert_eq!(icon, vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[tokio::test]
    async fn test_copy_all_records_failure_without_aborting() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        for i in 0..7 {
            touch(&source.path().join(format!("file{}.txt", i)), b"content");
        }

        let (mut mappings, vars) = scaffold_fixture(source.path(), dest.path()).await;
        // One source disappears between scan and copy
        let victim = mappings[3].descriptor.source_path.clone();
        std_fs::remove_file(&victim).unwrap();

        let report = copy_all(&mappings, &vars, &CopyOptions { concurrency: 2 }, |_p| {}).await;

        assert_eq!(report.total, 7);
        assert_eq!(report.succeeded, 6);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(
            report.failed[0].relative_path,
            mappings.remove(3).descriptor.relative_path
        );
    }

    #[tokio::test]
    async fn test_copy_all_reports_monotonic_progress() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        for i in 0..6 {
            touch(&source.path().join(format!("f{}.txt", i)), b"x");
        }

        let (mappings, vars) = scaffold_fixture(source.path(), dest.path()).await;
        let mut seen = Vec::new();
        copy_all(&mappings, &vars, &CopyOptions { concurrency: 2 }, |p| {
            seen.push(p.completed)
        })
        .await;

        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_validate_untouched_tree_reports_clean() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        touch(&source.path().join("icon.png"), &[1, 2, 3]);
        touch(&source.path().join("data.bin"), &[4, 5, 6, 7]);

        let (mappings, vars) = scaffold_fixture(source.path(), dest.path()).await;
        copy_all(&mappings, &vars, &CopyOptions::default(), |_p| {}).await;

        let report = validate(&mappings).await;
        assert_eq!(report.total, 2);
        assert_eq!(report.size_matches, 2);
        assert!(report.size_mismatches.is_empty());
        assert!(report.missing_destinations.is_empty());
    }

    #[tokio::test]
    async fn test_validate_reports_missing_and_mismatched() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        touch(&source.path().join("a.bin"), &[1, 2, 3]);
        touch(&source.path().join("b.bin"), &[1, 2, 3]);

        let (mappings, vars) = scaffold_fixture(source.path(), dest.path()).await;
        copy_all(&mappings, &vars, &CopyOptions::default(), |_p| {}).await;

        // Tamper with one destination, remove the other
        std_fs::write(dest.path().join("a.bin"), [1]).unwrap();
        std_fs::remove_file(dest.path().join("b.bin")).unwrap();

        let report = validate(&mappings).await;
        assert_eq!(report.size_matches, 0);
        assert_eq!(report.size_mismatches.len(), 1);
        assert_eq!(report.size_mismatches[0].source_size, 3);
        assert_eq!(report.size_mismatches[0].destination_size, 1);
        assert_eq!(report.missing_destinations, vec![PathBuf::from("b.bin")]);
    }
}
