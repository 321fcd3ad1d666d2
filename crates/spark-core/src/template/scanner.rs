//! Recursive template scanning and file classification

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::ScaffoldError;

/// Extensions copied byte-for-byte (media, archives, fonts, documents).
pub const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "svg", "mp4", "mov", "avi", "mp3", "wav", "zip", "tar",
    "gz", "rar", "ttf", "otf", "woff", "woff2", "pdf", "doc", "docx", "xls", "xlsx",
];

/// Extensions eligible for placeholder substitution.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "json", "md", "txt", "html", "css", "scss", "less", "xml", "yml",
    "yaml",
];

/// Extensionless or dot-file names treated as text by prefix match.
const SPECIAL_TEXT_BASENAMES: &[&str] = &[".gitignore", ".env", ".env.example", "README", "LICENSE"];

/// Directories skipped by exact name match during the walk.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// How a template file is handled by the copy pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Known binary type, copied byte-for-byte.
    Binary,
    /// Known text type, placeholder-substituted on copy.
    Text,
    /// Unrecognized; treated as binary-safe and copied byte-for-byte.
    Other,
}

/// One file found in the template tree. Read-only once produced.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub kind: FileKind,
    pub size: u64,
}

/// Classify a file by its extension, falling back to the special
/// basename prefixes for dot files and extensionless names.
pub fn classify(path: &Path) -> FileKind {
    if extension_in(path, BINARY_EXTENSIONS) {
        return FileKind::Binary;
    }
    if extension_in(path, TEXT_EXTENSIONS) || special_text_basename(path) {
        return FileKind::Text;
    }
    FileKind::Other
}

fn extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

fn special_text_basename(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            SPECIAL_TEXT_BASENAMES
                .iter()
                .any(|special| name.starts_with(special))
        })
}

/// Recursively enumerate every file under `root`.
///
/// Depth-first with entries sorted by name, so the result order is stable
/// for a given tree. `node_modules` and `.git` subtrees are skipped
/// entirely; directory entries are never included. Pure function of the
/// filesystem at call time — nothing is cached across calls.
pub fn scan(root: &Path) -> Result<Vec<FileDescriptor>, ScaffoldError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir() && is_skipped_name(entry.file_name()))
        });

    for entry in walker {
        let entry = entry.map_err(|source| ScaffoldError::Scan {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let metadata = entry.metadata().map_err(|source| ScaffoldError::Scan {
            path: entry.path().to_path_buf(),
            source,
        })?;
        let relative_path = entry
            .path()
            .strip_prefix(root)
            .expect("walked entries live under the walk root")
            .to_path_buf();
        let kind = classify(entry.path());
        files.push(FileDescriptor {
            source_path: entry.into_path(),
            relative_path,
            kind,
            size: metadata.len(),
        });
    }

    Ok(files)
}

fn is_skipped_name(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Counts and total size for one scanned template tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateAnalysis {
    pub total_files: usize,
    pub binary_files: usize,
    pub text_files: usize,
    pub other_files: usize,
    pub total_size: u64,
}

impl TemplateAnalysis {
    pub fn from_files(files: &[FileDescriptor]) -> Self {
        let mut analysis = Self {
            total_files: files.len(),
            ..Self::default()
        };
        for file in files {
            match file.kind {
                FileKind::Binary => analysis.binary_files += 1,
                FileKind::Text => analysis.text_files += 1,
                FileKind::Other => analysis.other_files += 1,
            }
            analysis.total_size += file.size;
        }
        analysis
    }
}

/// Scan `root` and summarize it in one step.
pub fn analyze(root: &Path) -> Result<TemplateAnalysis, ScaffoldError> {
    Ok(TemplateAnalysis::from_files(&scan(root)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify(Path::new("assets/icon.png")), FileKind::Binary);
        assert_eq!(classify(Path::new("fonts/Inter.woff2")), FileKind::Binary);
        assert_eq!(classify(Path::new("src/App.tsx")), FileKind::Text);
        assert_eq!(classify(Path::new("app.json")), FileKind::Text);
        assert_eq!(classify(Path::new("data.sqlite")), FileKind::Other);
    }

    #[test]
    fn test_classify_extension_is_case_insensitive() {
        assert_eq!(classify(Path::new("photo.PNG")), FileKind::Binary);
        assert_eq!(classify(Path::new("README.MD")), FileKind::Text);
    }

    #[test]
    fn test_classify_special_basenames() {
        assert_eq!(classify(Path::new(".gitignore")), FileKind::Text);
        assert_eq!(classify(Path::new(".env")), FileKind::Text);
        assert_eq!(classify(Path::new(".env.example")), FileKind::Text);
        assert_eq!(classify(Path::new("README")), FileKind::Text);
        assert_eq!(classify(Path::new("LICENSE")), FileKind::Text);
    }

    #[test]
    fn test_scan_skips_dependency_and_vcs_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("App.tsx"), "app");
        touch(&dir.path().join("node_modules/react/index.js"), "x");
        touch(&dir.path().join("src/node_modules/nested.js"), "x");
        touch(&dir.path().join(".git/HEAD"), "ref");
        touch(&dir.path().join("src/screens/Home.tsx"), "home");

        let files = scan(dir.path()).unwrap();
        let relative: Vec<&Path> = files.iter().map(|f| f.relative_path.as_path()).collect();

        assert_eq!(
            relative,
            vec![
                Path::new("App.tsx"),
                Path::new("src/screens/Home.tsx"),
            ]
        );
    }

    #[test]
    fn test_scan_order_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.ts"), "b");
        touch(&dir.path().join("a.ts"), "a");
        touch(&dir.path().join("nested/c.ts"), "c");

        let first = scan(dir.path()).unwrap();
        let second = scan(dir.path()).unwrap();
        let order: Vec<&Path> = first.iter().map(|f| f.relative_path.as_path()).collect();
        assert_eq!(
            order,
            second
                .iter()
                .map(|f| f.relative_path.as_path())
                .collect::<Vec<_>>()
        );
        assert_eq!(order[0], Path::new("a.ts"));
    }

    #[test]
    fn test_scan_records_sizes() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("note.txt"), "12345");

        let files = scan(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 5);
        assert_eq!(files[0].kind, FileKind::Text);
    }

    #[test]
    fn test_analyze_counts_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("App.tsx"), "app!");
        touch(&dir.path().join("readme.md"), "hello");
        touch(&dir.path().join("icon.png"), "png");
        touch(&dir.path().join("blob.bin"), "??");

        let analysis = analyze(dir.path()).unwrap();
        assert_eq!(analysis.total_files, 4);
        assert_eq!(analysis.text_files, 2);
        assert_eq!(analysis.binary_files, 1);
        assert_eq!(analysis.other_files, 1);
        assert_eq!(analysis.total_size, 14);
    }
}
