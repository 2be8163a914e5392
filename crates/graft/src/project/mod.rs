//! The set of files touched by one run.
//!
//! A project loads each target lazily, hands its tree out for reconciling and
//! remembers the text it started from. Nothing reaches storage until
//! [`Project::save_all`], which classifies every touched file against that
//! starting text.

mod format;
mod inventory;
mod matcher;
mod orchestrator;

pub use format::{CommandFormatter, Formatter, NoopFormatter};
pub use inventory::{inventory, FileInventory, MarkedDecl};
pub use matcher::Matcher;
pub use orchestrator::{BuilderRun, Generator, RunReport};

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::diagnostic::{GraftError, ReconcileWarning};
use crate::tree::{NodeContainer, SourceFile, SourceParser};

/// Where file contents are read from and written to.
#[derive(Debug, Clone)]
pub enum Storage {
    /// Paths are resolved against the project root.
    Disk,
    /// Contents live in memory; no disk I/O happens.
    Memory(BTreeMap<PathBuf, String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Created,
    Modified,
    Unchanged,
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Created => "created",
            FileStatus::Modified => "modified",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Set when the status is `Failed`.
    pub error: Option<GraftError>,
}

#[derive(Debug, Default)]
pub struct SaveReport {
    pub files: Vec<FileOutcome>,
    pub warnings: Vec<ReconcileWarning>,
}

impl SaveReport {
    pub fn failed(&self) -> bool {
        self.files.iter().any(|f| f.status == FileStatus::Failed)
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }
}

struct Entry {
    tree: SourceFile,
    /// Text the file had when loaded; `None` if it did not exist.
    original: Option<String>,
    /// Whether any reconcile changed the tree.
    changed: bool,
}

pub struct Project {
    root: PathBuf,
    storage: Storage,
    parser: SourceParser,
    files: BTreeMap<PathBuf, Entry>,
}

impl Project {
    /// A project reading and writing files under `root`.
    pub fn on_disk(root: impl Into<PathBuf>) -> Result<Self, GraftError> {
        Ok(Self {
            root: root.into(),
            storage: Storage::Disk,
            parser: SourceParser::new()?,
            files: BTreeMap::new(),
        })
    }

    /// A project backed by an in-memory file map.
    pub fn in_memory() -> Result<Self, GraftError> {
        Ok(Self {
            root: PathBuf::new(),
            storage: Storage::Memory(BTreeMap::new()),
            parser: SourceParser::new()?,
            files: BTreeMap::new(),
        })
    }

    /// Seeds an in-memory file. Ignored for disk projects.
    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        if let Storage::Memory(map) = &mut self.storage {
            map.insert(path.into(), text.into());
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current stored contents of `path`.
    pub fn read(&self, path: &Path) -> Result<Option<String>, GraftError> {
        match &self.storage {
            Storage::Memory(map) => Ok(map.get(path).cloned()),
            Storage::Disk => {
                let full = self.root.join(path);
                match std::fs::read_to_string(&full) {
                    Ok(text) => Ok(Some(text)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(GraftError::io(full, e.to_string())),
                }
            }
        }
    }

    /// Loads `path` on first use and returns its tree. A missing file yields
    /// an empty tree that is created on save.
    pub fn load(&mut self, path: &Path) -> Result<&mut SourceFile, GraftError> {
        if !self.files.contains_key(path) {
            let original = self.read(path)?;
            let tree = match &original {
                Some(text) => self.parser.parse(text, path)?,
                None => SourceFile::new(path),
            };
            tracing::debug!(path = %path.display(), exists = original.is_some(), "loaded file");
            self.files.insert(
                path.to_path_buf(),
                Entry {
                    tree,
                    original,
                    changed: false,
                },
            );
        }

        self.files
            .get_mut(path)
            .map(|entry| &mut entry.tree)
            .ok_or_else(|| GraftError::ParseFailed {
                path: path.to_path_buf(),
            })
    }

    /// The tree of a loaded file that existed before the run.
    pub fn existing(&self, path: &Path) -> Option<&SourceFile> {
        self.files
            .get(path)
            .filter(|entry| entry.original.is_some())
            .map(|entry| &entry.tree)
    }

    /// Records that a reconcile changed the tree at `path`.
    pub fn mark_changed(&mut self, path: &Path) {
        if let Some(entry) = self.files.get_mut(path) {
            entry.changed = true;
        }
    }

    /// Paths of every loaded file.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Renders, formats and classifies every loaded file, writing the changed
    /// ones when `persist` is set.
    ///
    /// Files whose trees no reconcile changed are reported unchanged and left
    /// byte-for-byte as they were.
    pub fn save_all(&mut self, formatter: &dyn Formatter, persist: bool) -> SaveReport {
        let mut report = SaveReport::default();
        let mut writes = Vec::new();

        for (path, entry) in &self.files {
            if !entry.changed {
                report.files.push(FileOutcome {
                    path: path.clone(),
                    status: FileStatus::Unchanged,
                    error: None,
                });
                continue;
            }

            let rendered = entry.tree.render();
            let text = match formatter.format(&rendered, &self.root.join(path)) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "formatter failed, writing unformatted output");
                    report.warnings.push(ReconcileWarning::FormatterFallback {
                        path: path.clone(),
                        message: e.to_string(),
                    });
                    rendered
                }
            };

            let status = match &entry.original {
                None => FileStatus::Created,
                Some(original) if *original == text => FileStatus::Unchanged,
                Some(_) => FileStatus::Modified,
            };
            if status != FileStatus::Unchanged {
                writes.push((path.clone(), text, report.files.len()));
            }
            report.files.push(FileOutcome {
                path: path.clone(),
                status,
                error: None,
            });
        }

        if !persist {
            return report;
        }

        for (path, text, index) in writes {
            if let Err(e) = self.write(&path, &text) {
                tracing::error!(path = %path.display(), error = %e, "failed to persist file");
                report.files[index].status = FileStatus::Failed;
                report.files[index].error = Some(e);
                continue;
            }
            if let Some(entry) = self.files.get_mut(&path) {
                entry.original = Some(text);
                entry.changed = false;
            }
        }

        report
    }

    fn write(&mut self, path: &Path, text: &str) -> Result<(), GraftError> {
        let persistence = |path: &Path, e: std::io::Error| GraftError::Persistence {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        match &mut self.storage {
            Storage::Memory(map) => {
                map.insert(path.to_path_buf(), text.to_string());
                Ok(())
            }
            Storage::Disk => {
                let full = self.root.join(path);
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| persistence(parent, e))?;
                }
                std::fs::write(&full, text).map_err(|e| persistence(&full, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{reconcile, ReconcileOptions};
    use crate::schema::{ClassSpec, FileDefinition};

    struct FailingFormatter;

    impl Formatter for FailingFormatter {
        fn format(&self, _text: &str, path: &Path) -> Result<String, GraftError> {
            Err(GraftError::FormatFailed {
                path: path.to_path_buf(),
                message: "boom".into(),
            })
        }
    }

    fn definition() -> FileDefinition {
        FileDefinition {
            classes: vec![ClassSpec::new("UserService")],
            ..FileDefinition::default()
        }
    }

    #[test]
    fn test_memory_project_creates_file() {
        let mut project = Project::in_memory().unwrap();
        let path = Path::new("src/services/user.service.ts");

        let tree = project.load(path).unwrap();
        let report = reconcile(tree, &definition(), &ReconcileOptions::new("service:user")).unwrap();
        assert!(!report.is_unchanged());
        project.mark_changed(path);

        let saved = project.save_all(&NoopFormatter, true);
        assert_eq!(saved.count(FileStatus::Created), 1);
        let text = project.read(path).unwrap().unwrap();
        assert!(text.contains("export class UserService {}"));
    }

    #[test]
    fn test_untouched_file_is_unchanged() {
        let original = "export class UserService {\n    // spaced oddly\n}\n";
        let path = Path::new("a.ts");
        let mut project = Project::in_memory().unwrap().with_file(path, original);

        project.load(path).unwrap();
        let saved = project.save_all(&NoopFormatter, true);

        assert_eq!(saved.files[0].status, FileStatus::Unchanged);
        assert_eq!(project.read(path).unwrap().unwrap(), original);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut project = Project::in_memory().unwrap();
        let path = Path::new("a.ts");
        let tree = project.load(path).unwrap();
        reconcile(tree, &definition(), &ReconcileOptions::new("a")).unwrap();
        project.mark_changed(path);

        let saved = project.save_all(&NoopFormatter, false);
        assert_eq!(saved.files[0].status, FileStatus::Created);
        assert!(project.read(path).unwrap().is_none());
    }

    #[test]
    fn test_formatter_failure_falls_back() {
        let mut project = Project::in_memory().unwrap();
        let path = Path::new("a.ts");
        let tree = project.load(path).unwrap();
        reconcile(tree, &definition(), &ReconcileOptions::new("a")).unwrap();
        project.mark_changed(path);

        let saved = project.save_all(&FailingFormatter, true);
        assert_eq!(saved.warnings.len(), 1);
        assert!(matches!(saved.warnings[0], ReconcileWarning::FormatterFallback { .. }));
        assert!(project.read(path).unwrap().is_some());
    }

    #[test]
    fn test_syntax_error_is_reported_on_load() {
        let path = Path::new("broken.ts");
        let mut project = Project::in_memory().unwrap().with_file(path, "export class {");
        assert!(matches!(project.load(path), Err(GraftError::SyntaxError { .. })));
    }

    #[test]
    fn test_persistence_failure_is_reported_per_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut project = Project::on_disk(dir.path()).unwrap();
        let blocked = Path::new("blocker/a.ts");
        let sibling = Path::new("ok.ts");

        for path in [blocked, sibling] {
            let tree = project.load(path).unwrap();
            reconcile(tree, &definition(), &ReconcileOptions::new("a")).unwrap();
            project.mark_changed(path);
        }
        // A plain file where the target's directory has to go.
        std::fs::write(dir.path().join("blocker"), "").unwrap();

        let saved = project.save_all(&NoopFormatter, true);
        let outcome = |path: &Path| saved.files.iter().find(|f| f.path == path).unwrap();

        assert_eq!(outcome(blocked).status, FileStatus::Failed);
        assert!(matches!(outcome(blocked).error, Some(GraftError::Persistence { .. })));
        assert_eq!(outcome(sibling).status, FileStatus::Created);
        assert!(dir.path().join("ok.ts").exists());
        assert!(saved.failed());

        let run = RunReport {
            runs: Vec::new(),
            save: saved,
        };
        assert!(run.failed());
    }
}
