//! Listing generated declarations already on disk.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostic::GraftError;
use crate::tree::{DeclKind, Declaration, GeneratedMarker, Item, SourceParser};

/// A marked declaration found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedDecl {
    pub kind: DeclKind,
    /// `Class` or `Class.member`.
    pub name: String,
    pub marker: GeneratedMarker,
}

#[derive(Debug)]
pub struct FileInventory {
    pub path: PathBuf,
    pub declarations: Vec<MarkedDecl>,
}

/// Every `.ts`/`.tsx` file under `dir` (skipping `.d.ts`, `node_modules` and
/// dot directories) together with its marked declarations.
///
/// Files without markers are left out. Files that fail to parse are errors.
pub fn inventory(dir: &Path) -> Result<Vec<FileInventory>, GraftError> {
    let mut parser = SourceParser::new()?;
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            e.depth() == 0 || !(name.starts_with('.') || name == "node_modules")
        });

    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || !is_typescript(path) {
            continue;
        }

        let source = std::fs::read_to_string(path).map_err(|e| GraftError::io(path, e.to_string()))?;
        let tree = parser.parse(&source, path)?;

        let mut declarations = Vec::new();
        for item in &tree.items {
            if let (Some(marker), Some(key)) = (&item.trivia().marker, item.key()) {
                declarations.push(MarkedDecl {
                    kind: item.kind(),
                    name: key.name().to_string(),
                    marker: marker.clone(),
                });
            }
            if let Item::Class(class) = item {
                for member in &class.members {
                    if let (Some(marker), Some(key)) = (&member.trivia().marker, member.key()) {
                        declarations.push(MarkedDecl {
                            kind: member.kind(),
                            name: format!("{}.{}", class.name, key.name()),
                            marker: marker.clone(),
                        });
                    }
                }
            }
        }

        if !declarations.is_empty() {
            files.push(FileInventory {
                path: path.to_path_buf(),
                declarations,
            });
        }
    }

    Ok(files)
}

fn is_typescript(path: &Path) -> bool {
    let name = path.to_string_lossy();
    if name.ends_with(".d.ts") {
        return false;
    }
    matches!(path.extension().and_then(|e| e.to_str()), Some("ts") | Some("tsx"))
}
