//! Ensure-style primitives over the declaration tree.
//!
//! Every primitive follows the same contract: look the declaration up by its
//! identity key, create it (stamped with the artifact's marker) when absent,
//! otherwise update its signature in place and apply the body rules in
//! [`body`]. A same-named declaration of a different kind is a
//! `ShapeConflict`; it is reported, never overwritten.

mod body;
mod class;
mod function;
mod import;
mod jsx;
mod member;
mod statement;
mod types;
mod variable;

pub use class::ensure_class;
pub use function::ensure_function;
pub use import::{ensure_export, ensure_import};
pub use jsx::{render_element, Attribute, AttributeValue, ElementSpec, JsxChild};
pub use member::{ensure_accessor, ensure_method, ensure_property};
pub use statement::render_statements;
pub use types::{ensure_interface, ensure_type_alias};
pub use variable::ensure_variable;

use std::path::{Path, PathBuf};

use crate::diagnostic::{GraftError, ReconcileWarning};
use crate::reconcile::Change;
use crate::tree::{DeclKind, GeneratedMarker, Trivia};

/// State shared by the primitives during one reconcile call.
#[derive(Debug)]
pub struct EnsureContext {
    artifact: String,
    file: PathBuf,
    pub changes: Vec<Change>,
    pub warnings: Vec<ReconcileWarning>,
    /// Members whose existing body was kept instead of the generated one.
    pub preserved: Vec<String>,
}

impl EnsureContext {
    pub fn new(artifact: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            file: file.into(),
            changes: Vec::new(),
            warnings: Vec::new(),
            preserved: Vec::new(),
        }
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Trivia for a freshly created declaration.
    pub(crate) fn generated(&self) -> Trivia {
        Trivia::generated(GeneratedMarker::new(&self.artifact))
    }

    pub(crate) fn conflict(&self, name: &str, expected: DeclKind, found: DeclKind) -> GraftError {
        GraftError::ShapeConflict {
            name: name.to_string(),
            expected: expected.as_str(),
            found: found.as_str(),
            file: self.file.clone(),
        }
    }

    pub(crate) fn created(&mut self, kind: DeclKind, name: impl Into<String>) {
        self.changes.push(Change::Created {
            kind,
            name: name.into(),
        });
    }

    pub(crate) fn updated(&mut self, kind: DeclKind, name: impl Into<String>) {
        self.changes.push(Change::Updated {
            kind,
            name: name.into(),
        });
    }
}
