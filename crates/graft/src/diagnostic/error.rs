//! Generator error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while generating or reconciling files.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum GraftError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to read file '{}': {message}", path.display())]
    #[diagnostic(code(graft::io::read_error))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("Failed to persist '{}': {message}", path.display())]
    #[diagnostic(code(graft::io::persistence_failed))]
    Persistence {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Failed to initialize parser")]
    #[diagnostic(code(graft::parse::init_failed))]
    ParserInitFailed,

    #[error("Failed to parse file: {}", path.display())]
    #[diagnostic(code(graft::parse::parse_failed))]
    ParseFailed {
        path: PathBuf,
    },

    #[error("Syntax error in {}:{line}:{column}: {message}", file.display())]
    #[diagnostic(
        code(graft::parse::syntax_error),
        help("Generated members are only merged into files that parse cleanly. Fix the error and re-run.")
    )]
    SyntaxError {
        message: String,
        file: PathBuf,
        line: usize,
        column: usize,
    },

    // =========================================================================
    // Manifest Errors
    // =========================================================================
    #[error("Invalid manifest '{}': {message}", path.display())]
    #[diagnostic(code(graft::manifest::invalid))]
    ManifestInvalid {
        path: PathBuf,
        message: String,
    },

    #[error("Invalid artifact pattern '{pattern}': {message}")]
    #[diagnostic(code(graft::manifest::invalid_pattern))]
    InvalidPattern {
        pattern: String,
        message: String,
    },

    // =========================================================================
    // Schema Errors
    // =========================================================================
    #[error("Builder for '{artifact}' produced an invalid file definition: {message}")]
    #[diagnostic(
        code(graft::schema::invalid),
        help("File definitions are validated before any tree is touched; nothing was changed.")
    )]
    SchemaValidation {
        artifact: String,
        message: String,
    },

    // =========================================================================
    // Reconcile Errors
    // =========================================================================
    #[error("'{name}' in {} is a {found}, expected a {expected}", file.display())]
    #[diagnostic(
        code(graft::reconcile::shape_conflict),
        help("Rename or remove the existing declaration; generated code never overwrites a declaration of a different kind.")
    )]
    ShapeConflict {
        name: String,
        expected: &'static str,
        found: &'static str,
        file: PathBuf,
    },

    // =========================================================================
    // Orchestrator Errors
    // =========================================================================
    #[error("Formatter failed on {}: {message}", path.display())]
    #[diagnostic(code(graft::format::failed))]
    FormatFailed {
        path: PathBuf,
        message: String,
    },

    #[error("Builder '{builder}' failed")]
    #[diagnostic(code(graft::orchestrator::builder_failed))]
    BuilderFailed {
        builder: String,
        #[source]
        source: Box<GraftError>,
    },
}

impl GraftError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a schema validation error.
    pub fn schema(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaValidation {
            artifact: artifact.into(),
            message: message.into(),
        }
    }
}

/// Non-fatal findings surfaced while reconciling or saving.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileWarning {
    #[error("Kept the body of '{member}' in {}: it looks like a placeholder but no generated snapshot was recorded", file.display())]
    #[diagnostic(
        code(graft::reconcile::stub_ambiguity),
        severity(Warning),
        help("Delete the member to have it regenerated, or leave it as is to keep your version.")
    )]
    StubAmbiguity {
        member: String,
        file: PathBuf,
    },

    #[error("Formatter failed for {}; wrote unformatted output: {message}", path.display())]
    #[diagnostic(code(graft::format::fallback), severity(Warning))]
    FormatterFallback {
        path: PathBuf,
        message: String,
    },
}
