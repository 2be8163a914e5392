//! # graft
//!
//! Declarative TypeScript generation that merges into files people also edit.
//!
//! Builders describe what a file must contain. The reconciler makes the file's
//! declaration tree match that description while keeping everything it does
//! not own: hand-written bodies, unrelated declarations, comments. Generated
//! declarations carry a marker comment so later runs can tell them apart and
//! sweep the ones a builder no longer asks for.
//!
//! ## Architecture
//!
//! ```text
//!   graft.json
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Manifest   │  Modules, access rules, actors
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Builders   │  One FileDefinition per target file
//! │ (→ schema)   │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Reconcile   │  validate, ensure, sweep
//! │ (tree ← def) │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Project    │  render, format, classify, save
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graft::{Generator, GeneratorConfig, Manifest, Project};
//!
//! let manifest = Manifest::load("graft.json".as_ref())?;
//! let config = GeneratorConfig::from_manifest(".", &manifest);
//! let generator = Generator::for_manifest(config, &manifest);
//! let mut project = generator.open_project()?;
//!
//! let report = generator.generate(&manifest, &mut project)?;
//! ```

pub mod builders;
pub mod config;
pub mod diagnostic;
pub mod manifest;
pub mod primitives;
pub mod project;
pub mod reconcile;
pub mod schema;
pub mod tree;

pub use config::GeneratorConfig;
pub use diagnostic::{GraftError, ReconcileWarning};
pub use manifest::{Manifest, MANIFEST_FILE};
pub use project::{FileStatus, Generator, Matcher, Project, RunReport};
pub use reconcile::{reconcile, ReconcileOptions, ReconcileReport, SweepPolicy};
pub use schema::FileDefinition;
pub use tree::{SourceFile, SourceParser};
