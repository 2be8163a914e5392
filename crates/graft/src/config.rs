//! Generator configuration.

use std::path::PathBuf;

use crate::manifest::Manifest;
use crate::reconcile::SweepPolicy;

/// Configuration for a generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Project root; every other path is relative to it.
    pub root: PathBuf,

    /// Directory generated files are written under.
    pub out_dir: PathBuf,

    /// What happens to generated classes left without members.
    pub sweep: SweepPolicy,

    /// Report what would change without writing anything.
    pub dry_run: bool,
}

impl GeneratorConfig {
    /// Configuration taking its output directory and sweep policy from a manifest.
    pub fn from_manifest(root: impl Into<PathBuf>, manifest: &Manifest) -> Self {
        Self {
            root: root.into(),
            out_dir: manifest.out_dir.clone(),
            sweep: manifest.sweep,
            ..Self::default()
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            out_dir: PathBuf::from("src"),
            sweep: SweepPolicy::default(),
            dry_run: false,
        }
    }
}
