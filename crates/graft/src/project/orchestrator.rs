//! Runs builders against a project.
//!
//! ```text
//! for each builder:  load target ─▶ schema(existing) ─▶ reconcile ─▶ record
//! then:              render ─▶ format ─▶ classify ─▶ persist
//! ```
//!
//! A failing builder aborts the run before anything is saved.

use std::path::PathBuf;

use crate::builders::{Builder, ModulePlan};
use crate::config::GeneratorConfig;
use crate::diagnostic::{GraftError, ReconcileWarning};
use crate::manifest::Manifest;
use crate::reconcile::{reconcile, ReconcileOptions, ReconcileReport};

use super::{CommandFormatter, Formatter, Matcher, NoopFormatter, Project, SaveReport};

/// Outcome of one builder.
#[derive(Debug)]
pub struct BuilderRun {
    pub builder: &'static str,
    pub artifact: String,
    pub target: PathBuf,
    pub report: ReconcileReport,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub runs: Vec<BuilderRun>,
    pub save: SaveReport,
}

impl RunReport {
    /// Warnings from reconciling and saving, in order.
    pub fn warnings(&self) -> impl Iterator<Item = &ReconcileWarning> {
        self.runs
            .iter()
            .flat_map(|run| run.report.warnings.iter())
            .chain(self.save.warnings.iter())
    }

    /// Whether any file failed to persist.
    pub fn failed(&self) -> bool {
        self.save.failed()
    }
}

pub struct Generator {
    config: GeneratorConfig,
    formatter: Box<dyn Formatter>,
    matcher: Option<Matcher>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            formatter: Box::new(NoopFormatter),
            matcher: None,
        }
    }

    /// A generator configured from a manifest, using its formatter if any.
    pub fn for_manifest(config: GeneratorConfig, manifest: &Manifest) -> Self {
        let generator = Self::new(config);
        match &manifest.formatter {
            Some(spec) => generator.with_formatter(CommandFormatter::from_spec(spec)),
            None => generator,
        }
    }

    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// A disk project rooted at the configured project root.
    pub fn open_project(&self) -> Result<Project, GraftError> {
        Project::on_disk(&self.config.root)
    }

    /// Runs every builder of every manifest module.
    pub fn generate(&self, manifest: &Manifest, project: &mut Project) -> Result<RunReport, GraftError> {
        let plans: Vec<ModulePlan<'_>> = manifest
            .modules
            .iter()
            .map(|module| ModulePlan::new(module, &manifest.runtime))
            .collect();
        let builders: Vec<Box<dyn Builder + '_>> = plans.iter().flat_map(|plan| plan.builders()).collect();

        self.run(project, &builders)
    }

    /// Runs `builders` in order, then saves the project.
    pub fn run(&self, project: &mut Project, builders: &[Box<dyn Builder + '_>]) -> Result<RunReport, GraftError> {
        let mut report = RunReport::default();

        for builder in builders {
            let artifact = builder.artifact();
            if let Some(matcher) = &self.matcher {
                if !matcher.matches(&artifact) && !matcher.matches(builder.name()) {
                    tracing::trace!(artifact = %artifact, "skipped by matcher");
                    continue;
                }
            }

            let span = tracing::info_span!("builder", name = builder.name(), artifact = %artifact);
            let _enter = span.enter();

            let run = self
                .run_builder(project, builder.as_ref(), artifact)
                .map_err(|source| GraftError::BuilderFailed {
                    builder: builder.name().to_string(),
                    source: Box::new(source),
                })?;

            tracing::info!(
                target_file = %run.target.display(),
                changes = run.report.changes.len(),
                preserved = run.report.preserved.len(),
                "builder finished"
            );
            report.runs.push(run);
        }

        report.save = project.save_all(self.formatter.as_ref(), !self.config.dry_run);
        Ok(report)
    }

    fn run_builder(&self, project: &mut Project, builder: &dyn Builder, artifact: String) -> Result<BuilderRun, GraftError> {
        let target = self.config.out_dir.join(builder.target());
        project.load(&target)?;

        let def = builder.schema(project.existing(&target))?;
        let options = ReconcileOptions {
            artifact: artifact.clone(),
            sweep: self.config.sweep,
        };
        let tree = project.load(&target)?;
        let reconciled = reconcile(tree, &def, &options)?;
        if !reconciled.is_unchanged() {
            project.mark_changed(&target);
        }

        Ok(BuilderRun {
            builder: builder.name(),
            artifact,
            target,
            report: reconciled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::FileStatus;
    use std::path::Path;

    const MANIFEST: &str = r#"{
        "modules": [{
            "name": "user",
            "fields": [{ "name": "email", "type": "string" }],
            "access": { "default": { "level": "public" } },
            "actions": ["resetPassword"]
        }]
    }"#;

    fn manifest() -> Manifest {
        Manifest::parse(MANIFEST, Path::new("graft.json")).unwrap()
    }

    #[test]
    fn test_generate_creates_module_files() {
        let manifest = manifest();
        let generator = Generator::new(GeneratorConfig::from_manifest(".", &manifest));
        let mut project = Project::in_memory().unwrap();

        let report = generator.generate(&manifest, &mut project).unwrap();
        assert_eq!(report.runs.len(), 5);
        assert_eq!(report.save.count(FileStatus::Created), 5);

        let service = project.read(Path::new("src/services/user.service.ts")).unwrap().unwrap();
        assert!(service.contains("export class UserService {"));
        assert!(service.contains("// @graft-generated service:user"));
    }

    #[test]
    fn test_second_run_is_unchanged() {
        let manifest = manifest();
        let generator = Generator::new(GeneratorConfig::from_manifest(".", &manifest));
        let mut project = Project::in_memory().unwrap();
        generator.generate(&manifest, &mut project).unwrap();

        let mut second = Project::in_memory().unwrap();
        for path in project.paths() {
            if let Some(text) = project.read(path).unwrap() {
                second = second.with_file(path, text);
            }
        }

        let report = generator.generate(&manifest, &mut second).unwrap();
        assert_eq!(report.save.count(FileStatus::Unchanged), 5);
        assert_eq!(report.warnings().count(), 0);
    }

    #[test]
    fn test_matcher_limits_builders() {
        let manifest = manifest();
        let generator = Generator::new(GeneratorConfig::from_manifest(".", &manifest))
            .with_matcher(Matcher::parse("service:*").unwrap());
        let mut project = Project::in_memory().unwrap();

        let report = generator.generate(&manifest, &mut project).unwrap();
        assert_eq!(report.runs.len(), 1);
        assert_eq!(report.runs[0].artifact, "service:user");
    }

    #[test]
    fn test_builder_failure_aborts_before_saving() {
        let manifest = manifest();
        let generator = Generator::new(GeneratorConfig::from_manifest(".", &manifest));
        let service = Path::new("src/services/user.service.ts");
        let mut project = Project::in_memory()
            .unwrap()
            .with_file(service, "export function UserService() {}\n");

        let err = generator.generate(&manifest, &mut project).unwrap_err();
        let GraftError::BuilderFailed { builder, source } = err else {
            panic!("expected builder failure");
        };
        assert_eq!(builder, "ServiceBuilder");
        assert!(matches!(*source, GraftError::ShapeConflict { .. }));
        assert!(project.read(Path::new("src/types/user.types.ts")).unwrap().is_none());
    }

    #[test]
    fn test_open_project_uses_configured_root() {
        let config = GeneratorConfig {
            root: "/srv/app".into(),
            ..GeneratorConfig::default()
        };
        let project = Generator::new(config).open_project().unwrap();
        assert_eq!(project.root(), Path::new("/srv/app"));
    }
}
