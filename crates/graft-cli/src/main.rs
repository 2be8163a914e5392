//! graft CLI.
//!
//! Regenerates TypeScript modules from a manifest and merges them into files
//! that people also edit.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;

use graft::project::{inventory, FileStatus, NoopFormatter, SaveReport};
use graft::{
    reconcile, FileDefinition, Generator, GeneratorConfig, Manifest, Matcher, Project, ReconcileOptions,
    ReconcileWarning, RunReport, SweepPolicy, MANIFEST_FILE,
};

mod ui;

#[derive(Parser)]
#[command(name = "graft")]
#[command(about = "Reconcile generated TypeScript into hand-edited files")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every module the manifest describes
    Generate {
        /// Manifest file
        #[arg(short, long, default_value = MANIFEST_FILE)]
        manifest: PathBuf,

        /// Project root (defaults to the manifest's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Only run builders whose name or artifact matches (glob or literal)
        #[arg(long)]
        only: Option<String>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Exit non-zero when generating would change any file
    Check {
        /// Manifest file
        #[arg(short, long, default_value = MANIFEST_FILE)]
        manifest: PathBuf,

        /// Project root (defaults to the manifest's directory)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// List generated declarations found under a directory
    Inspect {
        /// Directory to scan
        #[arg(default_value = "src")]
        dir: PathBuf,
    },

    /// Reconcile a single file against a JSON file definition
    Apply {
        /// JSON file definition
        #[arg(short, long)]
        schema: PathBuf,

        /// Target TypeScript file
        #[arg(short, long)]
        file: PathBuf,

        /// Artifact id stamped into markers
        #[arg(short, long)]
        artifact: String,

        /// Remove generated classes left without members
        #[arg(long)]
        prune_empty_shells: bool,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            manifest,
            root,
            only,
            dry_run,
        } => {
            let report = generate(&manifest, root, only.as_deref(), dry_run)?;
            if report.failed() {
                std::process::exit(1);
            }
        }

        Commands::Check { manifest, root } => {
            let report = generate(&manifest, root, None, true)?;
            let pending = report.save.count(FileStatus::Created) + report.save.count(FileStatus::Modified);
            if pending > 0 {
                println!();
                ui::error(&format!("{} file(s) out of date. Run `graft generate`.", pending));
                std::process::exit(1);
            }
            println!();
            ui::success("Everything is up to date.");
        }

        Commands::Inspect { dir } => {
            inspect(&dir)?;
        }

        Commands::Apply {
            schema,
            file,
            artifact,
            prune_empty_shells,
            dry_run,
        } => {
            let sweep = if prune_empty_shells {
                SweepPolicy::PruneEmptyShells
            } else {
                SweepPolicy::KeepEmptyShells
            };
            let save = apply(&schema, &file, artifact, sweep, dry_run)?;
            if save.failed() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Log filter from `GRAFT_LOG`, then `RUST_LOG`, then the verbosity flag.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let fallback = match verbose {
        0 => "graft=warn",
        1 => "graft=info",
        _ => "graft=debug",
    };
    let filter = EnvFilter::try_from_env("GRAFT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn generate(manifest_path: &Path, root: Option<PathBuf>, only: Option<&str>, dry_run: bool) -> miette::Result<RunReport> {
    ui::header(if dry_run { "generate --dry-run" } else { "generate" });
    let start = Instant::now();

    let manifest = Manifest::load(manifest_path).map_err(miette::Report::new)?;
    let root = root.unwrap_or_else(|| match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    });

    let config = GeneratorConfig {
        dry_run,
        ..GeneratorConfig::from_manifest(&root, &manifest)
    };
    let mut generator = Generator::for_manifest(config, &manifest);
    if let Some(pattern) = only {
        generator = generator.with_matcher(Matcher::parse(pattern).map_err(miette::Report::new)?);
    }

    let mut project = generator.open_project().map_err(miette::Report::new)?;

    let spinner = ui::spinner(&format!("Reconciling {} module(s)...", manifest.modules.len()));
    let result = generator.generate(&manifest, &mut project);
    spinner.finish_and_clear();

    let report = result.map_err(miette::Report::new)?;
    print_save(&report.save);
    print_warnings(report.warnings());

    println!();
    ui::dim(&format!(
        "{} builder(s) in {}",
        report.runs.len(),
        ui::timing(start.elapsed())
    ));
    Ok(report)
}

fn apply(schema: &Path, file: &Path, artifact: String, sweep: SweepPolicy, dry_run: bool) -> miette::Result<SaveReport> {
    ui::header("apply");

    let text = std::fs::read_to_string(schema).into_diagnostic()?;
    let definition: FileDefinition = serde_json::from_str(&text)
        .map_err(|e| miette::miette!("Invalid file definition in {}: {}", schema.display(), e))?;

    let mut project = Project::on_disk(".").map_err(miette::Report::new)?;
    let tree = project.load(file).map_err(miette::Report::new)?;
    let options = ReconcileOptions { artifact, sweep };
    let report = reconcile(tree, &definition, &options).map_err(miette::Report::new)?;
    tracing::debug!(file = %file.display(), changes = report.changes.len(), "applied definition");
    if !report.is_unchanged() {
        project.mark_changed(file);
    }

    let save = project.save_all(&NoopFormatter, !dry_run);
    print_save(&save);
    print_warnings(report.warnings.iter().chain(save.warnings.iter()));
    Ok(save)
}

fn inspect(dir: &Path) -> miette::Result<()> {
    ui::header("inspect");

    let files = inventory(dir).map_err(miette::Report::new)?;
    if files.is_empty() {
        ui::info(&format!("No generated declarations under {}", dir.display()));
        return Ok(());
    }

    let mut total = 0;
    for file in &files {
        let shown = file.path.strip_prefix(dir).unwrap_or(&file.path);
        ui::info(&shown.display().to_string());
        for decl in &file.declarations {
            ui::declaration(
                decl.kind.as_str(),
                &decl.name,
                &decl.marker.artifact,
                decl.marker.stub.is_some(),
            );
        }
        total += file.declarations.len();
    }

    println!();
    ui::box_header("Inventory");
    ui::box_line(&format!("{} file(s)", files.len()));
    ui::box_line(&format!("{} generated declaration(s)", total));
    ui::box_footer();
    Ok(())
}

fn print_save(save: &SaveReport) {
    for file in &save.files {
        ui::file_status(file.status, &file.path);
        if let Some(error) = &file.error {
            ui::dim(&error.to_string());
        }
    }

    println!();
    let summary = ui::summary(
        save.count(FileStatus::Created),
        save.count(FileStatus::Modified),
        save.count(FileStatus::Unchanged),
        save.count(FileStatus::Failed),
    );
    if save.failed() {
        ui::error(&summary);
    } else {
        ui::success(&summary);
    }
}

fn print_warnings<'a>(warnings: impl Iterator<Item = &'a ReconcileWarning>) {
    for warning in warnings {
        eprintln!("{:?}", miette::Report::new(warning.clone()));
    }
}
