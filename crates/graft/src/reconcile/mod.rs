//! Applies a [`FileDefinition`] to a source tree.
//!
//! ```text
//! validate ─▶ imports ─▶ types ─▶ variables/exports ─▶ classes ─▶ functions ─▶ sweep ─▶ free statements
//! ```
//!
//! Work happens on a draft copy of the tree. The draft replaces the caller's
//! tree only when every step succeeded, so an error never leaves a file half
//! reconciled.

mod sweep;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::diagnostic::{GraftError, ReconcileWarning};
use crate::primitives::{
    ensure_accessor, ensure_class, ensure_export, ensure_function, ensure_import, ensure_interface,
    ensure_method, ensure_property, ensure_type_alias, ensure_variable, render_statements, EnsureContext,
};
use crate::schema::{self, FileDefinition};
use crate::tree::{DeclKind, Item, SourceFile, Verbatim};

/// What happens to a generated class whose members were all swept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SweepPolicy {
    /// Leave the empty class in place.
    #[default]
    KeepEmptyShells,
    /// Remove a generated class that ends up with no members and whose
    /// definition asks for none.
    PruneEmptyShells,
}

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Marker id stamped on created declarations and used to scope the sweep.
    pub artifact: String,
    pub sweep: SweepPolicy,
}

impl ReconcileOptions {
    pub fn new(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            sweep: SweepPolicy::default(),
        }
    }
}

/// One change applied to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Created { kind: DeclKind, name: String },
    Updated { kind: DeclKind, name: String },
    Swept { kind: DeclKind, name: String },
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub changes: Vec<Change>,
    pub warnings: Vec<ReconcileWarning>,
    /// Members whose hand-written body was kept.
    pub preserved: Vec<String>,
}

impl ReconcileReport {
    /// Whether the reconcile left the tree as it was.
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn count(&self, f: impl Fn(&Change) -> bool) -> usize {
        self.changes.iter().filter(|c| f(c)).count()
    }
}

/// Makes `tree` match `def`.
pub fn reconcile(
    tree: &mut SourceFile,
    def: &FileDefinition,
    options: &ReconcileOptions,
) -> Result<ReconcileReport, GraftError> {
    schema::validate(def, &options.artifact)?;

    let mut draft = tree.clone();
    let mut ctx = EnsureContext::new(&options.artifact, &tree.path);

    for import in &def.imports {
        ensure_import(&mut draft, import, &mut ctx)?;
    }
    for alias in &def.type_aliases {
        ensure_type_alias(&mut draft, alias, &mut ctx)?;
    }
    for interface in &def.interfaces {
        ensure_interface(&mut draft, interface, &mut ctx)?;
    }
    for variable in &def.variables {
        ensure_variable(&mut draft, variable, &mut ctx)?;
    }
    for export in &def.exports {
        ensure_export(&mut draft, export, &mut ctx)?;
    }
    for spec in &def.classes {
        // A shell that would be pruned right away is not created at all.
        if options.sweep == SweepPolicy::PruneEmptyShells && sweep::is_shell(spec) && draft.class(&spec.name).is_none() {
            continue;
        }
        let class = ensure_class(&mut draft, spec, &mut ctx)?;
        for prop in &spec.properties {
            ensure_property(class, prop, &mut ctx)?;
        }
        for accessor in &spec.accessors {
            ensure_accessor(class, accessor, &mut ctx)?;
        }
        for method in &spec.methods {
            ensure_method(class, method, &mut ctx)?;
        }
    }
    for function in &def.functions {
        ensure_function(&mut draft, function, &mut ctx)?;
    }

    let swept = sweep::sweep(&mut draft, def, &options.artifact, options.sweep);
    ctx.changes.extend(swept);

    append_free_statements(&mut draft, def, &mut ctx);

    let report = ReconcileReport {
        changes: ctx.changes,
        warnings: ctx.warnings,
        preserved: ctx.preserved,
    };

    tracing::debug!(
        file = %tree.path.display(),
        artifact = %options.artifact,
        changes = report.changes.len(),
        preserved = report.preserved.len(),
        "reconciled"
    );

    *tree = draft;
    Ok(report)
}

/// Appends each free statement unless some item already renders to it.
fn append_free_statements(draft: &mut SourceFile, def: &FileDefinition, ctx: &mut EnsureContext) {
    if def.free_statements.is_empty() {
        return;
    }

    let mut present: BTreeSet<String> = draft.items.iter().map(Item::render_bare).collect();
    for statement in &def.free_statements {
        let text = render_statements(std::slice::from_ref(statement)).join("\n");
        if present.contains(&text) {
            continue;
        }
        draft.items.push(Item::Verbatim(Verbatim::new(text.clone())));
        ctx.changes.push(Change::Created {
            kind: DeclKind::Verbatim,
            name: text.lines().next().unwrap_or_default().to_string(),
        });
        present.insert(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ClassSpec, MethodBody, MethodSpec, StatementSpec};
    use crate::tree::NodeContainer;

    fn service(methods: Vec<MethodSpec>) -> FileDefinition {
        let mut def = FileDefinition::default();
        def.import("./db", &["db"]);
        let mut class = ClassSpec::new("UserService");
        class.methods = methods;
        def.classes.push(class);
        def
    }

    fn list() -> MethodSpec {
        MethodSpec {
            is_static: true,
            is_async: true,
            body: MethodBody::Statements(vec![StatementSpec::ret("db.user.findMany()")]),
            ..MethodSpec::new("list")
        }
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut tree = SourceFile::new("user.service.ts");
        let options = ReconcileOptions::new("service:user");
        let def = service(vec![list()]);

        let first = reconcile(&mut tree, &def, &options).unwrap();
        let rendered = tree.render();
        let second = reconcile(&mut tree, &def, &options).unwrap();

        assert!(!first.is_unchanged());
        assert!(second.is_unchanged());
        assert_eq!(tree.render(), rendered);
    }

    #[test]
    fn test_error_leaves_tree_untouched() {
        let mut tree = SourceFile::new("user.service.ts");
        let options = ReconcileOptions::new("service:user");
        reconcile(&mut tree, &service(vec![list()]), &options).unwrap();
        let before = tree.clone();

        let mut def = service(vec![list()]);
        def.import("./extra", &["extra"]);
        def.functions.push(crate::schema::FunctionSpec::new("UserService"));
        // `UserService` is both a class and a function: rejected up front.
        assert!(reconcile(&mut tree, &def, &options).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_free_statements_not_duplicated() {
        let mut tree = SourceFile::new("index.ts");
        let options = ReconcileOptions::new("index");
        let mut def = FileDefinition::default();
        def.free_statements.push(StatementSpec::expr("registerAll()"));

        reconcile(&mut tree, &def, &options).unwrap();
        let report = reconcile(&mut tree, &def, &options).unwrap();

        assert_eq!(tree.items.len(), 1);
        assert!(report.is_unchanged());
    }
}
