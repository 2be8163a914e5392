//! Import and re-export merging.
//!
//! Imports have no name of their own: they are matched by module path, and a
//! second request for the same module unions symbols into the existing
//! statement instead of adding a new one.

use crate::diagnostic::GraftError;
use crate::schema::{ExportSpec, ImportSpec};
use crate::tree::{DeclKind, ExportDecl, ImportDecl, Item, NamedBinding, SourceFile, Trivia};

use super::EnsureContext;

pub fn ensure_import(file: &mut SourceFile, spec: &ImportSpec, ctx: &mut EnsureContext) -> Result<(), GraftError> {
    let target = file.items.iter().position(|item| match item {
        Item::Import(import) => accepts(import, spec),
        _ => false,
    });

    let Some(index) = target else {
        let mut import = ImportDecl::new(&spec.module_path);
        import.type_only = spec.is_type_only;
        import.default = spec.default_symbol.clone();
        for symbol in &spec.named_symbols {
            if !import.binds(symbol) {
                import.named.push(NamedBinding::new(symbol));
            }
        }

        let position = insertion_point(file);
        file.items.insert(position, Item::Import(import));
        ctx.created(DeclKind::Import, &spec.module_path);
        return Ok(());
    };

    let Some(Item::Import(import)) = file.items.get_mut(index) else {
        return Ok(());
    };
    let before = import.clone();

    if import.default.is_none() {
        import.default = spec.default_symbol.clone();
    }
    // A type-only request merged into a value import uses inline `type` specifiers.
    let inline_type = spec.is_type_only && !import.type_only;
    for symbol in &spec.named_symbols {
        if !import.binds(symbol) {
            import.named.push(NamedBinding {
                name: symbol.clone(),
                alias: None,
                type_only: inline_type,
            });
        }
    }

    if *import != before {
        ctx.updated(DeclKind::Import, &spec.module_path);
    }
    Ok(())
}

/// Whether an existing import statement can absorb the requested symbols.
fn accepts(import: &ImportDecl, spec: &ImportSpec) -> bool {
    if import.module_path != spec.module_path || import.namespace.is_some() {
        return false;
    }
    // Values cannot be added to `import type`.
    if import.type_only && !spec.is_type_only {
        return false;
    }
    match (&import.default, &spec.default_symbol) {
        (Some(existing), Some(wanted)) => existing == wanted,
        // `import type Foo, { .. }` is not valid syntax.
        (None, Some(_)) => !import.type_only,
        _ => true,
    }
}

/// Index just past the last import or re-export.
fn insertion_point(file: &SourceFile) -> usize {
    file.items
        .iter()
        .rposition(|item| matches!(item, Item::Import(_)))
        .map_or(0, |i| i + 1)
}

pub fn ensure_export(file: &mut SourceFile, spec: &ExportSpec, ctx: &mut EnsureContext) -> Result<(), GraftError> {
    let target = file.items.iter().position(|item| match item {
        Item::Export(export) => {
            export.module_path == spec.module_path
                && export.namespace.is_none()
                && export.type_only == spec.is_type_only
        }
        _ => false,
    });

    let Some(index) = target else {
        let export = ExportDecl {
            trivia: Trivia::default(),
            module_path: spec.module_path.clone(),
            type_only: spec.is_type_only,
            namespace: None,
            named: spec.named_symbols.iter().map(NamedBinding::new).collect(),
        };
        let position = file
            .items
            .iter()
            .rposition(|item| matches!(item, Item::Import(_) | Item::Export(_)))
            .map_or(0, |i| i + 1);
        file.items.insert(position, Item::Export(export));
        ctx.created(DeclKind::Export, &spec.module_path);
        return Ok(());
    };

    let Some(Item::Export(export)) = file.items.get_mut(index) else {
        return Ok(());
    };
    // `export *` already covers every named symbol.
    if export.named.is_empty() {
        return Ok(());
    }

    let before = export.clone();
    if spec.named_symbols.is_empty() {
        export.named.clear();
    }
    for symbol in &spec.named_symbols {
        if !export.named.iter().any(|b| b.local() == symbol) {
            export.named.push(NamedBinding::new(symbol));
        }
    }

    if *export != before {
        ctx.updated(DeclKind::Export, &spec.module_path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeContainer, Verbatim};

    fn spec(module: &str, symbols: &[&str], type_only: bool) -> ImportSpec {
        ImportSpec {
            module_path: module.into(),
            named_symbols: symbols.iter().map(|s| s.to_string()).collect(),
            default_symbol: None,
            is_type_only: type_only,
        }
    }

    #[test]
    fn test_import_union() {
        let mut file = SourceFile::new("a.ts");
        let mut ctx = EnsureContext::new("a", "a.ts");

        ensure_import(&mut file, &spec("./db", &["db", "tx"], false), &mut ctx).unwrap();
        ensure_import(&mut file, &spec("./db", &["tx", "pool"], false), &mut ctx).unwrap();

        assert_eq!(file.items.len(), 1);
        assert_eq!(file.render(), "import { db, tx, pool } from \"./db\";\n");
    }

    #[test]
    fn test_type_import_merges_inline() {
        let mut file = SourceFile::new("a.ts");
        let mut ctx = EnsureContext::new("a", "a.ts");

        ensure_import(&mut file, &spec("./db", &["db"], false), &mut ctx).unwrap();
        ensure_import(&mut file, &spec("./db", &["Db"], true), &mut ctx).unwrap();

        assert_eq!(file.render(), "import { db, type Db } from \"./db\";\n");
    }

    #[test]
    fn test_value_import_not_merged_into_type_import() {
        let mut file = SourceFile::new("a.ts");
        let mut ctx = EnsureContext::new("a", "a.ts");

        ensure_import(&mut file, &spec("./db", &["Db"], true), &mut ctx).unwrap();
        ensure_import(&mut file, &spec("./db", &["db"], false), &mut ctx).unwrap();

        assert_eq!(file.items.len(), 2);
    }

    #[test]
    fn test_new_import_goes_after_last_import() {
        let mut file = SourceFile::new("a.ts");
        file.items.push(Item::Import(ImportDecl::new("./first")));
        file.items.push(Item::Verbatim(Verbatim::new("run();")));
        let mut ctx = EnsureContext::new("a", "a.ts");

        ensure_import(&mut file, &spec("./second", &["x"], false), &mut ctx).unwrap();

        assert!(matches!(&file.items[1], Item::Import(i) if i.module_path == "./second"));
    }

    #[test]
    fn test_export_star() {
        let mut file = SourceFile::new("index.ts");
        let mut ctx = EnsureContext::new("a", "index.ts");
        let star = ExportSpec {
            module_path: "./user".into(),
            named_symbols: vec![],
            is_type_only: false,
        };
        ensure_export(&mut file, &star, &mut ctx).unwrap();
        assert_eq!(file.render(), "export * from \"./user\";\n");
    }
}
