//! Structural checks run before a definition touches any tree.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostic::GraftError;
use crate::tree::{AccessorKind, DeclKey, MemberSlot};

use super::FileDefinition;

/// Base classes that need no import.
const AMBIENT_GLOBALS: &[&str] = &["Error", "Array", "Map", "Set", "Promise", "Object", "EventTarget"];

/// Rejects definitions that could not be reconciled unambiguously.
///
/// Checks: unique identities per namespace and per class, no local import
/// name bound from two different modules, no empty module paths, every
/// `extends` names a class declared in the definition, imported, or a known
/// global, and every `implements` entry names an interface, type alias or
/// class declared in the definition, or an imported symbol. Parameter and
/// return type annotations are free text and are not resolved.
pub fn validate(def: &FileDefinition, artifact: &str) -> Result<(), GraftError> {
    let fail = |message: String| Err(GraftError::schema(artifact, message));

    // Import bindings
    let mut bound: BTreeMap<&str, &str> = BTreeMap::new();
    for import in &def.imports {
        if import.module_path.trim().is_empty() {
            return fail("import with an empty module path".into());
        }
        let locals = import
            .named_symbols
            .iter()
            .chain(import.default_symbol.iter());
        for local in locals {
            match bound.get(local.as_str()) {
                Some(module) if *module != import.module_path => {
                    return fail(format!(
                        "'{}' is imported from both '{}' and '{}'",
                        local, module, import.module_path
                    ));
                }
                _ => {
                    bound.insert(local, &import.module_path);
                }
            }
        }
    }
    for export in &def.exports {
        if export.module_path.trim().is_empty() {
            return fail("re-export with an empty module path".into());
        }
    }

    // Top-level identities
    let mut seen = BTreeSet::new();
    let keys = def
        .variables
        .iter()
        .map(|v| DeclKey::Value(v.name.clone()))
        .chain(def.classes.iter().map(|c| DeclKey::Value(c.name.clone())))
        .chain(def.functions.iter().map(|f| DeclKey::Value(f.name.clone())))
        .chain(def.type_aliases.iter().map(|t| DeclKey::Type(t.name.clone())))
        .chain(def.interfaces.iter().map(|i| DeclKey::Type(i.name.clone())));
    for key in keys {
        if key.name().is_empty() {
            return fail("declaration with an empty name".into());
        }
        if !seen.insert(key.clone()) {
            return fail(format!("'{}' is declared more than once", key.name()));
        }
    }

    // Class members
    for class in &def.classes {
        let mut members: Vec<DeclKey> = Vec::new();
        let keys = class
            .properties
            .iter()
            .map(|p| DeclKey::member(&p.name, p.is_static, MemberSlot::Field))
            .chain(class.methods.iter().map(|m| DeclKey::member(&m.name, m.is_static, MemberSlot::Method)))
            .chain(class.accessors.iter().map(|a| {
                let slot = match a.kind {
                    AccessorKind::Get => MemberSlot::Getter,
                    AccessorKind::Set => MemberSlot::Setter,
                };
                DeclKey::member(&a.name, a.is_static, slot)
            }));
        for key in keys {
            if members.iter().any(|k| k.collides(&key)) {
                return fail(format!("member '{}.{}' is declared more than once", class.name, key.name()));
            }
            members.push(key);
        }

        if let Some(base) = &class.extends_class {
            let base = base_name(base);
            let known = def.classes.iter().any(|c| c.name == base)
                || bound.contains_key(base)
                || AMBIENT_GLOBALS.contains(&base);
            if !known {
                return fail(format!(
                    "class '{}' extends '{}', which is neither declared nor imported",
                    class.name, base
                ));
            }
        }

        for contract in &class.implements {
            let name = base_name(contract);
            let known = def.interfaces.iter().any(|i| i.name == name)
                || def.type_aliases.iter().any(|t| t.name == name)
                || def.classes.iter().any(|c| c.name == name)
                || bound.contains_key(name);
            if !known {
                return fail(format!(
                    "class '{}' implements '{}', which is neither declared nor imported",
                    class.name, name
                ));
            }
        }
    }

    Ok(())
}

/// `Base<T>` resolves through `Base`.
fn base_name(reference: &str) -> &str {
    reference.split('<').next().unwrap_or(reference).trim()
}
