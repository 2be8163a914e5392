//! Removal of generated declarations that are no longer requested.

use std::collections::BTreeSet;

use crate::schema::{ClassSpec, FileDefinition};
use crate::tree::{AccessorKind, ClassDecl, DeclKey, DeclKind, Declaration, Item, MemberSlot, NodeContainer, SourceFile};

use super::{Change, SweepPolicy};

fn top_level_keys(def: &FileDefinition) -> BTreeSet<DeclKey> {
    def.variables
        .iter()
        .map(|v| DeclKey::Value(v.name.clone()))
        .chain(def.classes.iter().map(|c| DeclKey::Value(c.name.clone())))
        .chain(def.functions.iter().map(|f| DeclKey::Value(f.name.clone())))
        .chain(def.type_aliases.iter().map(|t| DeclKey::Type(t.name.clone())))
        .chain(def.interfaces.iter().map(|i| DeclKey::Type(i.name.clone())))
        .collect()
}

fn member_keys(spec: &ClassSpec) -> BTreeSet<DeclKey> {
    spec.properties
        .iter()
        .map(|p| DeclKey::member(&p.name, p.is_static, MemberSlot::Field))
        .chain(spec.methods.iter().map(|m| DeclKey::member(&m.name, m.is_static, MemberSlot::Method)))
        .chain(spec.accessors.iter().map(|a| {
            let slot = match a.kind {
                AccessorKind::Get => MemberSlot::Getter,
                AccessorKind::Set => MemberSlot::Setter,
            };
            DeclKey::member(&a.name, a.is_static, slot)
        }))
        .collect()
}

pub(super) fn is_shell(spec: &ClassSpec) -> bool {
    spec.properties.is_empty() && spec.methods.is_empty() && spec.accessors.is_empty()
}

fn sweep_members(class: &mut ClassDecl, artifact: &str, wanted: &BTreeSet<DeclKey>, changes: &mut Vec<Change>) {
    let kinds: Vec<_> = class
        .members
        .iter()
        .filter_map(|m| m.key().map(|k| (k, m.kind())))
        .collect();
    for key in class.sweep(artifact, wanted) {
        if let Some((_, kind)) = kinds.iter().find(|(k, _)| *k == key) {
            changes.push(Change::Swept {
                kind: *kind,
                name: format!("{}.{}", class.name, key.name()),
            });
        }
    }
}

/// Removes declarations carrying `artifact`'s marker whose identity the
/// definition no longer lists. Unmarked declarations always survive.
///
/// A stale generated class is not removed whole: only its generated members
/// go, and the emptied class is left to the shell policy.
pub(super) fn sweep(file: &mut SourceFile, def: &FileDefinition, artifact: &str, policy: SweepPolicy) -> Vec<Change> {
    let mut changes = Vec::new();
    let wanted = top_level_keys(def);

    let mut retained = wanted.clone();
    let mut stale_classes = BTreeSet::new();
    for item in file.items.iter_mut() {
        let stale = item.is_generated_by(artifact) && item.key().is_some_and(|k| !wanted.contains(&k));
        let Item::Class(class) = item else {
            continue;
        };
        if !stale {
            continue;
        }
        retained.insert(DeclKey::Value(class.name.clone()));
        sweep_members(class, artifact, &BTreeSet::new(), &mut changes);
        stale_classes.insert(class.name.clone());
    }

    // Kinds have to be captured before the items disappear.
    let kinds: Vec<(DeclKey, DeclKind)> = file
        .items
        .iter()
        .filter_map(|item| item.key().map(|k| (k, item.kind())))
        .collect();
    for key in file.sweep(artifact, &retained) {
        if let Some((_, kind)) = kinds.iter().find(|(k, _)| *k == key) {
            changes.push(Change::Swept {
                kind: *kind,
                name: key.name().to_string(),
            });
        }
    }

    for spec in &def.classes {
        let wanted = member_keys(spec);
        for item in file.items.iter_mut() {
            let Item::Class(class) = item else {
                continue;
            };
            if class.name == spec.name {
                sweep_members(class, artifact, &wanted, &mut changes);
            }
        }
    }

    if policy == SweepPolicy::PruneEmptyShells {
        let shells: BTreeSet<&str> = def
            .classes
            .iter()
            .filter(|c| is_shell(c))
            .map(|c| c.name.as_str())
            .collect();
        file.items.retain(|item| match item {
            Item::Class(class)
                if class.members.is_empty()
                    && (shells.contains(class.name.as_str()) || stale_classes.contains(&class.name))
                    && item.is_generated_by(artifact) =>
            {
                changes.push(Change::Swept {
                    kind: DeclKind::Class,
                    name: class.name.clone(),
                });
                false
            }
            _ => true,
        });
    }

    changes
}
