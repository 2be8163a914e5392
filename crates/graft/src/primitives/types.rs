//! Type aliases and interfaces. Both are fully regenerated on every run.

use crate::diagnostic::GraftError;
use crate::schema::{InterfacePropertySpec, InterfaceSpec, TypeAliasSpec};
use crate::tree::{Block, DeclKey, DeclKind, InterfaceDecl, Item, NodeContainer, SourceFile, TypeAliasDecl};

use super::EnsureContext;

pub fn ensure_type_alias(file: &mut SourceFile, spec: &TypeAliasSpec, ctx: &mut EnsureContext) -> Result<(), GraftError> {
    let key = DeclKey::Type(spec.name.clone());
    let located = file
        .locate(&key, DeclKind::TypeAlias)
        .map_err(|found| ctx.conflict(&spec.name, DeclKind::TypeAlias, found))?;

    let Some(index) = located else {
        file.items.push(Item::TypeAlias(TypeAliasDecl {
            trivia: ctx.generated(),
            exported: spec.is_exported,
            name: spec.name.clone(),
            type_parameters: spec.type_parameters.clone(),
            value: spec.type_text.clone(),
        }));
        ctx.created(DeclKind::TypeAlias, &spec.name);
        return Ok(());
    };

    if let Some(Item::TypeAlias(alias)) = file.items.get_mut(index) {
        let before = alias.clone();
        alias.exported = spec.is_exported;
        alias.type_parameters = spec.type_parameters.clone();
        alias.value = spec.type_text.clone();
        if *alias != before {
            ctx.updated(DeclKind::TypeAlias, &spec.name);
        }
    }
    Ok(())
}

fn property_line(prop: &InterfacePropertySpec) -> String {
    format!(
        "{}{}{}: {};",
        if prop.readonly { "readonly " } else { "" },
        prop.name,
        if prop.optional { "?" } else { "" },
        prop.type_text
    )
}

pub fn ensure_interface(file: &mut SourceFile, spec: &InterfaceSpec, ctx: &mut EnsureContext) -> Result<(), GraftError> {
    let key = DeclKey::Type(spec.name.clone());
    let located = file
        .locate(&key, DeclKind::Interface)
        .map_err(|found| ctx.conflict(&spec.name, DeclKind::Interface, found))?;

    let lines: Vec<String> = spec.properties.iter().map(property_line).collect();
    let body = Block::from_lines(&lines, 0);

    let Some(index) = located else {
        file.items.push(Item::Interface(InterfaceDecl {
            trivia: ctx.generated(),
            exported: spec.is_exported,
            name: spec.name.clone(),
            type_parameters: None,
            extends: spec.extends.clone(),
            body,
        }));
        ctx.created(DeclKind::Interface, &spec.name);
        return Ok(());
    };

    if let Some(Item::Interface(interface)) = file.items.get_mut(index) {
        let before = interface.clone();
        interface.exported = spec.is_exported;
        interface.extends = spec.extends.clone();
        // Re-indented copies of the same members are left alone.
        if interface.body.fingerprint() != body.fingerprint() {
            interface.body = body;
        }
        if *interface != before {
            ctx.updated(DeclKind::Interface, &spec.name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_regenerated() {
        let mut file = SourceFile::new("user.types.ts");
        let mut ctx = EnsureContext::new("types:user", "user.types.ts");
        let mut spec = InterfaceSpec {
            name: "User".into(),
            is_exported: true,
            extends: vec![],
            properties: vec![InterfacePropertySpec {
                name: "id".into(),
                type_text: "string".into(),
                optional: false,
                readonly: true,
            }],
        };
        ensure_interface(&mut file, &spec, &mut ctx).unwrap();

        spec.properties.push(InterfacePropertySpec {
            name: "email".into(),
            type_text: "string".into(),
            optional: true,
            readonly: false,
        });
        ensure_interface(&mut file, &spec, &mut ctx).unwrap();

        assert_eq!(
            file.render(),
            "// @graft-generated types:user\nexport interface User {\n  readonly id: string;\n  email?: string;\n}\n"
        );
    }

    #[test]
    fn test_alias_conflicts_with_interface() {
        let mut file = SourceFile::new("a.ts");
        let mut ctx = EnsureContext::new("a", "a.ts");
        ensure_interface(
            &mut file,
            &InterfaceSpec {
                name: "User".into(),
                is_exported: true,
                extends: vec![],
                properties: vec![],
            },
            &mut ctx,
        )
        .unwrap();

        let alias = TypeAliasSpec {
            name: "User".into(),
            is_exported: true,
            type_parameters: None,
            type_text: "string".into(),
        };
        assert!(ensure_type_alias(&mut file, &alias, &mut ctx).is_err());
    }
}
