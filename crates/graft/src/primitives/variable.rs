use crate::diagnostic::GraftError;
use crate::schema::{VariableSpec, VariableValue};
use crate::tree::{DeclKey, DeclKind, Item, NodeContainer, SourceFile, VariableDecl};

use super::EnsureContext;

pub fn ensure_variable(file: &mut SourceFile, spec: &VariableSpec, ctx: &mut EnsureContext) -> Result<(), GraftError> {
    let key = DeclKey::Value(spec.name.clone());
    let located = file
        .locate(&key, DeclKind::Variable)
        .map_err(|found| ctx.conflict(&spec.name, DeclKind::Variable, found))?;

    let Some(index) = located else {
        let value = match &spec.value {
            VariableValue::Replace(text) | VariableValue::PreserveExisting(text) => text.clone(),
        };
        file.items.push(Item::Variable(VariableDecl {
            trivia: ctx.generated(),
            exported: spec.is_exported,
            kind: spec.kind,
            name: spec.name.clone(),
            type_annotation: spec.type_annotation.clone(),
            value: Some(value),
        }));
        ctx.created(DeclKind::Variable, &spec.name);
        return Ok(());
    };

    let Some(Item::Variable(var)) = file.items.get_mut(index) else {
        return Ok(());
    };
    let before = var.clone();

    var.exported = spec.is_exported;
    var.kind = spec.kind;
    var.type_annotation = spec.type_annotation.clone();
    match &spec.value {
        VariableValue::Replace(text) => var.value = Some(text.clone()),
        VariableValue::PreserveExisting(fallback) => {
            if var.value.is_none() {
                var.value = Some(fallback.clone());
            }
        }
    }

    if *var != before {
        ctx.updated(DeclKind::Variable, &spec.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::VarKind;

    fn spec(value: VariableValue) -> VariableSpec {
        VariableSpec {
            name: "userPermissions".into(),
            kind: VarKind::Const,
            is_exported: true,
            type_annotation: None,
            value,
        }
    }

    #[test]
    fn test_replace_and_preserve() {
        let mut file = SourceFile::new("a.ts");
        let mut ctx = EnsureContext::new("a", "a.ts");

        ensure_variable(&mut file, &spec(VariableValue::Replace("1".into())), &mut ctx).unwrap();
        ensure_variable(&mut file, &spec(VariableValue::PreserveExisting("2".into())), &mut ctx).unwrap();
        let Item::Variable(var) = &file.items[0] else {
            panic!("expected variable");
        };
        assert_eq!(var.value.as_deref(), Some("1"));

        ensure_variable(&mut file, &spec(VariableValue::Replace("3".into())), &mut ctx).unwrap();
        let Item::Variable(var) = &file.items[0] else {
            panic!("expected variable");
        };
        assert_eq!(var.value.as_deref(), Some("3"));
    }
}
