use crate::diagnostic::GraftError;
use crate::schema::ClassSpec;
use crate::tree::{ClassDecl, DeclKey, DeclKind, Item, NodeContainer, SourceFile};

use super::EnsureContext;

/// Ensures the class shell exists with the requested heritage and modifiers.
///
/// Members are not touched here; the returned handle is used to ensure them.
pub fn ensure_class<'f>(
    file: &'f mut SourceFile,
    spec: &ClassSpec,
    ctx: &mut EnsureContext,
) -> Result<&'f mut ClassDecl, GraftError> {
    let key = DeclKey::Value(spec.name.clone());
    let located = file
        .locate(&key, DeclKind::Class)
        .map_err(|found| ctx.conflict(&spec.name, DeclKind::Class, found))?;

    let index = match located {
        Some(index) => {
            if let Some(Item::Class(class)) = file.items.get_mut(index) {
                let before = class.clone();
                class.exported = spec.is_exported;
                class.is_abstract = spec.is_abstract;
                class.extends = spec.extends_class.clone();
                class.implements = spec.implements.clone();
                if *class != before {
                    ctx.updated(DeclKind::Class, &spec.name);
                }
            }
            index
        }
        None => {
            let mut class = ClassDecl::new(&spec.name);
            class.trivia = ctx.generated();
            class.exported = spec.is_exported;
            class.is_abstract = spec.is_abstract;
            class.extends = spec.extends_class.clone();
            class.implements = spec.implements.clone();
            file.items.push(Item::Class(class));
            ctx.created(DeclKind::Class, &spec.name);
            file.items.len() - 1
        }
    };

    match file.items.get_mut(index) {
        Some(Item::Class(class)) => Ok(class),
        _ => Err(ctx.conflict(&spec.name, DeclKind::Class, DeclKind::Verbatim)),
    }
}
