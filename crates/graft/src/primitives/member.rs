//! Class member primitives: methods, accessors and properties.

use crate::diagnostic::GraftError;
use crate::schema::{AccessorSpec, MethodSpec, ParamSpec, PropertySpec};
use crate::tree::{
    AccessorDecl, AccessorKind, ClassDecl, ClassMember, DeclKey, DeclKind, MemberSlot, MethodDecl,
    NodeContainer, PropertyDecl, Trivia,
};

use super::body::{apply_body, created_marker, initial_body};
use super::EnsureContext;

/// Column of member bodies inside a top-level class.
const MEMBER_DEPTH: usize = 2;

pub(crate) fn render_params(params: &[ParamSpec]) -> Vec<String> {
    params.iter().map(ParamSpec::render).collect()
}

fn find(
    class: &ClassDecl,
    key: &DeclKey,
    expected: DeclKind,
    ctx: &EnsureContext,
) -> Result<Option<usize>, GraftError> {
    class
        .locate(key, expected)
        .map_err(|found| ctx.conflict(&format!("{}.{}", class.name, key.name()), expected, found))
}

pub fn ensure_method(class: &mut ClassDecl, spec: &MethodSpec, ctx: &mut EnsureContext) -> Result<(), GraftError> {
    let key = DeclKey::member(&spec.name, spec.is_static, MemberSlot::Method);
    let label = format!("{}.{}", class.name, spec.name);

    let Some(index) = find(class, &key, DeclKind::Method, ctx)? else {
        let body = initial_body(&spec.body, MEMBER_DEPTH);
        class.members.push(ClassMember::Method(MethodDecl {
            trivia: Trivia::generated(created_marker(ctx, &body, spec.is_stub)),
            visibility: spec.visibility,
            is_static: spec.is_static,
            is_override: false,
            is_async: spec.is_async,
            name: spec.name.clone(),
            type_parameters: None,
            parameters: render_params(&spec.parameters),
            return_type: spec.return_type.clone(),
            body,
        }));
        ctx.created(DeclKind::Method, label);
        return Ok(());
    };

    let Some(ClassMember::Method(method)) = class.members.get_mut(index) else {
        return Ok(());
    };
    let before = method.clone();

    method.visibility = spec.visibility;
    method.is_async = spec.is_async;
    method.parameters = render_params(&spec.parameters);
    method.return_type = spec.return_type.clone();
    apply_body(
        &mut method.body,
        method.trivia.marker.as_mut(),
        &spec.body,
        spec.overwrite_body,
        spec.is_stub,
        MEMBER_DEPTH,
        &label,
        ctx,
    );

    if *method != before {
        ctx.updated(DeclKind::Method, label);
    }
    Ok(())
}

pub fn ensure_accessor(class: &mut ClassDecl, spec: &AccessorSpec, ctx: &mut EnsureContext) -> Result<(), GraftError> {
    let (slot, kind) = match spec.kind {
        AccessorKind::Get => (MemberSlot::Getter, DeclKind::Getter),
        AccessorKind::Set => (MemberSlot::Setter, DeclKind::Setter),
    };
    let key = DeclKey::member(&spec.name, spec.is_static, slot);
    let label = format!("{}.{} {}", class.name, spec.kind.as_str(), spec.name);

    let Some(index) = find(class, &key, kind, ctx)? else {
        let body = initial_body(&spec.body, MEMBER_DEPTH);
        class.members.push(ClassMember::Accessor(AccessorDecl {
            trivia: ctx.generated(),
            visibility: spec.visibility,
            is_static: spec.is_static,
            kind: spec.kind,
            name: spec.name.clone(),
            parameters: render_params(&spec.parameters),
            return_type: spec.return_type.clone(),
            body,
        }));
        ctx.created(kind, label);
        return Ok(());
    };

    let Some(ClassMember::Accessor(accessor)) = class.members.get_mut(index) else {
        return Ok(());
    };
    let before = accessor.clone();

    accessor.visibility = spec.visibility;
    accessor.parameters = render_params(&spec.parameters);
    accessor.return_type = spec.return_type.clone();
    apply_body(
        &mut accessor.body,
        accessor.trivia.marker.as_mut(),
        &spec.body,
        spec.overwrite_body,
        false,
        MEMBER_DEPTH,
        &label,
        ctx,
    );

    if *accessor != before {
        ctx.updated(kind, label);
    }
    Ok(())
}

/// Properties keep an existing initializer; only the signature is updated.
pub fn ensure_property(class: &mut ClassDecl, spec: &PropertySpec, ctx: &mut EnsureContext) -> Result<(), GraftError> {
    let key = DeclKey::member(&spec.name, spec.is_static, MemberSlot::Field);
    let label = format!("{}.{}", class.name, spec.name);

    let Some(index) = find(class, &key, DeclKind::Property, ctx)? else {
        // Fields are declared before methods.
        let position = class
            .members
            .iter()
            .rposition(|m| matches!(m, ClassMember::Property(_)))
            .map_or(0, |i| i + 1);
        class.members.insert(
            position,
            ClassMember::Property(PropertyDecl {
                trivia: ctx.generated(),
                visibility: spec.visibility,
                is_static: spec.is_static,
                is_readonly: spec.is_readonly,
                name: spec.name.clone(),
                optional: spec.optional,
                type_annotation: spec.type_annotation.clone(),
                initializer: spec.initializer.clone(),
            }),
        );
        ctx.created(DeclKind::Property, label);
        return Ok(());
    };

    let Some(ClassMember::Property(prop)) = class.members.get_mut(index) else {
        return Ok(());
    };
    let before = prop.clone();

    prop.visibility = spec.visibility;
    prop.is_readonly = spec.is_readonly;
    prop.optional = spec.optional;
    prop.type_annotation = spec.type_annotation.clone();
    if prop.initializer.is_none() {
        prop.initializer = spec.initializer.clone();
    }

    if *prop != before {
        ctx.updated(DeclKind::Property, label);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MethodBody, StatementSpec};
    use crate::tree::Block;

    fn ctx() -> EnsureContext {
        EnsureContext::new("service:user", "user.service.ts")
    }

    #[test]
    fn test_method_created_with_marker() {
        let mut class = ClassDecl::new("UserService");
        let mut ctx = ctx();
        let spec = MethodSpec {
            is_static: true,
            is_async: true,
            parameters: vec![ParamSpec::new("id", "string")],
            body: MethodBody::Statements(vec![StatementSpec::ret("null")]),
            ..MethodSpec::new("get")
        };

        ensure_method(&mut class, &spec, &mut ctx).unwrap();

        let method = class.method("get", true).unwrap();
        assert_eq!(method.parameters, vec!["id: string"]);
        assert!(method.trivia.marker.as_ref().unwrap().belongs_to("service:user"));
        assert_eq!(ctx.changes.len(), 1);
    }

    #[test]
    fn test_unmarked_method_is_not_stamped() {
        let mut class = ClassDecl::new("UserService");
        class.members.push(ClassMember::Method(MethodDecl {
            trivia: Trivia::default(),
            visibility: None,
            is_static: false,
            is_override: false,
            is_async: false,
            name: "list".into(),
            type_parameters: None,
            parameters: vec![],
            return_type: None,
            body: Block::from_lines(&["return [1];"], 2),
        }));

        let mut ctx = ctx();
        let spec = MethodSpec {
            is_async: true,
            body: MethodBody::Statements(vec![StatementSpec::ret("[]")]),
            ..MethodSpec::new("list")
        };
        ensure_method(&mut class, &spec, &mut ctx).unwrap();

        let method = class.method("list", false).unwrap();
        assert!(method.is_async);
        assert!(method.trivia.marker.is_none());
        assert_eq!(method.body.dedented_lines(), vec!["return [1];"]);
    }

    #[test]
    fn test_property_conflicts_with_method() {
        let mut class = ClassDecl::new("UserService");
        let mut ctx = ctx();
        ensure_method(&mut class, &MethodSpec::new("name"), &mut ctx).unwrap();

        let err = ensure_property(
            &mut class,
            &PropertySpec {
                name: "name".into(),
                ..PropertySpec::default()
            },
            &mut ctx,
        )
        .unwrap_err();
        assert!(matches!(err, GraftError::ShapeConflict { found: "method", .. }));
    }

    #[test]
    fn test_property_initializer_kept() {
        let mut class = ClassDecl::new("Config");
        let mut ctx = ctx();
        let spec = PropertySpec {
            name: "retries".into(),
            is_static: true,
            type_annotation: Some("number".into()),
            initializer: Some("3".into()),
            ..PropertySpec::default()
        };
        ensure_property(&mut class, &spec, &mut ctx).unwrap();

        let edited = PropertySpec {
            initializer: Some("5".into()),
            is_readonly: true,
            ..spec
        };
        ensure_property(&mut class, &edited, &mut ctx).unwrap();

        let prop = class.property("retries", true).unwrap();
        assert_eq!(prop.initializer.as_deref(), Some("3"));
        assert!(prop.is_readonly);
    }
}
