use crate::diagnostic::GraftError;
use crate::schema::FunctionSpec;
use crate::tree::{DeclKey, DeclKind, FunctionDecl, Item, NodeContainer, SourceFile, Trivia};

use super::body::{apply_body, created_marker, initial_body};
use super::member::render_params;
use super::EnsureContext;

/// Ensures a module-level function. Body rules match methods.
pub fn ensure_function(file: &mut SourceFile, spec: &FunctionSpec, ctx: &mut EnsureContext) -> Result<(), GraftError> {
    let key = DeclKey::Value(spec.name.clone());
    let located = file
        .locate(&key, DeclKind::Function)
        .map_err(|found| ctx.conflict(&spec.name, DeclKind::Function, found))?;

    let Some(index) = located else {
        let body = initial_body(&spec.body, 0);
        file.items.push(Item::Function(FunctionDecl {
            trivia: Trivia::generated(created_marker(ctx, &body, spec.is_stub)),
            exported: spec.is_exported,
            is_async: spec.is_async,
            name: spec.name.clone(),
            type_parameters: None,
            parameters: render_params(&spec.parameters),
            return_type: spec.return_type.clone(),
            body,
        }));
        ctx.created(DeclKind::Function, &spec.name);
        return Ok(());
    };

    let Some(Item::Function(function)) = file.items.get_mut(index) else {
        return Ok(());
    };
    let before = function.clone();

    function.exported = spec.is_exported;
    function.is_async = spec.is_async;
    function.parameters = render_params(&spec.parameters);
    function.return_type = spec.return_type.clone();
    apply_body(
        &mut function.body,
        function.trivia.marker.as_mut(),
        &spec.body,
        spec.overwrite_body,
        spec.is_stub,
        0,
        &spec.name,
        ctx,
    );

    if *function != before {
        ctx.updated(DeclKind::Function, &spec.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MethodBody, ParamSpec, StatementSpec};

    #[test]
    fn test_overwritten_function_body() {
        let mut file = SourceFile::new("route.ts");
        let mut ctx = EnsureContext::new("route:user", "route.ts");
        let mut spec = FunctionSpec {
            is_async: true,
            parameters: vec![ParamSpec::new("request", "Request")],
            body: MethodBody::Statements(vec![StatementSpec::ret("ok()")]),
            overwrite_body: true,
            ..FunctionSpec::new("GET")
        };
        ensure_function(&mut file, &spec, &mut ctx).unwrap();

        spec.body = MethodBody::Statements(vec![StatementSpec::ret("ok(await list())")]);
        ensure_function(&mut file, &spec, &mut ctx).unwrap();

        let function = file.function("GET").unwrap();
        assert_eq!(function.body.dedented_lines(), vec!["return ok(await list());"]);
        assert_eq!(function.parameters, vec!["request: Request"]);
    }
}
