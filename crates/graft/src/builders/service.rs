use std::path::{Path, PathBuf};

use crate::diagnostic::GraftError;
use crate::schema::{ClassSpec, FileDefinition, MethodBody, MethodSpec, ParamSpec, StatementSpec};
use crate::tree::SourceFile;

use super::{carried_body, relative_import, Builder, ModulePlan, Operation};

/// `<Entity>Service`: one static persistence method per generated operation,
/// plus a stub per custom action.
///
/// Method bodies are written once. Existing bodies are carried forward, so
/// edits to generated CRUD logic survive regeneration.
pub struct ServiceBuilder<'p> {
    plan: &'p ModulePlan<'p>,
}

impl<'p> ServiceBuilder<'p> {
    pub fn new(plan: &'p ModulePlan<'p>) -> Self {
        Self { plan }
    }

    pub fn class_name(&self) -> String {
        format!("{}Service", self.plan.names.pascal)
    }

    /// Method name, parameters, return type and default body of an operation.
    fn operation(&self, op: Operation) -> (&'static str, Vec<ParamSpec>, String, Vec<StatementSpec>) {
        let plan = self.plan;
        let table = format!("db.{}", plan.names.camel);
        let entity = plan.entity_type();
        let id = || ParamSpec::new("id", "string");

        match op {
            Operation::List => (
                "list",
                vec![],
                format!("Promise<{}[]>", entity),
                vec![StatementSpec::ret(format!("{}.findMany()", table))],
            ),
            Operation::Get => (
                "get",
                vec![id()],
                format!("Promise<{} | null>", entity),
                vec![StatementSpec::ret(format!("{}.findUnique({{ where: {{ id }} }})", table))],
            ),
            Operation::Create => (
                "create",
                vec![ParamSpec::new("input", plan.input_type())],
                format!("Promise<{}>", entity),
                vec![StatementSpec::ret(format!("{}.create({{ data: input }})", table))],
            ),
            Operation::Update => (
                "update",
                vec![id(), ParamSpec::new("patch", plan.patch_type())],
                format!("Promise<{}>", entity),
                vec![StatementSpec::ret(format!(
                    "{}.update({{ where: {{ id }}, data: patch }})",
                    table
                ))],
            ),
            Operation::Delete => (
                "remove",
                vec![id()],
                "Promise<void>".to_string(),
                vec![StatementSpec::expr(format!("await {}.delete({{ where: {{ id }} }})", table))],
            ),
        }
    }
}

impl Builder for ServiceBuilder<'_> {
    fn name(&self) -> &'static str {
        "ServiceBuilder"
    }

    fn artifact(&self) -> String {
        format!("service:{}", self.plan.names.snake)
    }

    fn target(&self) -> PathBuf {
        self.plan.service_file()
    }

    fn schema(&self, existing: Option<&SourceFile>) -> Result<FileDefinition, GraftError> {
        let plan = self.plan;
        let target = self.target();
        let class_name = self.class_name();
        let mut def = FileDefinition::default();
        let mut class = ClassSpec::new(&class_name);
        let mut types = Vec::new();

        for op in plan.permissions.allowed() {
            let (name, parameters, return_type, statements) = self.operation(op);
            let body = carried_body(existing, &class_name, name, true)
                .unwrap_or(MethodBody::Statements(statements));

            types.push(plan.entity_type());
            match op {
                Operation::Create => types.push(plan.input_type()),
                Operation::Update => types.push(plan.patch_type()),
                _ => {}
            }

            class.methods.push(MethodSpec {
                is_static: true,
                is_async: true,
                parameters,
                return_type: Some(return_type),
                body,
                ..MethodSpec::new(name)
            });
        }

        if !class.methods.is_empty() {
            def.import(&relative_import(&target, Path::new(&plan.runtime.db)), &["db"]);
        }

        for action in &plan.module.actions {
            class.methods.push(MethodSpec {
                is_static: true,
                is_async: true,
                parameters: vec![ParamSpec::new("id", "string")],
                return_type: Some("Promise<void>".into()),
                body: MethodBody::Statements(vec![StatementSpec::throw(format!(
                    "new Error(\"{}.{} is not implemented\")",
                    class_name, action
                ))]),
                is_stub: true,
                ..MethodSpec::new(action)
            });
        }

        if !types.is_empty() {
            let mut seen = Vec::new();
            types.retain(|t| {
                let first = !seen.contains(t);
                seen.push(t.clone());
                first
            });
            let symbols: Vec<&str> = types.iter().map(String::as_str).collect();
            def.import_types(&relative_import(&target, &plan.types_file()), &symbols);
        }

        def.classes.push(class);
        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ModuleSpec, RuntimePaths};

    fn module() -> ModuleSpec {
        ModuleSpec {
            name: "user".into(),
            fields: vec![],
            access: Default::default(),
            actors: vec![],
            actions: vec!["resetPassword".into()],
            ui: false,
        }
    }

    #[test]
    fn test_service_schema() {
        let module = module();
        let runtime = RuntimePaths::default();
        let plan = ModulePlan::new(&module, &runtime);
        let def = ServiceBuilder::new(&plan).schema(None).unwrap();

        let class = &def.classes[0];
        assert_eq!(class.name, "UserService");
        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["list", "get", "create", "update", "remove", "resetPassword"]);
        assert!(class.methods[5].is_stub);

        assert_eq!(def.imports[0].module_path, "../lib/db");
        assert_eq!(def.imports[1].module_path, "../types/user.types");
        assert_eq!(def.imports[1].named_symbols, vec!["User", "NewUser", "UserPatch"]);
    }

    #[test]
    fn test_existing_body_carried_forward() {
        let module = module();
        let runtime = RuntimePaths::default();
        let plan = ModulePlan::new(&module, &runtime);

        let mut parser = crate::tree::SourceParser::new().unwrap();
        let existing = parser
            .parse(
                "export class UserService {\n  static async list() {\n    return cache.users();\n  }\n}\n",
                Path::new("user.service.ts"),
            )
            .unwrap();

        let def = ServiceBuilder::new(&plan).schema(Some(&existing)).unwrap();
        assert_eq!(
            def.classes[0].methods[0].body,
            MethodBody::Statements(vec![StatementSpec::raw("return cache.users();")])
        );
    }
}
