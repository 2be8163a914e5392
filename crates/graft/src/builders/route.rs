use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::diagnostic::GraftError;
use crate::schema::{FileDefinition, FunctionSpec, MethodBody, ParamSpec, StatementSpec, TypeAliasSpec};
use crate::tree::SourceFile;

use super::{relative_import, AccessLevel, Builder, ModulePlan, Operation};

/// HTTP handlers for one module, one exported function per verb.
///
/// Handlers are fully generated: bodies are rewritten on every run, and each
/// operation is guarded by its resolved access rule.
pub struct RouteBuilder<'p> {
    plan: &'p ModulePlan<'p>,
}

/// Runtime symbols a route file ends up referencing.
#[derive(Default)]
struct Uses {
    auth: BTreeSet<&'static str>,
    http: BTreeSet<&'static str>,
    permissions: bool,
    types: Vec<String>,
}

impl<'p> RouteBuilder<'p> {
    pub fn new(plan: &'p ModulePlan<'p>) -> Self {
        Self { plan }
    }

    fn service(&self) -> String {
        format!("{}Service", self.plan.names.pascal)
    }

    fn permissions_const(&self) -> String {
        format!("{}Permissions", self.plan.names.camel)
    }

    /// Statements rejecting callers the rule of `op` does not admit.
    fn guard(&self, op: Operation, uses: &mut Uses) -> Vec<StatementSpec> {
        let rule = self.plan.permissions.rule(op);
        let mut statements = Vec::new();
        if matches!(rule.level, AccessLevel::Authenticated | AccessLevel::Roles) {
            uses.auth.insert("getSession");
            uses.http.insert("unauthorized");
            statements.push(StatementSpec::const_("session", "await getSession(request)"));
            statements.push(StatementSpec::if_("!session", vec![StatementSpec::ret("unauthorized()")]));
        }
        if rule.level == AccessLevel::Roles {
            uses.auth.insert("hasRole");
            uses.http.insert("forbidden");
            uses.permissions = true;
            statements.push(StatementSpec::if_(
                format!("!hasRole(session, {}.{}.roles)", self.permissions_const(), op.as_str()),
                vec![StatementSpec::ret("forbidden()")],
            ));
        }
        statements
    }

    fn require_id(uses: &mut Uses) -> Vec<StatementSpec> {
        uses.http.insert("notFound");
        vec![
            StatementSpec::const_("id", "context.params.id"),
            StatementSpec::if_("!id", vec![StatementSpec::ret("notFound()")]),
        ]
    }

    fn get_one(&self, uses: &mut Uses) -> Vec<StatementSpec> {
        uses.http.insert("json");
        uses.http.insert("notFound");
        let mut statements = self.guard(Operation::Get, uses);
        statements.push(StatementSpec::const_("record", format!("await {}.get(id)", self.service())));
        statements.push(StatementSpec::if_("!record", vec![StatementSpec::ret("notFound()")]));
        statements.push(StatementSpec::ret("json(record)"));
        statements
    }

    fn get_all(&self, uses: &mut Uses) -> Vec<StatementSpec> {
        uses.http.insert("json");
        let mut statements = self.guard(Operation::List, uses);
        statements.push(StatementSpec::ret(format!("json(await {}.list())", self.service())));
        statements
    }

    fn get_handler(&self, uses: &mut Uses) -> Option<Vec<StatementSpec>> {
        let permissions = &self.plan.permissions;
        match (permissions.allows(Operation::List), permissions.allows(Operation::Get)) {
            (false, false) => None,
            (true, false) => Some(self.get_all(uses)),
            (false, true) => {
                let mut statements = Self::require_id(uses);
                statements.extend(self.get_one(uses));
                Some(statements)
            }
            (true, true) => {
                let mut statements = vec![
                    StatementSpec::const_("id", "context.params.id"),
                    StatementSpec::if_("id", self.get_one(uses)),
                ];
                statements.extend(self.get_all(uses));
                Some(statements)
            }
        }
    }

    fn post_handler(&self, uses: &mut Uses) -> Vec<StatementSpec> {
        uses.http.insert("json");
        uses.types.push(self.plan.input_type());
        let mut statements = self.guard(Operation::Create, uses);
        statements.push(StatementSpec::const_(
            "input",
            format!("(await request.json()) as {}", self.plan.input_type()),
        ));
        statements.push(StatementSpec::ret(format!(
            "json(await {}.create(input), 201)",
            self.service()
        )));
        statements
    }

    fn patch_handler(&self, uses: &mut Uses) -> Vec<StatementSpec> {
        uses.http.insert("json");
        uses.types.push(self.plan.patch_type());
        let mut statements = self.guard(Operation::Update, uses);
        statements.extend(Self::require_id(uses));
        statements.push(StatementSpec::const_(
            "patch",
            format!("(await request.json()) as {}", self.plan.patch_type()),
        ));
        statements.push(StatementSpec::ret(format!(
            "json(await {}.update(id, patch))",
            self.service()
        )));
        statements
    }

    fn delete_handler(&self, uses: &mut Uses) -> Vec<StatementSpec> {
        let mut statements = self.guard(Operation::Delete, uses);
        statements.extend(Self::require_id(uses));
        statements.push(StatementSpec::expr(format!("await {}.remove(id)", self.service())));
        statements.push(StatementSpec::ret("new Response(null, { status: 204 })"));
        statements
    }

    fn handler(name: &str, statements: Vec<StatementSpec>) -> FunctionSpec {
        FunctionSpec {
            is_async: true,
            parameters: vec![
                ParamSpec::new("request", "Request"),
                ParamSpec::new("context", "RouteContext"),
            ],
            return_type: Some("Promise<Response>".into()),
            body: MethodBody::Statements(statements),
            overwrite_body: true,
            ..FunctionSpec::new(name)
        }
    }
}

impl Builder for RouteBuilder<'_> {
    fn name(&self) -> &'static str {
        "RouteBuilder"
    }

    fn artifact(&self) -> String {
        format!("route:{}", self.plan.names.snake)
    }

    fn target(&self) -> PathBuf {
        self.plan.route_file()
    }

    fn schema(&self, _existing: Option<&SourceFile>) -> Result<FileDefinition, GraftError> {
        let plan = self.plan;
        let target = self.target();
        let permissions = &plan.permissions;
        let mut def = FileDefinition::default();
        let mut uses = Uses::default();

        if let Some(statements) = self.get_handler(&mut uses) {
            def.functions.push(Self::handler("GET", statements));
        }
        if permissions.allows(Operation::Create) {
            let statements = self.post_handler(&mut uses);
            def.functions.push(Self::handler("POST", statements));
        }
        if permissions.allows(Operation::Update) {
            let statements = self.patch_handler(&mut uses);
            def.functions.push(Self::handler("PATCH", statements));
        }
        if permissions.allows(Operation::Delete) {
            let statements = self.delete_handler(&mut uses);
            def.functions.push(Self::handler("DELETE", statements));
        }

        if def.functions.is_empty() {
            return Ok(def);
        }

        def.type_aliases.push(TypeAliasSpec {
            name: "RouteContext".into(),
            is_exported: false,
            type_parameters: None,
            type_text: "{ params: { id?: string } }".into(),
        });

        if !uses.auth.is_empty() {
            let symbols: Vec<&str> = uses.auth.iter().copied().collect();
            def.import(&relative_import(&target, Path::new(&plan.runtime.auth)), &symbols);
        }
        if !uses.http.is_empty() {
            let symbols: Vec<&str> = uses.http.iter().copied().collect();
            def.import(&relative_import(&target, Path::new(&plan.runtime.http)), &symbols);
        }
        def.import(&relative_import(&target, &plan.service_file()), &[self.service().as_str()]);
        if uses.permissions {
            def.import(
                &relative_import(&target, &plan.permissions_file()),
                &[self.permissions_const().as_str()],
            );
        }
        if !uses.types.is_empty() {
            let symbols: Vec<&str> = uses.types.iter().map(String::as_str).collect();
            def.import_types(&relative_import(&target, &plan.types_file()), &symbols);
        }

        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{AccessRule, ModuleAccess};
    use crate::manifest::{ModuleSpec, RuntimePaths};
    use crate::primitives::render_statements;

    fn module(access: ModuleAccess) -> ModuleSpec {
        ModuleSpec {
            name: "user".into(),
            fields: vec![],
            access,
            actors: vec![],
            actions: vec![],
            ui: false,
        }
    }

    fn body(def: &FileDefinition, name: &str) -> Vec<String> {
        let function = def.functions.iter().find(|f| f.name == name).unwrap();
        let MethodBody::Statements(statements) = &function.body else {
            panic!("expected statements");
        };
        render_statements(statements)
    }

    #[test]
    fn test_public_routes_have_no_guard() {
        let mut access = ModuleAccess::default();
        access.default.level = AccessLevel::Public;
        let module = module(access);
        let runtime = RuntimePaths::default();
        let plan = ModulePlan::new(&module, &runtime);

        let def = RouteBuilder::new(&plan).schema(None).unwrap();
        let names: Vec<&str> = def.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["GET", "POST", "PATCH", "DELETE"]);
        assert!(def.imports.iter().all(|i| i.module_path != "../lib/auth"));
        assert!(!body(&def, "GET").iter().any(|l| l.contains("getSession")));
        assert_eq!(body(&def, "DELETE").last().unwrap(), "return new Response(null, { status: 204 });");
    }

    #[test]
    fn test_role_guard_uses_permission_table() {
        let mut access = ModuleAccess::default();
        access.operations.insert(
            Operation::Delete,
            AccessRule {
                level: AccessLevel::Roles,
                roles: vec!["admin".into()],
            },
        );
        let module = module(access);
        let runtime = RuntimePaths::default();
        let plan = ModulePlan::new(&module, &runtime);

        let def = RouteBuilder::new(&plan).schema(None).unwrap();
        let delete = body(&def, "DELETE");
        assert_eq!(delete[0], "const session = await getSession(request);");
        assert!(delete.contains(&"if (!hasRole(session, userPermissions.delete.roles)) {".to_string()));

        let auth = def.imports.iter().find(|i| i.module_path == "../lib/auth").unwrap();
        assert_eq!(auth.named_symbols, vec!["getSession", "hasRole"]);
        assert!(def.imports.iter().any(|i| i.module_path == "../permissions/user.permissions"));
    }

    #[test]
    fn test_disabled_operations_have_no_handler() {
        let mut access = ModuleAccess::default();
        access.default.level = AccessLevel::None;
        access.operations.insert(
            Operation::Get,
            AccessRule {
                level: AccessLevel::Public,
                roles: vec![],
            },
        );
        let module = module(access);
        let runtime = RuntimePaths::default();
        let plan = ModulePlan::new(&module, &runtime);

        let def = RouteBuilder::new(&plan).schema(None).unwrap();
        assert_eq!(def.functions.len(), 1);
        let get = body(&def, "GET");
        assert_eq!(get[0], "const id = context.params.id;");
        assert_eq!(get.last().unwrap(), "return json(record);");
    }
}
