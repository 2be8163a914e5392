use std::path::{Path, PathBuf};

use crate::diagnostic::GraftError;
use crate::schema::{ClassSpec, FileDefinition, MethodBody, MethodSpec, ParamSpec, StatementSpec};
use crate::tree::SourceFile;

use super::{relative_import, Builder, ModulePlan, Operation};

/// Typed HTTP client mirroring the generated routes.
pub struct ClientBuilder<'p> {
    plan: &'p ModulePlan<'p>,
}

impl<'p> ClientBuilder<'p> {
    pub fn new(plan: &'p ModulePlan<'p>) -> Self {
        Self { plan }
    }

    pub fn class_name(&self) -> String {
        format!("{}Client", self.plan.names.pascal)
    }

    fn method(&self, op: Operation) -> MethodSpec {
        let plan = self.plan;
        let entity = plan.entity_type();
        let collection = format!("\"{}\"", plan.names.resource_path());
        let item = format!("`{}/${{id}}`", plan.names.resource_path());
        let id = || ParamSpec::new("id", "string");

        let (name, parameters, return_type, statement) = match op {
            Operation::List => (
                "list",
                vec![],
                format!("Promise<{}[]>", entity),
                StatementSpec::ret(format!("this.request<{}[]>(\"GET\", {})", entity, collection)),
            ),
            Operation::Get => (
                "get",
                vec![id()],
                format!("Promise<{}>", entity),
                StatementSpec::ret(format!("this.request<{}>(\"GET\", {})", entity, item)),
            ),
            Operation::Create => (
                "create",
                vec![ParamSpec::new("input", plan.input_type())],
                format!("Promise<{}>", entity),
                StatementSpec::ret(format!(
                    "this.request<{}>(\"POST\", {}, input)",
                    entity, collection
                )),
            ),
            Operation::Update => (
                "update",
                vec![id(), ParamSpec::new("patch", plan.patch_type())],
                format!("Promise<{}>", entity),
                StatementSpec::ret(format!("this.request<{}>(\"PATCH\", {}, patch)", entity, item)),
            ),
            Operation::Delete => (
                "remove",
                vec![id()],
                "Promise<void>".to_string(),
                StatementSpec::expr(format!("await this.request<void>(\"DELETE\", {})", item)),
            ),
        };

        MethodSpec {
            is_async: true,
            parameters,
            return_type: Some(return_type),
            body: MethodBody::Statements(vec![statement]),
            overwrite_body: true,
            ..MethodSpec::new(name)
        }
    }
}

impl Builder for ClientBuilder<'_> {
    fn name(&self) -> &'static str {
        "ClientBuilder"
    }

    fn artifact(&self) -> String {
        format!("client:{}", self.plan.names.snake)
    }

    fn target(&self) -> PathBuf {
        self.plan.client_file()
    }

    fn schema(&self, _existing: Option<&SourceFile>) -> Result<FileDefinition, GraftError> {
        let plan = self.plan;
        let target = self.target();
        let mut def = FileDefinition::default();

        let mut class = ClassSpec {
            extends_class: Some("ApiClient".into()),
            ..ClassSpec::new(self.class_name())
        };
        let mut types = vec![];
        for op in plan.permissions.allowed() {
            class.methods.push(self.method(op));
            if !types.contains(&plan.entity_type()) {
                types.push(plan.entity_type());
            }
            match op {
                Operation::Create => types.push(plan.input_type()),
                Operation::Update => types.push(plan.patch_type()),
                _ => {}
            }
        }

        def.import(
            &relative_import(&target, Path::new(&plan.runtime.api_client)),
            &["ApiClient"],
        );
        if !types.is_empty() {
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
    use crate::primitives::render_statements;

    #[test]
    fn test_client_paths() {
        let module = ModuleSpec {
            name: "blog_post".into(),
            fields: vec![],
            access: Default::default(),
            actors: vec![],
            actions: vec![],
            ui: false,
        };
        let runtime = RuntimePaths::default();
        let plan = ModulePlan::new(&module, &runtime);

        let def = ClientBuilder::new(&plan).schema(None).unwrap();
        let class = &def.classes[0];
        assert_eq!(class.name, "BlogPostClient");
        assert_eq!(class.extends_class.as_deref(), Some("ApiClient"));

        let MethodBody::Statements(get) = &class.methods[1].body else {
            panic!("expected statements");
        };
        assert_eq!(
            render_statements(get),
            vec!["return this.request<BlogPost>(\"GET\", `/blog-posts/${id}`);"]
        );
        assert_eq!(def.imports[0].module_path, "../lib/api-client");
    }
}
