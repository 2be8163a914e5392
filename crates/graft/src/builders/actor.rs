use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::diagnostic::GraftError;
use crate::manifest::{ActorSpec, AuthStrategy};
use crate::schema::{FileDefinition, FunctionSpec, MethodBody, StatementSpec, TypeAliasSpec};
use crate::tree::SourceFile;

use super::{relative_import, to_pascal_case, Builder, ModulePlan};

/// Test fixtures that return a client authenticated as each declared actor.
///
/// Fixture bodies are written once and then belong to the test author.
pub struct ActorBuilder<'p> {
    plan: &'p ModulePlan<'p>,
}

impl<'p> ActorBuilder<'p> {
    pub fn new(plan: &'p ModulePlan<'p>) -> Self {
        Self { plan }
    }

    fn fixture(actor: &ActorSpec, auth: &mut BTreeSet<&'static str>) -> FunctionSpec {
        let statements = match &actor.strategy {
            AuthStrategy::Credentials { email, password } => {
                auth.insert("signIn");
                vec![
                    StatementSpec::const_("session", format!("await signIn({:?}, {:?})", email, password)),
                    StatementSpec::ret("new TestClient({ session })"),
                ]
            }
            AuthStrategy::BearerToken { env_var } => vec![
                StatementSpec::const_("token", format!("process.env.{}", env_var)),
                StatementSpec::if_(
                    "!token",
                    vec![StatementSpec::throw(format!("new Error(\"{} is not set\")", env_var))],
                ),
                StatementSpec::ret("new TestClient({ token })"),
            ],
            AuthStrategy::KeyedLookup { key } => {
                auth.insert("lookupSession");
                vec![
                    StatementSpec::const_("session", format!("await lookupSession({:?})", key)),
                    StatementSpec::ret("new TestClient({ session })"),
                ]
            }
        };

        FunctionSpec {
            is_async: true,
            return_type: Some("Promise<TestClient>".into()),
            body: MethodBody::Statements(statements),
            ..FunctionSpec::new(format!("as{}", to_pascal_case(&actor.name)))
        }
    }
}

impl Builder for ActorBuilder<'_> {
    fn name(&self) -> &'static str {
        "ActorBuilder"
    }

    fn artifact(&self) -> String {
        format!("actors:{}", self.plan.names.snake)
    }

    fn target(&self) -> PathBuf {
        self.plan.actors_file()
    }

    fn schema(&self, _existing: Option<&SourceFile>) -> Result<FileDefinition, GraftError> {
        let plan = self.plan;
        let target = self.target();
        let actors = &plan.module.actors;
        let mut def = FileDefinition::default();
        let mut auth = BTreeSet::new();

        def.type_aliases.push(TypeAliasSpec {
            name: format!("{}Actor", plan.names.pascal),
            is_exported: true,
            type_parameters: None,
            type_text: actors
                .iter()
                .map(|a| format!("\"{}\"", a.name))
                .collect::<Vec<_>>()
                .join(" | "),
        });
        for actor in actors {
            def.functions.push(Self::fixture(actor, &mut auth));
        }

        def.import(
            &relative_import(&target, Path::new(&plan.runtime.testing)),
            &["TestClient"],
        );
        if !auth.is_empty() {
            let symbols: Vec<&str> = auth.into_iter().collect();
            def.import(&relative_import(&target, Path::new(&plan.runtime.auth)), &symbols);
        }
        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ModuleSpec, RuntimePaths};
    use crate::primitives::render_statements;

    #[test]
    fn test_fixture_per_strategy() {
        let module = ModuleSpec {
            name: "user".into(),
            fields: vec![],
            access: Default::default(),
            actors: vec![
                ActorSpec {
                    name: "admin".into(),
                    strategy: AuthStrategy::Credentials {
                        email: "admin@example.com".into(),
                        password: "secret".into(),
                    },
                },
                ActorSpec {
                    name: "ci_bot".into(),
                    strategy: AuthStrategy::BearerToken {
                        env_var: "CI_TOKEN".into(),
                    },
                },
            ],
            actions: vec![],
            ui: false,
        };
        let runtime = RuntimePaths::default();
        let plan = ModulePlan::new(&module, &runtime);

        let def = ActorBuilder::new(&plan).schema(None).unwrap();
        assert_eq!(def.type_aliases[0].type_text, "\"admin\" | \"ci_bot\"");
        assert_eq!(def.functions[0].name, "asAdmin");
        assert_eq!(def.functions[1].name, "asCiBot");

        let MethodBody::Statements(admin) = &def.functions[0].body else {
            panic!("expected statements");
        };
        assert_eq!(
            render_statements(admin)[0],
            "const session = await signIn(\"admin@example.com\", \"secret\");"
        );

        let MethodBody::Statements(bot) = &def.functions[1].body else {
            panic!("expected statements");
        };
        assert_eq!(
            render_statements(bot),
            vec![
                "const token = process.env.CI_TOKEN;",
                "if (!token) {",
                "  throw new Error(\"CI_TOKEN is not set\");",
                "}",
                "return new TestClient({ token });",
            ]
        );

        let auth = def.imports.iter().find(|i| i.module_path == "../lib/auth").unwrap();
        assert_eq!(auth.named_symbols, vec!["signIn"]);
    }
}
