use std::path::PathBuf;

use crate::diagnostic::GraftError;
use crate::manifest::FieldType;
use crate::primitives::{render_element, ElementSpec};
use crate::schema::{FileDefinition, FunctionSpec, MethodBody, StatementSpec};
use crate::tree::{SourceFile, VarKind};

use super::{relative_import, Builder, ModulePlan};

/// Server component listing every record of a module.
pub struct ListPageBuilder<'p> {
    plan: &'p ModulePlan<'p>,
}

impl<'p> ListPageBuilder<'p> {
    pub fn new(plan: &'p ModulePlan<'p>) -> Self {
        Self { plan }
    }

    /// Field shown for each record: the first required string field, else the id.
    fn label_field(&self) -> &str {
        self.plan
            .module
            .fields
            .iter()
            .find(|f| f.field_type == FieldType::String && !f.optional)
            .map(|f| f.name.as_str())
            .unwrap_or("id")
    }

    fn markup(&self) -> ElementSpec {
        let item = format!(
            "records.map((record) => <li key={{record.id}}>{{record.{}}}</li>)",
            self.label_field()
        );
        ElementSpec::new("section")
            .element(ElementSpec::new("h1").text(self.plan.names.plural()))
            .element(ElementSpec::new("ul").expression(item))
    }
}

impl Builder for ListPageBuilder<'_> {
    fn name(&self) -> &'static str {
        "ListPageBuilder"
    }

    fn artifact(&self) -> String {
        format!("ui:{}", self.plan.names.snake)
    }

    fn target(&self) -> PathBuf {
        self.plan.list_page_file()
    }

    fn schema(&self, _existing: Option<&SourceFile>) -> Result<FileDefinition, GraftError> {
        let plan = self.plan;
        let target = self.target();
        let client = format!("{}Client", plan.names.pascal);
        let mut def = FileDefinition::default();

        let mut ret = String::from("return (\n");
        for line in render_element(&self.markup()) {
            ret.push_str("  ");
            ret.push_str(&line);
            ret.push('\n');
        }
        ret.push_str(");");

        def.functions.push(FunctionSpec {
            is_async: true,
            return_type: Some("Promise<JSX.Element>".into()),
            body: MethodBody::Statements(vec![
                StatementSpec::VariableDeclaration {
                    var_kind: VarKind::Const,
                    name: "records".into(),
                    type_annotation: Some(format!("{}[]", plan.entity_type())),
                    value: format!("await new {}().list()", client),
                },
                StatementSpec::raw(ret),
            ]),
            overwrite_body: true,
            ..FunctionSpec::new(format!("{}ListPage", plan.names.pascal))
        });

        def.import(&relative_import(&target, &plan.client_file()), &[client.as_str()]);
        def.import_types(
            &relative_import(&target, &plan.types_file()),
            &[plan.entity_type().as_str()],
        );
        Ok(def)
    }
}
