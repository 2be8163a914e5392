use std::path::PathBuf;

use crate::diagnostic::GraftError;
use crate::schema::{FileDefinition, InterfacePropertySpec, InterfaceSpec, TypeAliasSpec};
use crate::tree::SourceFile;

use super::{Builder, ModulePlan};

/// Entity interface plus the creation and patch types derived from it.
pub struct EntityTypesBuilder<'p> {
    plan: &'p ModulePlan<'p>,
}

impl<'p> EntityTypesBuilder<'p> {
    pub fn new(plan: &'p ModulePlan<'p>) -> Self {
        Self { plan }
    }
}

impl Builder for EntityTypesBuilder<'_> {
    fn name(&self) -> &'static str {
        "EntityTypesBuilder"
    }

    fn artifact(&self) -> String {
        format!("types:{}", self.plan.names.snake)
    }

    fn target(&self) -> PathBuf {
        self.plan.types_file()
    }

    fn schema(&self, _existing: Option<&SourceFile>) -> Result<FileDefinition, GraftError> {
        let plan = self.plan;
        let mut def = FileDefinition::default();

        let mut properties = vec![InterfacePropertySpec {
            name: "id".into(),
            type_text: "string".into(),
            optional: false,
            readonly: true,
        }];
        properties.extend(plan.module.fields.iter().map(|field| InterfacePropertySpec {
            name: field.name.clone(),
            type_text: field.field_type.ts_type().into(),
            optional: field.optional,
            readonly: false,
        }));

        def.interfaces.push(InterfaceSpec {
            name: plan.entity_type(),
            is_exported: true,
            extends: Vec::new(),
            properties,
        });
        def.type_aliases.push(TypeAliasSpec {
            name: plan.input_type(),
            is_exported: true,
            type_parameters: None,
            type_text: format!("Omit<{}, \"id\">", plan.entity_type()),
        });
        def.type_aliases.push(TypeAliasSpec {
            name: plan.patch_type(),
            is_exported: true,
            type_parameters: None,
            type_text: format!("Partial<{}>", plan.input_type()),
        });

        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{FieldSpec, FieldType, ModuleSpec, RuntimePaths};

    #[test]
    fn test_entity_types_schema() {
        let module = ModuleSpec {
            name: "blog_post".into(),
            fields: vec![
                FieldSpec {
                    name: "title".into(),
                    field_type: FieldType::String,
                    optional: false,
                },
                FieldSpec {
                    name: "publishedAt".into(),
                    field_type: FieldType::Date,
                    optional: true,
                },
            ],
            access: Default::default(),
            actors: vec![],
            actions: vec![],
            ui: false,
        };
        let runtime = RuntimePaths::default();
        let plan = ModulePlan::new(&module, &runtime);
        let def = EntityTypesBuilder::new(&plan).schema(None).unwrap();

        let interface = &def.interfaces[0];
        assert_eq!(interface.name, "BlogPost");
        let props: Vec<(&str, &str, bool)> = interface
            .properties
            .iter()
            .map(|p| (p.name.as_str(), p.type_text.as_str(), p.optional))
            .collect();
        assert_eq!(
            props,
            vec![("id", "string", false), ("title", "string", false), ("publishedAt", "Date", true)]
        );
        assert_eq!(def.type_aliases[0].type_text, "Omit<BlogPost, \"id\">");
        assert_eq!(def.type_aliases[1].name, "BlogPostPatch");
    }
}
