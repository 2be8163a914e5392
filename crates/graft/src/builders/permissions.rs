use std::path::PathBuf;

use crate::diagnostic::GraftError;
use crate::schema::{FileDefinition, TypeAliasSpec, VariableSpec, VariableValue};
use crate::tree::{SourceFile, VarKind};

use super::{AccessLevel, Builder, ModulePlan, Operation};

/// Exported permission table and the union of generated operations.
///
/// ```text
/// export type UserOperation = "list" | "get";
///
/// export const userPermissions = {
///   list: { access: "public", roles: [] },
///   ...
/// } as const;
/// ```
pub struct PermissionTableBuilder<'p> {
    plan: &'p ModulePlan<'p>,
}

impl<'p> PermissionTableBuilder<'p> {
    pub fn new(plan: &'p ModulePlan<'p>) -> Self {
        Self { plan }
    }

    fn table(&self) -> String {
        let mut text = String::from("{\n");
        for op in Operation::ALL {
            let rule = self.plan.permissions.rule(op);
            let roles = match rule.level {
                AccessLevel::Roles => rule
                    .roles
                    .iter()
                    .map(|r| format!("{:?}", r))
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => String::new(),
            };
            text.push_str(&format!(
                "  {}: {{ access: \"{}\", roles: [{}] }},\n",
                op.as_str(),
                rule.level.as_str(),
                roles
            ));
        }
        text.push_str("} as const");
        text
    }
}

impl Builder for PermissionTableBuilder<'_> {
    fn name(&self) -> &'static str {
        "PermissionTableBuilder"
    }

    fn artifact(&self) -> String {
        format!("permissions:{}", self.plan.names.snake)
    }

    fn target(&self) -> PathBuf {
        self.plan.permissions_file()
    }

    fn schema(&self, _existing: Option<&SourceFile>) -> Result<FileDefinition, GraftError> {
        let names = &self.plan.names;
        let mut def = FileDefinition::default();

        let allowed = self.plan.permissions.allowed();
        let union = if allowed.is_empty() {
            "never".to_string()
        } else {
            allowed
                .iter()
                .map(|op| format!("\"{}\"", op.as_str()))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        def.type_aliases.push(TypeAliasSpec {
            name: format!("{}Operation", names.pascal),
            is_exported: true,
            type_parameters: None,
            type_text: union,
        });
        def.variables.push(VariableSpec {
            name: format!("{}Permissions", names.camel),
            kind: VarKind::Const,
            is_exported: true,
            type_annotation: None,
            value: VariableValue::Replace(self.table()),
        });

        Ok(def)
    }
}
