//! Declarative description of what a generated file must contain.
//!
//! A [`FileDefinition`] is plain data. Builders produce one per target file and
//! the reconciler makes the file's tree match it. Every type here deserializes
//! from camelCase JSON so a definition can also be applied from disk
//! (`graft apply`).

mod validate;

pub use validate::validate;

use serde::{Deserialize, Serialize};

use crate::tree::{AccessorKind, VarKind, Visibility};

/// Everything one file must contain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileDefinition {
    pub imports: Vec<ImportSpec>,
    pub exports: Vec<ExportSpec>,
    pub variables: Vec<VariableSpec>,
    pub type_aliases: Vec<TypeAliasSpec>,
    pub interfaces: Vec<InterfaceSpec>,
    pub classes: Vec<ClassSpec>,
    pub functions: Vec<FunctionSpec>,
    pub free_statements: Vec<StatementSpec>,
}

impl FileDefinition {
    /// Adds named symbols from `module_path`, merging with an existing entry.
    pub fn import(&mut self, module_path: &str, symbols: &[&str]) {
        self.push_import(module_path, symbols, false);
    }

    /// Adds type-only symbols from `module_path`.
    pub fn import_types(&mut self, module_path: &str, symbols: &[&str]) {
        self.push_import(module_path, symbols, true);
    }

    fn push_import(&mut self, module_path: &str, symbols: &[&str], is_type_only: bool) {
        let existing = self
            .imports
            .iter_mut()
            .find(|i| i.module_path == module_path && i.is_type_only == is_type_only && i.default_symbol.is_none());

        match existing {
            Some(spec) => {
                for symbol in symbols {
                    if !spec.named_symbols.iter().any(|s| s == symbol) {
                        spec.named_symbols.push(symbol.to_string());
                    }
                }
            }
            None => self.imports.push(ImportSpec {
                module_path: module_path.to_string(),
                named_symbols: symbols.iter().map(|s| s.to_string()).collect(),
                default_symbol: None,
                is_type_only,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSpec {
    pub module_path: String,
    pub named_symbols: Vec<String>,
    pub default_symbol: Option<String>,
    pub is_type_only: bool,
}

/// A re-export. Empty `named_symbols` means `export * from`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSpec {
    pub module_path: String,
    pub named_symbols: Vec<String>,
    pub is_type_only: bool,
}

/// How a variable's initializer is decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableValue {
    /// Always write this initializer.
    Replace(String),
    /// Keep the existing initializer; use this text only when creating.
    PreserveExisting(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSpec {
    pub name: String,
    #[serde(default)]
    pub kind: VarKind,
    #[serde(default)]
    pub is_exported: bool,
    #[serde(default)]
    pub type_annotation: Option<String>,
    pub value: VariableValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasSpec {
    pub name: String,
    #[serde(default)]
    pub is_exported: bool,
    #[serde(default)]
    pub type_parameters: Option<String>,
    pub type_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceSpec {
    pub name: String,
    #[serde(default)]
    pub is_exported: bool,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub properties: Vec<InterfacePropertySpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfacePropertySpec {
    pub name: String,
    pub type_text: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub readonly: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassSpec {
    pub name: String,
    pub is_exported: bool,
    pub is_abstract: bool,
    pub extends_class: Option<String>,
    pub implements: Vec<String>,
    pub properties: Vec<PropertySpec>,
    pub accessors: Vec<AccessorSpec>,
    pub methods: Vec<MethodSpec>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_exported: true,
            ..Self::default()
        }
    }
}

/// Body of a method, accessor or function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodBody {
    Statements(Vec<StatementSpec>),
    /// Keep whatever body exists; create an empty one otherwise.
    PreserveExisting,
}

impl Default for MethodBody {
    fn default() -> Self {
        MethodBody::Statements(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MethodSpec {
    pub name: String,
    pub is_static: bool,
    pub is_async: bool,
    pub visibility: Option<Visibility>,
    pub parameters: Vec<ParamSpec>,
    pub return_type: Option<String>,
    pub body: MethodBody,
    pub overwrite_body: bool,
    pub is_stub: bool,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessorSpec {
    pub name: String,
    pub kind: AccessorKind,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub parameters: Vec<ParamSpec>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub body: MethodBody,
    #[serde(default)]
    pub overwrite_body: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertySpec {
    pub name: String,
    pub is_static: bool,
    pub is_readonly: bool,
    pub visibility: Option<Visibility>,
    pub optional: bool,
    pub type_annotation: Option<String>,
    pub initializer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionSpec {
    pub name: String,
    pub is_exported: bool,
    pub is_async: bool,
    pub parameters: Vec<ParamSpec>,
    pub return_type: Option<String>,
    pub body: MethodBody,
    pub overwrite_body: bool,
    pub is_stub: bool,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_exported: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamSpec {
    pub name: String,
    pub type_annotation: Option<String>,
    pub optional: bool,
    pub default_value: Option<String>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, type_annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_annotation: Some(type_annotation.into()),
            ..Self::default()
        }
    }

    /// Source text of the parameter, e.g. `limit?: number`.
    pub fn render(&self) -> String {
        let mut text = self.name.clone();
        if self.optional {
            text.push('?');
        }
        if let Some(ty) = &self.type_annotation {
            text.push_str(": ");
            text.push_str(ty);
        }
        if let Some(default) = &self.default_value {
            text.push_str(" = ");
            text.push_str(default);
        }
        text
    }
}

/// A statement inside a generated body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StatementSpec {
    #[serde(rename_all = "camelCase")]
    VariableDeclaration {
        #[serde(default, rename = "declarationKind")]
        var_kind: VarKind,
        name: String,
        #[serde(default)]
        type_annotation: Option<String>,
        value: String,
    },
    Return {
        #[serde(default)]
        value: Option<String>,
    },
    If {
        condition: String,
        #[serde(default)]
        then: Vec<StatementSpec>,
        #[serde(default, rename = "else")]
        otherwise: Vec<StatementSpec>,
    },
    Raw {
        text: String,
    },
    Expression {
        text: String,
    },
    Throw {
        value: String,
    },
}

impl StatementSpec {
    pub fn raw(text: impl Into<String>) -> Self {
        StatementSpec::Raw { text: text.into() }
    }

    pub fn expr(text: impl Into<String>) -> Self {
        StatementSpec::Expression { text: text.into() }
    }

    pub fn ret(value: impl Into<String>) -> Self {
        StatementSpec::Return {
            value: Some(value.into()),
        }
    }

    pub fn throw(value: impl Into<String>) -> Self {
        StatementSpec::Throw { value: value.into() }
    }

    pub fn const_(name: impl Into<String>, value: impl Into<String>) -> Self {
        StatementSpec::VariableDeclaration {
            var_kind: VarKind::Const,
            name: name.into(),
            type_annotation: None,
            value: value.into(),
        }
    }

    pub fn if_(condition: impl Into<String>, then: Vec<StatementSpec>) -> Self {
        StatementSpec::If {
            condition: condition.into(),
            then,
            otherwise: Vec::new(),
        }
    }
}
