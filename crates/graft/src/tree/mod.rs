//! Mutable declaration tree for one TypeScript source file.
//!
//! The tree models the declarations the reconciler needs to address by name
//! (imports, re-exports, variables, type aliases, interfaces, classes and
//! functions, plus class members). Everything else is kept as verbatim text so
//! that loading a file and rendering it again never loses content.
//!
//! ```text
//! source text ──parse──▶ SourceFile ──primitives──▶ SourceFile ──render──▶ text
//! ```

mod block;
mod container;
mod marker;
pub mod parse;
mod render;

pub use block::Block;
pub use container::{DeclKey, DeclKind, Declaration, MemberSlot, NodeContainer};
pub use marker::{GeneratedMarker, MARKER_PREFIX};
pub use parse::SourceParser;

use std::path::PathBuf;

/// Comments, decorators and the generated marker attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trivia {
    /// Comments directly above the declaration, in source order.
    pub leading: Vec<String>,
    /// Generator ownership marker, if the declaration was generated.
    pub marker: Option<GeneratedMarker>,
    /// Decorators, rendered between the marker and the declaration.
    pub decorators: Vec<String>,
    /// A comment on the same line as the end of the declaration.
    pub trailing: Option<String>,
}

impl Trivia {
    /// Trivia carrying only a generated marker.
    pub fn generated(marker: GeneratedMarker) -> Self {
        Self {
            marker: Some(marker),
            ..Self::default()
        }
    }
}

/// One parsed (or generated) source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub items: Vec<Item>,
}

impl SourceFile {
    /// Creates an empty file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
        }
    }

    /// Returns the class with the given name, if any.
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.items.iter().find_map(|item| match item {
            Item::Class(class) if class.name == name => Some(class),
            _ => None,
        })
    }

    /// Returns the function with the given name, if any.
    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.items.iter().find_map(|item| match item {
            Item::Function(function) if function.name == name => Some(function),
            _ => None,
        })
    }

    /// Returns the import statements for a module path.
    pub fn imports_from<'a>(&'a self, module_path: &'a str) -> impl Iterator<Item = &'a ImportDecl> + 'a {
        self.items.iter().filter_map(move |item| match item {
            Item::Import(import) if import.module_path == module_path => Some(import),
            _ => None,
        })
    }
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Import(ImportDecl),
    Export(ExportDecl),
    Variable(VariableDecl),
    TypeAlias(TypeAliasDecl),
    Interface(InterfaceDecl),
    Class(ClassDecl),
    Function(FunctionDecl),
    Verbatim(Verbatim),
}

impl Item {
    pub fn trivia(&self) -> &Trivia {
        match self {
            Item::Import(d) => &d.trivia,
            Item::Export(d) => &d.trivia,
            Item::Variable(d) => &d.trivia,
            Item::TypeAlias(d) => &d.trivia,
            Item::Interface(d) => &d.trivia,
            Item::Class(d) => &d.trivia,
            Item::Function(d) => &d.trivia,
            Item::Verbatim(d) => &d.trivia,
        }
    }

    pub fn trivia_mut(&mut self) -> &mut Trivia {
        match self {
            Item::Import(d) => &mut d.trivia,
            Item::Export(d) => &mut d.trivia,
            Item::Variable(d) => &mut d.trivia,
            Item::TypeAlias(d) => &mut d.trivia,
            Item::Interface(d) => &mut d.trivia,
            Item::Class(d) => &mut d.trivia,
            Item::Function(d) => &mut d.trivia,
            Item::Verbatim(d) => &mut d.trivia,
        }
    }
}

/// A single imported binding, `A`, `A as B` or `type A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBinding {
    pub name: String,
    pub alias: Option<String>,
    pub type_only: bool,
}

impl NamedBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            type_only: false,
        }
    }

    /// The local name this binding introduces.
    pub fn local(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// `import ... from "module"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub trivia: Trivia,
    pub module_path: String,
    pub type_only: bool,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<NamedBinding>,
}

impl ImportDecl {
    pub fn new(module_path: impl Into<String>) -> Self {
        Self {
            trivia: Trivia::default(),
            module_path: module_path.into(),
            type_only: false,
            default: None,
            namespace: None,
            named: Vec::new(),
        }
    }

    /// Whether the import binds the given local name.
    pub fn binds(&self, local: &str) -> bool {
        self.default.as_deref() == Some(local)
            || self.namespace.as_deref() == Some(local)
            || self.named.iter().any(|b| b.local() == local)
    }
}

/// `export { ... } from "module"` or `export * from "module"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDecl {
    pub trivia: Trivia,
    pub module_path: String,
    pub type_only: bool,
    pub namespace: Option<String>,
    pub named: Vec<NamedBinding>,
}

/// Variable declaration keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    #[default]
    Const,
    Let,
    Var,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Const => "const",
            VarKind::Let => "let",
            VarKind::Var => "var",
        }
    }
}

/// A single-binding variable statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    pub trivia: Trivia,
    pub exported: bool,
    pub kind: VarKind,
    pub name: String,
    pub type_annotation: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAliasDecl {
    pub trivia: Trivia,
    pub exported: bool,
    pub name: String,
    pub type_parameters: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub trivia: Trivia,
    pub exported: bool,
    pub name: String,
    pub type_parameters: Option<String>,
    pub extends: Vec<String>,
    pub body: Block,
}

/// Class member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub trivia: Trivia,
    pub exported: bool,
    pub is_abstract: bool,
    pub name: String,
    pub type_parameters: Option<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub members: Vec<ClassMember>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            trivia: Trivia::default(),
            exported: false,
            is_abstract: false,
            name: name.into(),
            type_parameters: None,
            extends: None,
            implements: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Returns the method with the given identity.
    pub fn method(&self, name: &str, is_static: bool) -> Option<&MethodDecl> {
        self.members.iter().find_map(|m| match m {
            ClassMember::Method(method) if method.name == name && method.is_static == is_static => Some(method),
            _ => None,
        })
    }

    /// Returns the property with the given identity.
    pub fn property(&self, name: &str, is_static: bool) -> Option<&PropertyDecl> {
        self.members.iter().find_map(|m| match m {
            ClassMember::Property(prop) if prop.name == name && prop.is_static == is_static => Some(prop),
            _ => None,
        })
    }
}

/// A class member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassMember {
    Method(MethodDecl),
    Accessor(AccessorDecl),
    Property(PropertyDecl),
    Verbatim(Verbatim),
}

impl ClassMember {
    pub fn trivia(&self) -> &Trivia {
        match self {
            ClassMember::Method(m) => &m.trivia,
            ClassMember::Accessor(m) => &m.trivia,
            ClassMember::Property(m) => &m.trivia,
            ClassMember::Verbatim(m) => &m.trivia,
        }
    }

    pub fn trivia_mut(&mut self) -> &mut Trivia {
        match self {
            ClassMember::Method(m) => &mut m.trivia,
            ClassMember::Accessor(m) => &mut m.trivia,
            ClassMember::Property(m) => &mut m.trivia,
            ClassMember::Verbatim(m) => &mut m.trivia,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub trivia: Trivia,
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_override: bool,
    pub is_async: bool,
    pub name: String,
    pub type_parameters: Option<String>,
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
    pub body: Block,
}

/// Accessor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessorKind {
    Get,
    Set,
}

impl AccessorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessorKind::Get => "get",
            AccessorKind::Set => "set",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorDecl {
    pub trivia: Trivia,
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub kind: AccessorKind,
    pub name: String,
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub trivia: Trivia,
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_readonly: bool,
    pub name: String,
    pub optional: bool,
    pub type_annotation: Option<String>,
    pub initializer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub trivia: Trivia,
    pub exported: bool,
    pub is_async: bool,
    pub name: String,
    pub type_parameters: Option<String>,
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
    pub body: Block,
}

/// Source text the tree does not model, kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verbatim {
    pub trivia: Trivia,
    pub text: String,
}

impl Verbatim {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            trivia: Trivia::default(),
            text: text.into(),
        }
    }
}
