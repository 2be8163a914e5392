//! Loads TypeScript source into the declaration tree using tree-sitter.

use std::path::Path;
use tree_sitter::{Node, Parser};

use crate::diagnostic::GraftError;

use super::{
    AccessorDecl, AccessorKind, Block, ClassDecl, ClassMember, ExportDecl, FunctionDecl,
    GeneratedMarker, ImportDecl, InterfaceDecl, Item, MethodDecl, NamedBinding, PropertyDecl,
    SourceFile, Trivia, TypeAliasDecl, VarKind, VariableDecl, Verbatim, Visibility,
};

/// Parser for `.ts` and `.tsx` files.
pub struct SourceParser {
    typescript: Parser,
    tsx: Parser,
}

impl SourceParser {
    /// Creates a new parser with both grammars loaded.
    pub fn new() -> Result<Self, GraftError> {
        let mut typescript = Parser::new();
        typescript
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|_| GraftError::ParserInitFailed)?;

        let mut tsx = Parser::new();
        tsx.set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
            .map_err(|_| GraftError::ParserInitFailed)?;

        Ok(Self { typescript, tsx })
    }

    /// Parses a source file. The grammar is picked from the file extension.
    ///
    /// Files that do not parse cleanly are rejected with a `SyntaxError`
    /// pointing at the first error; they are never reconciled.
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<SourceFile, GraftError> {
        let is_tsx = path.extension().is_some_and(|ext| ext == "tsx");
        let parser = if is_tsx { &mut self.tsx } else { &mut self.typescript };

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| GraftError::ParseFailed { path: path.to_path_buf() })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(root, source, path));
        }

        let mut loader = Loader::new(source);
        loader.visit_program(root);

        Ok(SourceFile {
            path: path.to_path_buf(),
            items: loader.items,
        })
    }
}

fn syntax_error(root: Node, source: &str, path: &Path) -> GraftError {
    let culprit = first_error(root).unwrap_or(root);
    let position = culprit.start_position();

    let message = if culprit.is_missing() {
        format!("missing `{}`", culprit.kind())
    } else {
        let text = culprit.utf8_text(source.as_bytes()).unwrap_or("");
        let snippet: String = text.chars().take(40).collect();
        format!("unexpected `{}`", snippet.trim())
    };

    GraftError::SyntaxError {
        message,
        file: path.to_path_buf(),
        line: position.row + 1,
        column: position.column + 1,
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

/// Comments waiting to be attached to the next declaration.
#[derive(Default)]
struct Pending {
    comments: Vec<String>,
    decorators: Vec<String>,
}

impl Pending {
    fn take_trivia(&mut self) -> Trivia {
        let mut leading = std::mem::take(&mut self.comments);
        let marker_at = leading
            .iter()
            .rposition(|c| GeneratedMarker::parse(c).is_some());
        let marker = marker_at.and_then(|i| GeneratedMarker::parse(&leading.remove(i)));

        Trivia {
            leading,
            marker,
            decorators: std::mem::take(&mut self.decorators),
            trailing: None,
        }
    }
}

/// Tree-sitter visitor building `Item`s and `ClassMember`s.
struct Loader<'a> {
    source: &'a str,
    items: Vec<Item>,
}

impl<'a> Loader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            items: Vec::new(),
        }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|n| self.node_text(n).to_string())
    }

    fn has_token(&self, node: Node, token: &str) -> bool {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).any(|c| c.kind() == token);
        found
    }

    fn decorators(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .map(|c| self.node_text(c).to_string())
            .collect()
    }

    fn visit_program(&mut self, node: Node) {
        let mut pending = Pending::default();
        let mut last_end_row: Option<usize> = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "comment" {
                let text = self.node_text(child).to_string();
                let same_row = last_end_row == Some(child.start_position().row);
                match self.items.last_mut() {
                    Some(prev) if same_row && pending.comments.is_empty() && prev.trivia().trailing.is_none() => {
                        prev.trivia_mut().trailing = Some(text);
                    }
                    _ => pending.comments.push(text),
                }
                continue;
            }

            let mut item = self.visit_statement(child);
            let mut trivia = pending.take_trivia();
            let own = std::mem::take(&mut item.trivia_mut().decorators);
            trivia.decorators.extend(own);
            *item.trivia_mut() = trivia;

            self.items.push(item);
            last_end_row = Some(child.end_position().row);
        }

        for comment in pending.comments {
            self.items.push(Item::Verbatim(Verbatim::new(comment)));
        }
    }

    fn verbatim(&self, node: Node) -> Item {
        Item::Verbatim(Verbatim::new(self.node_text(node)))
    }

    fn visit_statement(&self, node: Node) -> Item {
        let item = match node.kind() {
            "import_statement" => self.visit_import(node),
            "export_statement" => self.visit_export(node),
            _ => self.visit_declaration(node, false),
        };
        item.unwrap_or_else(|| self.verbatim(node))
    }

    fn visit_declaration(&self, node: Node, exported: bool) -> Option<Item> {
        match node.kind() {
            "lexical_declaration" | "variable_declaration" => {
                self.visit_variable(node, exported).map(Item::Variable)
            }
            "type_alias_declaration" => Some(Item::TypeAlias(TypeAliasDecl {
                trivia: Trivia::default(),
                exported,
                name: self.field_text(node, "name")?,
                type_parameters: self.field_text(node, "type_parameters"),
                value: self.field_text(node, "value")?,
            })),
            "interface_declaration" => self.visit_interface(node, exported).map(Item::Interface),
            "class_declaration" | "abstract_class_declaration" => {
                self.visit_class(node, exported).map(Item::Class)
            }
            "function_declaration" => self.visit_function(node, exported).map(Item::Function),
            _ => None,
        }
    }

    // =========================================================================
    // Imports and re-exports
    // =========================================================================

    fn visit_import(&self, node: Node) -> Option<Item> {
        let source = node.child_by_field_name("source")?;
        let mut import = ImportDecl::new(unquote(self.node_text(source)));
        import.type_only = self.has_token(node, "type");

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import_clause" => self.visit_import_clause(child, &mut import)?,
                "import_require_clause" => return None,
                _ => {}
            }
        }

        Some(Item::Import(import))
    }

    fn visit_import_clause(&self, node: Node, import: &mut ImportDecl) -> Option<()> {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "identifier" => import.default = Some(self.node_text(child).to_string()),
                "namespace_import" => {
                    let mut inner = child.walk();
                    let name = child
                        .named_children(&mut inner)
                        .find(|c| c.kind() == "identifier")?;
                    import.namespace = Some(self.node_text(name).to_string());
                }
                "named_imports" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        match spec.kind() {
                            "import_specifier" => import.named.push(self.visit_specifier(spec)?),
                            "comment" => {}
                            _ => return None,
                        }
                    }
                }
                "," => {}
                _ => return None,
            }
        }
        Some(())
    }

    fn visit_specifier(&self, node: Node) -> Option<NamedBinding> {
        Some(NamedBinding {
            name: self.field_text(node, "name")?,
            alias: self.field_text(node, "alias"),
            type_only: self.has_token(node, "type"),
        })
    }

    fn visit_export(&self, node: Node) -> Option<Item> {
        if self.has_token(node, "default") || self.has_token(node, "=") {
            return None;
        }

        if let Some(declaration) = node.child_by_field_name("declaration") {
            let mut item = self.visit_declaration(declaration, true)?;
            let mut decorators = self.decorators(node);
            decorators.extend(std::mem::take(&mut item.trivia_mut().decorators));
            item.trivia_mut().decorators = decorators;
            return Some(item);
        }

        let source = node.child_by_field_name("source")?;
        let mut export = ExportDecl {
            trivia: Trivia::default(),
            module_path: unquote(self.node_text(source)),
            type_only: self.has_token(node, "type"),
            namespace: None,
            named: Vec::new(),
        };

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "namespace_export" => {
                    let mut inner = child.walk();
                    let name = child.named_children(&mut inner).next()?;
                    export.namespace = Some(self.node_text(name).to_string());
                }
                "export_clause" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        match spec.kind() {
                            "export_specifier" => export.named.push(self.visit_specifier(spec)?),
                            "comment" => {}
                            _ => return None,
                        }
                    }
                    // `export {} from "x"` has no faithful rendering here.
                    if export.named.is_empty() {
                        return None;
                    }
                }
                _ => {}
            }
        }

        Some(Item::Export(export))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn visit_variable(&self, node: Node, exported: bool) -> Option<VariableDecl> {
        let kind = if node.kind() == "variable_declaration" {
            VarKind::Var
        } else {
            match self.field_text(node, "kind")?.as_str() {
                "const" => VarKind::Const,
                "let" => VarKind::Let,
                _ => return None,
            }
        };

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "variable_declarator")
            .collect();
        let [declarator] = declarators.as_slice() else {
            return None;
        };

        let name = declarator.child_by_field_name("name")?;
        if name.kind() != "identifier" {
            return None;
        }

        Some(VariableDecl {
            trivia: Trivia::default(),
            exported,
            kind,
            name: self.node_text(name).to_string(),
            type_annotation: declarator
                .child_by_field_name("type")
                .map(|t| annotation_text(self.node_text(t))),
            value: self.field_text(*declarator, "value"),
        })
    }

    fn visit_interface(&self, node: Node, exported: bool) -> Option<InterfaceDecl> {
        let mut extends = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "extends_type_clause" {
                let mut inner = child.walk();
                for ty in child.named_children(&mut inner) {
                    extends.push(self.node_text(ty).to_string());
                }
            }
        }

        let body = node.child_by_field_name("body")?;
        Some(InterfaceDecl {
            trivia: Trivia::default(),
            exported,
            name: self.field_text(node, "name")?,
            type_parameters: self.field_text(node, "type_parameters"),
            extends,
            body: braced(self.node_text(body))?,
        })
    }

    fn visit_function(&self, node: Node, exported: bool) -> Option<FunctionDecl> {
        let body = node.child_by_field_name("body")?;
        Some(FunctionDecl {
            trivia: Trivia::default(),
            exported,
            is_async: self.has_token(node, "async"),
            name: self.field_text(node, "name")?,
            type_parameters: self.field_text(node, "type_parameters"),
            parameters: self.parameters(node)?,
            return_type: node
                .child_by_field_name("return_type")
                .map(|t| annotation_text(self.node_text(t))),
            body: braced(self.node_text(body))?,
        })
    }

    fn parameters(&self, node: Node) -> Option<Vec<String>> {
        let params = node.child_by_field_name("parameters")?;
        let mut cursor = params.walk();
        let list = params
            .named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .map(|c| self.node_text(c).to_string())
            .collect();
        Some(list)
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn visit_class(&self, node: Node, exported: bool) -> Option<ClassDecl> {
        let mut class = ClassDecl::new(self.field_text(node, "name")?);
        class.exported = exported;
        class.is_abstract = node.kind() == "abstract_class_declaration";
        class.type_parameters = self.field_text(node, "type_parameters");
        class.trivia.decorators = self.decorators(node);

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "class_heritage" {
                continue;
            }
            let mut inner = child.walk();
            for clause in child.children(&mut inner) {
                match clause.kind() {
                    "extends_clause" => {
                        let text = self.node_text(clause);
                        class.extends = Some(text.trim_start_matches("extends").trim().to_string());
                    }
                    "implements_clause" => {
                        let mut types = clause.walk();
                        for ty in clause.named_children(&mut types) {
                            class.implements.push(self.node_text(ty).to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        let body = node.child_by_field_name("body")?;
        class.members = self.visit_class_body(body);
        Some(class)
    }

    fn visit_class_body(&self, node: Node) -> Vec<ClassMember> {
        let mut members: Vec<ClassMember> = Vec::new();
        let mut pending = Pending::default();
        let mut last_end_row: Option<usize> = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "{" | "}" => {}
                ";" => {
                    if let Some(ClassMember::Verbatim(v)) = members.last_mut() {
                        v.text.push(';');
                    }
                }
                "comment" => {
                    let text = self.node_text(child).to_string();
                    let same_row = last_end_row == Some(child.start_position().row);
                    match members.last_mut() {
                        Some(prev) if same_row && pending.comments.is_empty() && prev.trivia().trailing.is_none() => {
                            prev.trivia_mut().trailing = Some(text);
                        }
                        _ => pending.comments.push(text),
                    }
                }
                "decorator" => pending.decorators.push(self.node_text(child).to_string()),
                _ => {
                    let mut member = self
                        .visit_member(child)
                        .unwrap_or_else(|| ClassMember::Verbatim(Verbatim::new(self.node_text(child))));
                    let mut trivia = pending.take_trivia();
                    let own = std::mem::take(&mut member.trivia_mut().decorators);
                    trivia.decorators.extend(own);
                    *member.trivia_mut() = trivia;

                    members.push(member);
                    last_end_row = Some(child.end_position().row);
                }
            }
        }

        for comment in pending.comments {
            members.push(ClassMember::Verbatim(Verbatim::new(comment)));
        }
        members
    }

    fn visit_member(&self, node: Node) -> Option<ClassMember> {
        match node.kind() {
            "method_definition" => self.visit_method(node),
            "public_field_definition" => self.visit_property(node).map(ClassMember::Property),
            _ => None,
        }
    }

    fn member_name(&self, node: Node) -> Option<String> {
        let name = node.child_by_field_name("name")?;
        match name.kind() {
            "property_identifier" | "private_property_identifier" => Some(self.node_text(name).to_string()),
            _ => None,
        }
    }

    fn visit_method(&self, node: Node) -> Option<ClassMember> {
        let mut visibility = None;
        let mut is_static = false;
        let mut is_override = false;
        let mut is_async = false;
        let mut accessor = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "accessibility_modifier" => visibility = Visibility::from_keyword(self.node_text(child)),
                "static" => is_static = true,
                "override_modifier" => is_override = true,
                "async" => is_async = true,
                "get" => accessor = Some(AccessorKind::Get),
                "set" => accessor = Some(AccessorKind::Set),
                "*" | "?" | "!" => return None,
                _ => {}
            }
        }

        let name = self.member_name(node)?;
        let body = braced(self.node_text(node.child_by_field_name("body")?))?;
        let parameters = self.parameters(node)?;
        let return_type = node
            .child_by_field_name("return_type")
            .map(|t| annotation_text(self.node_text(t)));
        let mut trivia = Trivia::default();
        trivia.decorators = self.decorators(node);

        let member = match accessor {
            Some(kind) => {
                if is_override || is_async {
                    return None;
                }
                ClassMember::Accessor(AccessorDecl {
                    trivia,
                    visibility,
                    is_static,
                    kind,
                    name,
                    parameters,
                    return_type,
                    body,
                })
            }
            None => ClassMember::Method(MethodDecl {
                trivia,
                visibility,
                is_static,
                is_override,
                is_async,
                name,
                type_parameters: self.field_text(node, "type_parameters"),
                parameters,
                return_type,
                body,
            }),
        };
        Some(member)
    }

    fn visit_property(&self, node: Node) -> Option<PropertyDecl> {
        let mut prop = PropertyDecl {
            trivia: Trivia::default(),
            visibility: None,
            is_static: false,
            is_readonly: false,
            name: self.member_name(node)?,
            optional: false,
            type_annotation: node
                .child_by_field_name("type")
                .map(|t| annotation_text(self.node_text(t))),
            initializer: self.field_text(node, "value"),
        };
        prop.trivia.decorators = self.decorators(node);

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "accessibility_modifier" => prop.visibility = Visibility::from_keyword(self.node_text(child)),
                "static" => prop.is_static = true,
                "readonly" => prop.is_readonly = true,
                "?" => prop.optional = true,
                "declare" | "abstract" | "override_modifier" | "accessor" | "!" => return None,
                _ => {}
            }
        }

        Some(prop)
    }
}

/// Strips the quotes from a string literal node's text.
fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

/// Text of a `type_annotation` node without the leading colon.
fn annotation_text(text: &str) -> String {
    text.trim_start().trim_start_matches(':').trim().to_string()
}

/// Body text between the outer braces.
fn braced(text: &str) -> Option<Block> {
    let inner = text.strip_prefix('{')?.strip_suffix('}')?;
    Some(Block::from_inner(inner))
}
