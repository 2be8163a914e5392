//! Canonical printer for the declaration tree.
//!
//! Layout rules: consecutive imports (and consecutive re-exports) are kept
//! together, every other pair of top-level items is separated by one blank line,
//! consecutive class properties are kept together and all other class members
//! are separated by a blank line. Text the tree holds verbatim (bodies,
//! initializers, unmodeled statements) is emitted untouched.

use super::{
    AccessorDecl, ClassDecl, ClassMember, ExportDecl, FunctionDecl, ImportDecl, InterfaceDecl,
    Item, MethodDecl, NamedBinding, PropertyDecl, SourceFile, Trivia, TypeAliasDecl, VariableDecl,
};

pub(crate) fn render_file(file: &SourceFile) -> String {
    let mut out = String::new();
    let mut previous: Option<&Item> = None;

    for item in &file.items {
        if let Some(prev) = previous {
            out.push('\n');
            let grouped = matches!(
                (prev, item),
                (Item::Import(_), Item::Import(_)) | (Item::Export(_), Item::Export(_))
            );
            if !grouped {
                out.push('\n');
            }
        }
        write_with_trivia(item.trivia(), 0, &item_text(item, 0), &mut out);
        previous = Some(item);
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

impl Item {
    /// Renders the declaration alone, without comments or marker.
    pub fn render_bare(&self) -> String {
        item_text(self, 0)
    }
}

fn write_with_trivia(trivia: &Trivia, depth: usize, text: &str, out: &mut String) {
    let pad = " ".repeat(depth);
    for comment in &trivia.leading {
        out.push_str(&pad);
        out.push_str(comment);
        out.push('\n');
    }
    if let Some(marker) = &trivia.marker {
        out.push_str(&pad);
        out.push_str(&marker.to_string());
        out.push('\n');
    }
    for decorator in &trivia.decorators {
        out.push_str(&pad);
        out.push_str(decorator);
        out.push('\n');
    }
    out.push_str(&pad);
    out.push_str(text);
    if let Some(trailing) = &trivia.trailing {
        out.push(' ');
        out.push_str(trailing);
    }
}

fn item_text(item: &Item, depth: usize) -> String {
    match item {
        Item::Import(d) => import_text(d),
        Item::Export(d) => export_text(d),
        Item::Variable(d) => variable_text(d),
        Item::TypeAlias(d) => type_alias_text(d),
        Item::Interface(d) => interface_text(d),
        Item::Class(d) => render_class(d, depth),
        Item::Function(d) => function_text(d),
        Item::Verbatim(d) => d.text.clone(),
    }
}

fn export_prefix(exported: bool) -> &'static str {
    if exported {
        "export "
    } else {
        ""
    }
}

fn binding_text(binding: &NamedBinding) -> String {
    let mut text = String::new();
    if binding.type_only {
        text.push_str("type ");
    }
    text.push_str(&binding.name);
    if let Some(alias) = &binding.alias {
        text.push_str(" as ");
        text.push_str(alias);
    }
    text
}

fn named_list(bindings: &[NamedBinding]) -> String {
    let names: Vec<String> = bindings.iter().map(binding_text).collect();
    format!("{{ {} }}", names.join(", "))
}

fn import_text(import: &ImportDecl) -> String {
    let mut clause = Vec::new();
    if let Some(default) = &import.default {
        clause.push(default.clone());
    }
    if let Some(namespace) = &import.namespace {
        clause.push(format!("* as {}", namespace));
    }
    if !import.named.is_empty() {
        clause.push(named_list(&import.named));
    }

    if clause.is_empty() {
        return format!("import \"{}\";", import.module_path);
    }

    let keyword = if import.type_only { "import type" } else { "import" };
    format!("{} {} from \"{}\";", keyword, clause.join(", "), import.module_path)
}

fn export_text(export: &ExportDecl) -> String {
    let keyword = if export.type_only { "export type" } else { "export" };
    let clause = match (&export.namespace, export.named.is_empty()) {
        (Some(namespace), _) => format!("* as {}", namespace),
        (None, true) => "*".to_string(),
        (None, false) => named_list(&export.named),
    };
    format!("{} {} from \"{}\";", keyword, clause, export.module_path)
}

fn variable_text(var: &VariableDecl) -> String {
    let mut text = format!("{}{} {}", export_prefix(var.exported), var.kind.as_str(), var.name);
    if let Some(ty) = &var.type_annotation {
        text.push_str(": ");
        text.push_str(ty);
    }
    if let Some(value) = &var.value {
        text.push_str(" = ");
        text.push_str(value);
    }
    text.push(';');
    text
}

fn type_alias_text(alias: &TypeAliasDecl) -> String {
    format!(
        "{}type {}{} = {};",
        export_prefix(alias.exported),
        alias.name,
        alias.type_parameters.as_deref().unwrap_or(""),
        alias.value
    )
}

fn interface_text(interface: &InterfaceDecl) -> String {
    let mut text = format!(
        "{}interface {}{}",
        export_prefix(interface.exported),
        interface.name,
        interface.type_parameters.as_deref().unwrap_or("")
    );
    if !interface.extends.is_empty() {
        text.push_str(" extends ");
        text.push_str(&interface.extends.join(", "));
    }
    text.push_str(" {");
    text.push_str(&interface.body.inner);
    text.push('}');
    text
}

pub(crate) fn render_class(class: &ClassDecl, depth: usize) -> String {
    let mut text = format!(
        "{}{}class {}{}",
        export_prefix(class.exported),
        if class.is_abstract { "abstract " } else { "" },
        class.name,
        class.type_parameters.as_deref().unwrap_or("")
    );
    if let Some(base) = &class.extends {
        text.push_str(" extends ");
        text.push_str(base);
    }
    if !class.implements.is_empty() {
        text.push_str(" implements ");
        text.push_str(&class.implements.join(", "));
    }

    if class.members.is_empty() {
        text.push_str(" {}");
        return text;
    }

    text.push_str(" {\n");
    let member_depth = depth + 2;
    let mut previous: Option<&ClassMember> = None;
    for member in &class.members {
        if let Some(prev) = previous {
            text.push('\n');
            if !matches!((prev, member), (ClassMember::Property(_), ClassMember::Property(_))) {
                text.push('\n');
            }
        }
        write_with_trivia(member.trivia(), member_depth, &member_text(member), &mut text);
        previous = Some(member);
    }
    text.push('\n');
    text.push_str(&" ".repeat(depth));
    text.push('}');
    text
}

fn member_text(member: &ClassMember) -> String {
    match member {
        ClassMember::Method(m) => method_text(m),
        ClassMember::Accessor(a) => accessor_text(a),
        ClassMember::Property(p) => property_text(p),
        ClassMember::Verbatim(v) => v.text.clone(),
    }
}

fn signature_tail(parameters: &[String], return_type: Option<&str>) -> String {
    let mut text = format!("({})", parameters.join(", "));
    if let Some(ret) = return_type {
        text.push_str(": ");
        text.push_str(ret);
    }
    text
}

fn method_text(method: &MethodDecl) -> String {
    let mut text = String::new();
    if let Some(vis) = method.visibility {
        text.push_str(vis.as_str());
        text.push(' ');
    }
    if method.is_static {
        text.push_str("static ");
    }
    if method.is_override {
        text.push_str("override ");
    }
    if method.is_async {
        text.push_str("async ");
    }
    text.push_str(&method.name);
    text.push_str(method.type_parameters.as_deref().unwrap_or(""));
    text.push_str(&signature_tail(&method.parameters, method.return_type.as_deref()));
    text.push_str(" {");
    text.push_str(&method.body.inner);
    text.push('}');
    text
}

fn accessor_text(accessor: &AccessorDecl) -> String {
    let mut text = String::new();
    if let Some(vis) = accessor.visibility {
        text.push_str(vis.as_str());
        text.push(' ');
    }
    if accessor.is_static {
        text.push_str("static ");
    }
    text.push_str(accessor.kind.as_str());
    text.push(' ');
    text.push_str(&accessor.name);
    text.push_str(&signature_tail(&accessor.parameters, accessor.return_type.as_deref()));
    text.push_str(" {");
    text.push_str(&accessor.body.inner);
    text.push('}');
    text
}

fn property_text(prop: &PropertyDecl) -> String {
    let mut text = String::new();
    if let Some(vis) = prop.visibility {
        text.push_str(vis.as_str());
        text.push(' ');
    }
    if prop.is_static {
        text.push_str("static ");
    }
    if prop.is_readonly {
        text.push_str("readonly ");
    }
    text.push_str(&prop.name);
    if prop.optional {
        text.push('?');
    }
    if let Some(ty) = &prop.type_annotation {
        text.push_str(": ");
        text.push_str(ty);
    }
    if let Some(init) = &prop.initializer {
        text.push_str(" = ");
        text.push_str(init);
    }
    text.push(';');
    text
}

fn function_text(function: &FunctionDecl) -> String {
    let mut text = String::from(export_prefix(function.exported));
    if function.is_async {
        text.push_str("async ");
    }
    text.push_str("function ");
    text.push_str(&function.name);
    text.push_str(function.type_parameters.as_deref().unwrap_or(""));
    text.push_str(&signature_tail(&function.parameters, function.return_type.as_deref()));
    text.push_str(" {");
    text.push_str(&function.body.inner);
    text.push('}');
    text
}
