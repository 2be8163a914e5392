//! JSX element rendering for generated `.tsx` components.
//!
//! Generation only: elements are rendered to lines that a builder embeds in a
//! `return (...)` statement. Existing markup is never parsed back into
//! elements.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    /// Tag name; empty renders a fragment.
    pub tag: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub children: Vec<JsxChild>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value,
        });
        self
    }

    pub fn child(mut self, child: JsxChild) -> Self {
        self.children.push(child);
        self
    }

    pub fn element(self, element: ElementSpec) -> Self {
        self.child(JsxChild::Element(element))
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(JsxChild::Text(text.into()))
    }

    pub fn expression(self, expr: impl Into<String>) -> Self {
        self.child(JsxChild::Expression(expr.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeValue {
    /// `name="text"`
    Literal(String),
    /// `name={expr}`
    Expression(String),
    /// `name`
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JsxChild {
    Element(ElementSpec),
    Text(String),
    Expression(String),
}

/// Renders an element tree to lines with two-space nesting.
pub fn render_element(element: &ElementSpec) -> Vec<String> {
    let mut lines = Vec::new();
    render_into(element, 0, &mut lines);
    lines
}

fn open_tag(element: &ElementSpec) -> String {
    let mut tag = format!("<{}", element.tag);
    for attr in &element.attributes {
        tag.push(' ');
        tag.push_str(&attr.name);
        match &attr.value {
            AttributeValue::Literal(text) => tag.push_str(&format!("=\"{}\"", text)),
            AttributeValue::Expression(expr) => tag.push_str(&format!("={{{}}}", expr)),
            AttributeValue::Flag => {}
        }
    }
    tag
}

fn inline_child(child: &JsxChild) -> Option<String> {
    match child {
        JsxChild::Text(text) => Some(text.clone()),
        JsxChild::Expression(expr) => Some(format!("{{{}}}", expr)),
        JsxChild::Element(_) => None,
    }
}

fn render_into(element: &ElementSpec, depth: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(depth);
    let open = open_tag(element);
    let close = format!("</{}>", element.tag);

    if element.children.is_empty() {
        if element.tag.is_empty() {
            lines.push(format!("{}<></>", pad));
        } else {
            lines.push(format!("{}{} />", pad, open));
        }
        return;
    }

    if let [only] = element.children.as_slice() {
        if let Some(inline) = inline_child(only) {
            lines.push(format!("{}{}>{}{}", pad, open, inline, close));
            return;
        }
    }

    lines.push(format!("{}{}>", pad, open));
    for child in &element.children {
        match child {
            JsxChild::Element(nested) => render_into(nested, depth + 1, lines),
            other => {
                if let Some(inline) = inline_child(other) {
                    lines.push(format!("{}  {}", pad, inline));
                }
            }
        }
    }
    lines.push(format!("{}{}", pad, close));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested_elements() {
        let table = ElementSpec::new("section")
            .attr("className", AttributeValue::Literal("users".into()))
            .element(ElementSpec::new("h1").text("Users"))
            .element(ElementSpec::new("ul").expression("rows.map((row) => <li key={row.id}>{row.id}</li>)"))
            .element(ElementSpec::new("hr").attr("hidden", AttributeValue::Flag));

        assert_eq!(
            render_element(&table),
            vec![
                "<section className=\"users\">",
                "  <h1>Users</h1>",
                "  <ul>{rows.map((row) => <li key={row.id}>{row.id}</li>)}</ul>",
                "  <hr hidden />",
                "</section>",
            ]
        );
    }

    #[test]
    fn test_fragment() {
        let fragment = ElementSpec::new("")
            .element(ElementSpec::new("p").expression("count"));
        assert_eq!(render_element(&fragment), vec!["<>", "  <p>{count}</p>", "</>"]);
    }
}
