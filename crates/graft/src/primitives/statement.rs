//! Statement rendering for generated bodies.

use crate::schema::StatementSpec;

const INDENT: &str = "  ";

/// Renders statements to lines, indented relative to the enclosing body.
pub fn render_statements(statements: &[StatementSpec]) -> Vec<String> {
    let mut lines = Vec::new();
    for statement in statements {
        render_into(statement, &mut lines);
    }
    lines
}

fn render_into(statement: &StatementSpec, lines: &mut Vec<String>) {
    match statement {
        StatementSpec::VariableDeclaration {
            var_kind,
            name,
            type_annotation,
            value,
        } => {
            let ty = type_annotation
                .as_ref()
                .map(|t| format!(": {}", t))
                .unwrap_or_default();
            push_multiline(lines, &format!("{} {}{} = {};", var_kind.as_str(), name, ty, value));
        }
        StatementSpec::Return { value: Some(value) } => {
            push_multiline(lines, &format!("return {};", value));
        }
        StatementSpec::Return { value: None } => lines.push("return;".to_string()),
        StatementSpec::Throw { value } => push_multiline(lines, &format!("throw {};", value)),
        StatementSpec::Expression { text } => push_multiline(lines, &terminated(text)),
        StatementSpec::Raw { text } => push_multiline(lines, text),
        StatementSpec::If {
            condition,
            then,
            otherwise,
        } => render_if(condition, then, otherwise, "if", lines),
    }
}

fn render_if(
    condition: &str,
    then: &[StatementSpec],
    otherwise: &[StatementSpec],
    keyword: &str,
    lines: &mut Vec<String>,
) {
    lines.push(format!("{} ({}) {{", keyword, condition));
    lines.extend(indented(then));

    match otherwise {
        [] => lines.push("}".to_string()),
        [StatementSpec::If {
            condition,
            then,
            otherwise,
        }] => render_if(condition, then, otherwise, "} else if", lines),
        _ => {
            lines.push("} else {".to_string());
            lines.extend(indented(otherwise));
            lines.push("}".to_string());
        }
    }
}

fn indented(statements: &[StatementSpec]) -> Vec<String> {
    render_statements(statements)
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                line
            } else {
                format!("{}{}", INDENT, line)
            }
        })
        .collect()
}

/// Adds a semicolon unless the expression already ends a statement.
fn terminated(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.ends_with(';') || trimmed.ends_with('}') {
        trimmed.to_string()
    } else {
        format!("{};", trimmed)
    }
}

fn push_multiline(lines: &mut Vec<String>, text: &str) {
    lines.extend(text.lines().map(|l| l.trim_end().to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_statements() {
        let lines = render_statements(&[
            StatementSpec::const_("user", "await db.user.find(id)"),
            StatementSpec::expr("log(user)"),
            StatementSpec::ret("user"),
        ]);
        assert_eq!(
            lines,
            vec!["const user = await db.user.find(id);", "log(user);", "return user;"]
        );
    }

    #[test]
    fn test_else_if_chain() {
        let statement = StatementSpec::If {
            condition: "!session".into(),
            then: vec![StatementSpec::ret("unauthorized()")],
            otherwise: vec![StatementSpec::If {
                condition: "!allowed".into(),
                then: vec![StatementSpec::ret("forbidden()")],
                otherwise: vec![StatementSpec::expr("audit()")],
            }],
        };

        assert_eq!(
            render_statements(&[statement]),
            vec![
                "if (!session) {",
                "  return unauthorized();",
                "} else if (!allowed) {",
                "  return forbidden();",
                "} else {",
                "  audit();",
                "}",
            ]
        );
    }

    #[test]
    fn test_raw_keeps_lines() {
        let lines = render_statements(&[StatementSpec::raw("return (\n  <div />\n);")]);
        assert_eq!(lines, vec!["return (", "  <div />", ");"]);
    }
}
