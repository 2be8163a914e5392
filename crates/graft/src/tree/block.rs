//! Brace-delimited bodies.

use xxhash_rust::xxh3::xxh3_64;

/// The text between the braces of a body, kept byte-for-byte.
///
/// Bodies read from disk are never re-indented, so a preserved body renders
/// exactly as the developer left it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub inner: String,
}

impl Block {
    /// `{}`
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps raw inner text (everything between `{` and `}`).
    pub fn from_inner(inner: impl Into<String>) -> Self {
        Self { inner: inner.into() }
    }

    /// Lays out body lines for a declaration that starts at column `depth`.
    ///
    /// Lines are indented one level deeper than the declaration and the closing
    /// brace lines up with it.
    pub fn from_lines<S: AsRef<str>>(lines: &[S], depth: usize) -> Self {
        if lines.is_empty() {
            return Self::empty();
        }

        let pad = " ".repeat(depth + 2);
        let mut inner = String::from("\n");
        for line in lines {
            let line = line.as_ref();
            if !line.is_empty() {
                inner.push_str(&pad);
                inner.push_str(line);
            }
            inner.push('\n');
        }
        inner.push_str(&" ".repeat(depth));

        Self { inner }
    }

    /// Whether the body contains nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.inner.trim().is_empty()
    }

    /// The body's statements with surrounding blank lines dropped and the common
    /// indentation removed.
    pub fn dedented_lines(&self) -> Vec<String> {
        let lines: Vec<&str> = self.inner.lines().collect();
        let start = lines.iter().position(|l| !l.trim().is_empty());
        let end = lines.iter().rposition(|l| !l.trim().is_empty());
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            _ => return Vec::new(),
        };

        let body = &lines[start..=end];
        let indent = body
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| leading_whitespace(l))
            .min()
            .unwrap_or(0);

        body.iter()
            .map(|l| {
                if l.trim().is_empty() {
                    String::new()
                } else {
                    l.chars().skip(indent).collect::<String>().trim_end().to_string()
                }
            })
            .collect()
    }

    /// Whitespace-insensitive content hash recorded in stub markers.
    ///
    /// Only line-level whitespace is ignored, so re-indentation by a formatter
    /// keeps the fingerprint while any token change breaks it.
    pub fn fingerprint(&self) -> u64 {
        let normalized = self
            .inner
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        xxh3_64(normalized.as_bytes())
    }

    /// Whether the body has the shape of a generator placeholder: a single
    /// `throw` or `return` statement, optionally preceded by line comments.
    pub fn looks_like_placeholder(&self) -> bool {
        let statements: Vec<&str> = self
            .inner
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("//"))
            .collect();

        match statements.as_slice() {
            [only] => {
                (only.starts_with("throw ") || only.starts_with("return")) && only.ends_with(';')
            }
            _ => false,
        }
    }
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lines_layout() {
        let block = Block::from_lines(&["return [];"], 2);
        assert_eq!(block.inner, "\n    return [];\n  ");

        let top = Block::from_lines(&["if (x) {", "  y();", "}"], 0);
        assert_eq!(top.inner, "\n  if (x) {\n    y();\n  }\n");
    }

    #[test]
    fn test_blank_lines_are_not_padded() {
        let block = Block::from_lines(&["a();", "", "b();"], 0);
        assert_eq!(block.inner, "\n  a();\n\n  b();\n");
    }

    #[test]
    fn test_fingerprint_ignores_indentation() {
        let a = Block::from_lines(&["throw new Error(\"todo\");"], 2);
        let b = Block::from_inner("\n        throw new Error(\"todo\");\n");
        assert_eq!(a.fingerprint(), b.fingerprint());

        let edited = Block::from_inner("\n    throw new Error(\"done\");\n  ");
        assert_ne!(a.fingerprint(), edited.fingerprint());
    }

    #[test]
    fn test_placeholder_shape() {
        assert!(Block::from_lines(&["throw new Error(\"x\");"], 0).looks_like_placeholder());
        assert!(Block::from_lines(&["// TODO", "return null;"], 0).looks_like_placeholder());
        assert!(!Block::from_lines(&["const a = 1;", "return a;"], 0).looks_like_placeholder());
        assert!(!Block::empty().looks_like_placeholder());
    }

    #[test]
    fn test_dedented_lines() {
        let block = Block::from_inner("\n    if (a) {\n      b();\n    }\n  ");
        assert_eq!(block.dedented_lines(), vec!["if (a) {", "  b();", "}"]);
        assert!(Block::empty().dedented_lines().is_empty());
    }
}
