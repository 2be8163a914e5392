//! Builder selection by artifact id.

use std::fmt;

use crate::diagnostic::GraftError;

/// Selects which builders run.
pub enum Matcher {
    /// Exact artifact id, e.g. `service:user`.
    Literal(String),
    /// Glob over artifact ids, e.g. `service:*` or `*:user`.
    Glob(glob::Pattern),
    Predicate(Box<dyn Fn(&str) -> bool>),
}

impl Matcher {
    /// Parses a pattern; text without glob metacharacters matches literally.
    pub fn parse(pattern: &str) -> Result<Self, GraftError> {
        if pattern.contains(['*', '?', '[']) {
            Self::glob(pattern)
        } else {
            Ok(Matcher::Literal(pattern.to_string()))
        }
    }

    pub fn glob(pattern: &str) -> Result<Self, GraftError> {
        glob::Pattern::new(pattern)
            .map(Matcher::Glob)
            .map_err(|e| GraftError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.msg.to_string(),
            })
    }

    pub fn predicate(f: impl Fn(&str) -> bool + 'static) -> Self {
        Matcher::Predicate(Box::new(f))
    }

    pub fn matches(&self, artifact: &str) -> bool {
        match self {
            Matcher::Literal(id) => id == artifact,
            Matcher::Glob(pattern) => pattern.matches(artifact),
            Matcher::Predicate(f) => f(artifact),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Literal(id) => f.debug_tuple("Literal").field(id).finish(),
            Matcher::Glob(pattern) => f.debug_tuple("Glob").field(&pattern.as_str()).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_matches_exactly() {
        let matcher = Matcher::parse("service:user").unwrap();
        assert!(matches!(matcher, Matcher::Literal(_)));
        assert!(matcher.matches("service:user"));
        assert!(!matcher.matches("service:user_role"));
    }

    #[test]
    fn test_glob() {
        let matcher = Matcher::parse("*:user").unwrap();
        assert!(matcher.matches("route:user"));
        assert!(!matcher.matches("route:post"));
    }

    #[test]
    fn test_invalid_glob() {
        let err = Matcher::parse("service:[").unwrap_err();
        assert!(matches!(err, GraftError::InvalidPattern { .. }));
    }

    #[test]
    fn test_predicate() {
        let matcher = Matcher::predicate(|id| id.starts_with("client:"));
        assert!(matcher.matches("client:user"));
        assert!(!matcher.matches("types:user"));
    }
}
