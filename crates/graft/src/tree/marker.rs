//! Generated-region markers.
//!
//! Every declaration the generator creates is preceded by a line comment:
//!
//! ```text
//! // @graft-generated service:user
//! // @graft-generated service:user stub=9f86d081884c7d65
//! ```
//!
//! The artifact id scopes the sweep step: only declarations carrying the
//! artifact's marker may be removed. The optional `stub` field is the
//! fingerprint of the placeholder body written last, which is how an untouched
//! stub is told apart from a body someone has edited. The format is stable
//! across runs; changing it would make every existing file look hand-written.

use std::fmt;

/// Comment prefix identifying a marker line.
pub const MARKER_PREFIX: &str = "// @graft-generated ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMarker {
    pub artifact: String,
    pub stub: Option<u64>,
}

impl GeneratedMarker {
    pub fn new(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            stub: None,
        }
    }

    pub fn with_stub(mut self, fingerprint: u64) -> Self {
        self.stub = Some(fingerprint);
        self
    }

    /// Parses a comment; returns `None` if it is not a marker.
    pub fn parse(comment: &str) -> Option<Self> {
        let rest = comment.trim_end().strip_prefix(MARKER_PREFIX)?;
        let mut parts = rest.split_whitespace();
        let artifact = parts.next()?.to_string();

        let mut stub = None;
        for part in parts {
            match part.strip_prefix("stub=") {
                Some(hex) => stub = Some(u64::from_str_radix(hex, 16).ok()?),
                None => return None,
            }
        }

        Some(Self { artifact, stub })
    }

    pub fn belongs_to(&self, artifact: &str) -> bool {
        self.artifact == artifact
    }
}

impl fmt::Display for GeneratedMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MARKER_PREFIX, self.artifact)?;
        if let Some(stub) = self.stub {
            write!(f, " stub={:016x}", stub)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_roundtrip() {
        let marker = GeneratedMarker::new("service:user").with_stub(0xabc);
        let text = marker.to_string();
        assert_eq!(text, "// @graft-generated service:user stub=0000000000000abc");
        assert_eq!(GeneratedMarker::parse(&text), Some(marker));
    }

    #[test]
    fn test_plain_comments_are_not_markers() {
        assert_eq!(GeneratedMarker::parse("// just a note"), None);
        assert_eq!(GeneratedMarker::parse("// @graft-generated"), None);
        assert_eq!(GeneratedMarker::parse("// @graft-generated a stub=zz"), None);
        assert_eq!(GeneratedMarker::parse("// @graft-generated a extra"), None);
    }
}
