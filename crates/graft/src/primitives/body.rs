//! Body replacement rules shared by methods, accessors and functions.

use crate::diagnostic::ReconcileWarning;
use crate::schema::MethodBody;
use crate::tree::{Block, GeneratedMarker};

use super::{render_statements, EnsureContext};

/// Body for a declaration being created.
pub(crate) fn initial_body(desired: &MethodBody, depth: usize) -> Block {
    match desired {
        MethodBody::Statements(statements) => Block::from_lines(&render_statements(statements), depth),
        MethodBody::PreserveExisting => Block::empty(),
    }
}

/// Marker for a declaration being created, recording the stub fingerprint.
pub(crate) fn created_marker(ctx: &EnsureContext, body: &Block, is_stub: bool) -> GeneratedMarker {
    let marker = GeneratedMarker::new(ctx.artifact());
    if is_stub {
        marker.with_stub(body.fingerprint())
    } else {
        marker
    }
}

/// Applies the desired body to an existing declaration.
///
/// The generated body replaces the existing one only when `overwrite` is set,
/// the existing body is empty, or it still matches the stub fingerprint the
/// marker recorded. Anything else is a hand edit and is kept.
#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_body(
    existing: &mut Block,
    marker: Option<&mut GeneratedMarker>,
    desired: &MethodBody,
    overwrite: bool,
    is_stub: bool,
    depth: usize,
    member: &str,
    ctx: &mut EnsureContext,
) {
    let MethodBody::Statements(statements) = desired else {
        return;
    };
    let generated = Block::from_lines(&render_statements(statements), depth);

    if existing.fingerprint() == generated.fingerprint() {
        return;
    }

    let recorded_stub = marker.as_ref().and_then(|m| m.stub);
    let replace = overwrite || existing.is_empty() || recorded_stub == Some(existing.fingerprint());

    if replace {
        *existing = generated;
        if let Some(marker) = marker {
            marker.stub = is_stub.then(|| existing.fingerprint());
        }
        return;
    }

    ctx.preserved.push(member.to_string());
    if recorded_stub.is_none() && existing.looks_like_placeholder() {
        tracing::warn!(member, file = %ctx.file().display(), "placeholder-like body kept without a stub snapshot");
        ctx.warnings.push(ReconcileWarning::StubAmbiguity {
            member: member.to_string(),
            file: ctx.file().to_path_buf(),
        });
    }
}
