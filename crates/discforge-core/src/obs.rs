//! Structured lifecycle events for dump sessions.
//!
//! All events carry an `event` field so they can be filtered in JSON logs,
//! e.g. `RUST_LOG=discforge_core=info`.

use tracing::{info, warn};

/// RAII guard entering the `discforge.session` span.
pub struct SessionSpan {
    _span: tracing::span::EnteredSpan,
}

impl SessionSpan {
    /// The span itself, for instrumenting futures that must stay `Send`.
    pub fn span(session_id: &str) -> tracing::Span {
        tracing::info_span!("discforge.session", session_id = %session_id)
    }

    pub fn enter(session_id: &str) -> Self {
        Self {
            _span: Self::span(session_id).entered(),
        }
    }
}

pub fn emit_session_started(session_id: &str, system: &str, media: &str) {
    info!(event = "session.started", session_id = %session_id, system = %system, media = %media);
}

pub fn emit_tool_finished(exit_code: i32, duration_ms: u64) {
    info!(event = "tool.finished", exit_code = exit_code, duration_ms = duration_ms);
}

pub fn emit_extraction_incomplete(base: &str, missing: &[String]) {
    warn!(event = "extraction.incomplete", base = %base, missing = ?missing);
}

pub fn emit_extraction_completed(base: &str, fields: usize, tracks: usize) {
    info!(event = "extraction.completed", base = %base, fields = fields, tracks = tracks);
}

pub fn emit_match_resolved(tracks_queried: usize, candidates: usize, unique_id: Option<u64>) {
    info!(
        event = "match.resolved",
        tracks_queried = tracks_queried,
        candidates = candidates,
        unique_id = ?unique_id,
    );
}

/// Catalog trouble never fails a session; it is logged and reported.
pub fn emit_match_warning(error: &dyn std::fmt::Display) {
    warn!(event = "match.warning", error = %error);
}

pub fn emit_submission_written(path: &std::path::Path) {
    info!(event = "submission.written", path = %path.display());
}
