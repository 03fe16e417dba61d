//! Most-recent-first session summary list, unique by session id.

use playground_types::SessionSummary;

/// Inserts `summary` at the head unless an entry with its id already exists.
///
/// Returns true when the list changed.
pub fn insert_optimistic(sessions: &mut Vec<SessionSummary>, summary: SessionSummary) -> bool {
    if contains(sessions, &summary.session_id) {
        return false;
    }
    sessions.insert(0, summary);
    true
}

/// Removes every entry with `session_id`. Returns true when the list changed.
pub fn remove(sessions: &mut Vec<SessionSummary>, session_id: &str) -> bool {
    let before = sessions.len();
    sessions.retain(|summary| summary.session_id != session_id);
    sessions.len() != before
}

#[must_use]
pub fn contains(sessions: &[SessionSummary], session_id: &str) -> bool {
    sessions
        .iter()
        .any(|summary| summary.session_id == session_id)
}
