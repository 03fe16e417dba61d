//! Merge-by-identity of observed tool invocations.
//!
//! Identity is the explicit `tool_call_id` when present, otherwise the
//! `tool_name-created_at` composite. The same rules serve streamed fragments
//! and reconstructed sessions.

use playground_types::ToolCall;

/// Merges `observed` into `existing`, returning the updated collection.
#[must_use]
pub fn reconcile(observed: ToolCall, mut existing: Vec<ToolCall>) -> Vec<ToolCall> {
    reconcile_into(&mut existing, observed);
    existing
}

/// Reconciles each observed call in order.
#[must_use]
pub fn reconcile_all(
    observed: impl IntoIterator<Item = ToolCall>,
    mut existing: Vec<ToolCall>,
) -> Vec<ToolCall> {
    for call in observed {
        reconcile_into(&mut existing, call);
    }
    existing
}

/// Index of the entry `observed` would merge into, if any.
#[must_use]
pub fn matching_position(existing: &[ToolCall], observed: &ToolCall) -> Option<usize> {
    existing
        .iter()
        .position(|current| same_invocation(current, observed))
}

/// In-place form of [`reconcile`]: updates the matching entry or appends.
pub fn reconcile_into(existing: &mut Vec<ToolCall>, observed: ToolCall) {
    match matching_position(existing, &observed) {
        Some(index) => merge_present_fields(&mut existing[index], observed),
        None => existing.push(observed),
    }
}

fn same_invocation(current: &ToolCall, observed: &ToolCall) -> bool {
    match (current.explicit_id(), observed.explicit_id()) {
        (Some(current_id), Some(observed_id)) => current_id == observed_id,
        (None, None) => {
            has_composite_identity(observed) && current.composite_id() == observed.composite_id()
        }
        _ => false,
    }
}

// A synthesized identity needs both a non-empty name and a timestamp.
fn has_composite_identity(call: &ToolCall) -> bool {
    call.tool_name.as_deref().is_some_and(|name| !name.is_empty()) && call.created_at.is_some()
}

fn merge_present_fields(target: &mut ToolCall, observed: ToolCall) {
    let ToolCall {
        role,
        content,
        tool_call_id,
        tool_name,
        tool_args,
        tool_call_error,
        metrics,
        created_at,
    } = observed;

    if role.is_some() {
        target.role = role;
    }
    if content.is_some() {
        target.content = content;
    }
    if tool_call_id.is_some() {
        target.tool_call_id = tool_call_id;
    }
    if tool_name.is_some() {
        target.tool_name = tool_name;
    }
    if tool_args.is_some() {
        target.tool_args = tool_args;
    }
    if tool_call_error.is_some() {
        target.tool_call_error = tool_call_error;
    }
    if metrics.is_some() {
        target.metrics = metrics;
    }
    if created_at.is_some() {
        target.created_at = created_at;
    }
}
