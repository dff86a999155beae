//! Reflect a desired role into the supervisor config.
//!
//! The document's first service name is the single source of truth for the
//! declared role; `SyncState::role` follows it after every change.

use rolepilot_core::{base_name, service_name, ConfigDocument, Role, SyncState};

use crate::error::SyncError;
use crate::writer::{atomic_write, WriteResult};

/// The document `synchronize` would write for `desired`, or `None` when no
/// change is needed.
pub fn plan(state: &SyncState, desired: Role) -> Option<ConfigDocument> {
    let current = state.document.declared_name()?;
    if !desired.is_assigned() || state.document.declared_role() == Some(desired) {
        return None;
    }
    let name = service_name(desired, base_name(current))?;

    let mut document = state.document.clone();
    if let Some(service) = document.services.first_mut() {
        service.name = name;
    }
    Some(document)
}

/// Serialized form written to disk.
pub fn render(document: &ConfigDocument) -> Result<String, SyncError> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    Ok(text)
}

/// Apply `desired` to `state`, writing the config unless `dry_run`.
///
/// Returns `None` for a no-op. On a real write the in-memory document and
/// role are updated so a repeat call is a no-op.
pub fn apply(
    state: &mut SyncState,
    desired: Role,
    dry_run: bool,
) -> Result<Option<WriteResult>, SyncError> {
    let Some(document) = plan(state, desired) else {
        tracing::debug!("{} already advertises {}", state.path.display(), state.role);
        return Ok(None);
    };

    let content = render(&document)?;
    let result = atomic_write(&state.path, &content, dry_run)?;
    if dry_run {
        return Ok(Some(result));
    }

    tracing::info!(
        "advertised role {} -> {} in {}",
        state.role,
        desired,
        state.path.display()
    );
    state.document = document;
    state.role = desired;
    Ok(Some(result))
}

/// Assert `desired` as the node's role.
///
/// Returns `true` when the declared role changed and the supervisor should
/// be reloaded.
pub fn synchronize(state: &mut SyncState, desired: Role) -> Result<bool, SyncError> {
    Ok(apply(state, desired, false)?.is_some())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
