//! Dry-run unified diff support for `rolepilot diff`.

use similar::TextDiff;

use rolepilot_core::{Role, SyncState};

use crate::{
    synchronizer::{plan, render},
    writer::read_existing,
    SyncError,
};

/// Unified diff between the config on disk and what `synchronize` would
/// write for `desired`.
///
/// Returns `None` when synchronizing would not change the file. No files are
/// written.
pub fn diff_role(state: &SyncState, desired: Role) -> Result<Option<String>, SyncError> {
    let Some(document) = plan(state, desired) else {
        return Ok(None);
    };
    let rendered = normalize_line_endings(&render(&document)?);
    let existing = read_existing(&state.path)?
        .map(|s| normalize_line_endings(&s))
        .unwrap_or_default();
    if existing == rendered {
        return Ok(None);
    }

    let file = state
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| state.path.display().to_string());
    let old_header = format!("a/{file}");
    let new_header = format!("b/{file}");
    let unified = TextDiff::from_lines(&existing, &rendered)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();
    Ok(Some(unified))
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rolepilot_core::{load_at, EnvMap};
    use tempfile::TempDir;

    use crate::synchronize;

    use super::*;

    fn state_with(name: &str) -> (TempDir, SyncState) {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("containerpilot.json");
        fs::write(&path, format!(r#"{{"services":[{{"name":"{name}"}}]}}"#)).expect("write");
        let state = load_at(&path, &EnvMap::new()).expect("load");
        (tmp, state)
    }

    #[test]
    fn no_diff_when_role_matches() {
        let (_tmp, state) = state_with("mysql-primary");
        assert!(diff_role(&state, Role::Primary).expect("diff").is_none());
    }

    #[test]
    fn promotion_produces_unified_diff() {
        let (_tmp, state) = state_with("mysql");
        let diff = diff_role(&state, Role::Primary)
            .expect("diff")
            .expect("some diff");
        assert!(diff.contains("--- a/containerpilot.json"));
        assert!(diff.contains("+++ b/containerpilot.json"));
        assert!(diff.contains("@@"));
        assert!(diff.contains("mysql-primary"));
    }

    #[test]
    fn diff_does_not_write() {
        let (_tmp, state) = state_with("mysql");
        let before = fs::read_to_string(&state.path).expect("read");
        diff_role(&state, Role::Primary).expect("diff");
        assert_eq!(fs::read_to_string(&state.path).expect("read"), before);
    }

    #[test]
    fn no_diff_after_sync() {
        let (_tmp, mut state) = state_with("mysql");
        synchronize(&mut state, Role::Primary).expect("sync");
        assert!(diff_role(&state, Role::Primary).expect("diff").is_none());
    }
}
