//! Shared reconcile entrypoint used by the CLI: load → synchronize →
//! (conditionally) reload, strictly in sequence with no retry.

use std::path::{Path, PathBuf};

use rolepilot_core::{load, load_at, EnvMap, Role, SyncState};

use crate::{apply, reloader::Supervisor, SyncError, WriteResult};

/// Knobs for a single reconcile cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Report what would change without writing or reloading.
    pub dry_run: bool,
    /// Signal the supervisor after a real change.
    pub reload: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            reload: true,
        }
    }
}

/// Outcome of a reconcile cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub path: PathBuf,
    /// Role declared by the config before this cycle.
    pub observed: Role,
    pub desired: Role,
    /// The declared role changed (or would, in dry-run).
    pub changed: bool,
    pub write: Option<WriteResult>,
    pub reloaded: bool,
}

/// Run one reconcile cycle against the config named in `env`.
pub fn reconcile<S: Supervisor>(
    env: &EnvMap,
    desired: Role,
    supervisor: &S,
    options: ReconcileOptions,
) -> Result<ReconcileReport, SyncError> {
    let mut state = load(env)?;
    reconcile_state(&mut state, desired, supervisor, options)
}

/// [`reconcile`] against an explicit config path.
pub fn reconcile_at<S: Supervisor>(
    path: &Path,
    env: &EnvMap,
    desired: Role,
    supervisor: &S,
    options: ReconcileOptions,
) -> Result<ReconcileReport, SyncError> {
    let mut state = load_at(path, env)?;
    reconcile_state(&mut state, desired, supervisor, options)
}

fn reconcile_state<S: Supervisor>(
    state: &mut SyncState,
    desired: Role,
    supervisor: &S,
    options: ReconcileOptions,
) -> Result<ReconcileReport, SyncError> {
    let observed = state.role;
    let write = apply(state, desired, options.dry_run)?;
    let changed = write.is_some();

    let reloaded = changed && !options.dry_run && options.reload;
    if reloaded {
        supervisor.reload()?;
    } else if changed && !options.dry_run {
        tracing::warn!(
            "config rewritten for role {desired} but supervisor reload is disabled"
        );
    }

    Ok(ReconcileReport {
        path: state.path.clone(),
        observed,
        desired,
        changed,
        write,
        reloaded,
    })
}
