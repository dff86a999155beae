//! # rolepilot-sync
//!
//! Reflects a node's role into the supervisor config and reloads the
//! supervisor.
//!
//! Call [`synchronize`] with a loaded [`rolepilot_core::SyncState`] to
//! rewrite the declared service name, then [`Supervisor::reload`] when it
//! reports a change. [`pipeline::reconcile`] runs the whole cycle.

pub mod diff;
pub mod error;
pub mod pipeline;
pub mod reloader;
pub mod synchronizer;
pub mod writer;

pub use diff::diff_role;
pub use error::{ReloadError, SyncError};
pub use pipeline::{reconcile, ReconcileOptions, ReconcileReport};
pub use reloader::{SignalSupervisor, Supervisor};
pub use synchronizer::{apply, synchronize};
pub use writer::WriteResult;
