//! rolepilot core library: role and document types, environment inputs,
//! and the supervisor config loader.
//!
//! - [`types`]: [`Role`], the service naming pair, [`ConfigDocument`]
//! - [`env`]: environment capture and discovery settings
//! - [`loader`]: [`load`] / [`load_at`] producing a [`SyncState`]
//! - [`error`]: [`ConfigError`]

pub mod env;
pub mod error;
pub mod loader;
pub mod types;

pub use env::{DiscoverySettings, EnvMap};
pub use error::{ConfigError, ErrorKind};
pub use loader::{load, load_at, SyncState};
pub use types::{base_name, role_of, service_name, ConfigDocument, Coprocess, Role, Service};
