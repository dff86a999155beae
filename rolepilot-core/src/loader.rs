//! Supervisor config loader.
//!
//! # Load flow
//!
//! 1. Resolve the path from `CONTAINERPILOT` (`file://` stripped).
//! 2. Read the file.
//! 3. Strip the discovery-agent conditional markers.
//! 4. Parse as JSON.
//! 5. Apply discovery-agent wiring from the environment.
//! 6. Derive the observed role from `services[0].name`.

use std::path::{Path, PathBuf};

use crate::env::{self, DiscoverySettings, EnvMap, LOCAL_DISCOVERY_ADDRESS};
use crate::error::{io_err, ConfigError};
use crate::types::{base_name, ConfigDocument, Role};

/// Opening conditional that wraps the agent coprocess entry.
pub const OPEN_MARKER: &str = "[{{ if .CONSUL_AGENT }}";
/// Matching close of [`OPEN_MARKER`].
pub const CLOSE_MARKER: &str = "}{{ end }}";

const RETRY_JOIN_FLAG: &str = "-retry-join";

/// Loaded config plus the role it declares.
///
/// Owned by a single reconcile cycle; reload it rather than sharing it.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncState {
    pub path: PathBuf,
    pub document: ConfigDocument,
    pub role: Role,
}

/// Load the config named by `CONTAINERPILOT` in `env`.
pub fn load(env: &EnvMap) -> Result<SyncState, ConfigError> {
    let path = env::config_path(env)?;
    load_at(&path, env)
}

/// Load the config at an explicit `path`; the rest of `env` still drives the
/// discovery wiring.
pub fn load_at(path: &Path, env: &EnvMap) -> Result<SyncState, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => ConfigError::Encoding {
            path: path.to_path_buf(),
            source: e,
        },
        _ => io_err(path, e),
    })?;
    let cleaned = strip_template(&raw).map_err(|reason| ConfigError::Template {
        path: path.to_path_buf(),
        reason,
    })?;
    let mut document: ConfigDocument =
        serde_json::from_str(&cleaned).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let settings = DiscoverySettings::from_env(env);
    apply_discovery(&mut document, &settings)?;

    let role = observed_role(&document)?;
    tracing::debug!(
        "loaded {} (role {role}, discovery {})",
        path.display(),
        settings.address
    );

    Ok(SyncState {
        path: path.to_path_buf(),
        document,
        role,
    })
}

/// Remove the single discovery-agent conditional so the rest parses as JSON.
///
/// Text without any marker is returned unchanged; that is what a previously
/// rewritten config looks like. Anything other than zero markers or exactly
/// one open marker followed by one close marker is rejected.
pub fn strip_template(raw: &str) -> Result<String, String> {
    let opens = raw.matches(OPEN_MARKER).count();
    let closes = raw.matches(CLOSE_MARKER).count();

    match (opens, closes) {
        (0, 0) => Ok(raw.to_owned()),
        (1, 1) => {
            let open_at = raw.find(OPEN_MARKER).unwrap_or_default();
            let close_at = raw.find(CLOSE_MARKER).unwrap_or_default();
            if close_at < open_at + OPEN_MARKER.len() {
                return Err("close marker precedes open marker".to_string());
            }
            Ok(raw.replacen(OPEN_MARKER, "[", 1).replacen(CLOSE_MARKER, "}", 1))
        }
        (o, c) => Err(format!(
            "expected one open and one close marker, found {o} open and {c} close"
        )),
    }
}

/// Point the document at the discovery agent.
///
/// With a local agent the supervisor talks to loopback and the agent's
/// `-retry-join` target becomes the external address; without one the
/// supervisor talks to the external address and no coprocess runs.
pub fn apply_discovery(
    document: &mut ConfigDocument,
    settings: &DiscoverySettings,
) -> Result<(), ConfigError> {
    if !settings.local_agent {
        document.discovery_address = Some(settings.address.clone());
        document.coprocesses.clear();
        return Ok(());
    }

    let agent = document
        .coprocesses
        .first_mut()
        .ok_or(ConfigError::NoCoprocesses)?;
    let command = agent
        .command
        .as_mut()
        .ok_or(ConfigError::MissingRetryJoin)?;
    let host_idx = command
        .iter()
        .position(|arg| arg == RETRY_JOIN_FLAG)
        .map(|i| i + 1)
        .filter(|i| *i < command.len())
        .ok_or(ConfigError::MissingRetryJoin)?;
    command[host_idx] = settings.address.clone();
    document.discovery_address = Some(LOCAL_DISCOVERY_ADDRESS.to_owned());
    Ok(())
}

/// Role declared by `services[0].name`; never `Unassigned`.
fn observed_role(document: &ConfigDocument) -> Result<Role, ConfigError> {
    let name = document.declared_name().ok_or(ConfigError::NoServices)?;
    if base_name(name).is_empty() {
        return Err(ConfigError::EmptyServiceName {
            name: name.to_owned(),
        });
    }
    Ok(document.declared_role().unwrap_or(Role::Replica))
}
