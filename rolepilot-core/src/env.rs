//! Environment inputs.
//!
//! The loader never reads process globals directly; callers capture the
//! environment into an [`EnvMap`] first so tests can hand in their own.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::ConfigError;

pub type EnvMap = HashMap<String, String>;

/// Location of the supervisor config, optionally `file://`-prefixed.
pub const CONFIG_PATH_VAR: &str = "CONTAINERPILOT";
/// Enables the local discovery-agent coprocess.
pub const AGENT_FLAG_VAR: &str = "CONSUL_AGENT";
/// Discovery-agent host to join.
pub const DISCOVERY_HOST_VAR: &str = "CONSUL";

pub const DEFAULT_DISCOVERY_HOST: &str = "consul";
pub const DISCOVERY_PORT: u16 = 8500;
pub const LOCAL_DISCOVERY_ADDRESS: &str = "localhost:8500";

const FILE_SCHEME: &str = "file://";

/// Snapshot the current process environment.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
pub fn capture() -> EnvMap {
    collect_utf8(std::env::vars_os())
}

fn collect_utf8(vars: impl IntoIterator<Item = (OsString, OsString)>) -> EnvMap {
    vars.into_iter()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Interpret an environment value as a boolean flag.
///
/// Integers are true when non-zero; otherwise `true`, `yes`, `y` and `on`
/// (any case) are true and everything else is false.
pub fn to_flag(value: &str) -> bool {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return n != 0;
    }
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "on"
    )
}

/// Config file path from [`CONFIG_PATH_VAR`], scheme prefix stripped.
pub fn config_path(env: &EnvMap) -> Result<PathBuf, ConfigError> {
    let raw = env
        .get(CONFIG_PATH_VAR)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingEnv {
            var: CONFIG_PATH_VAR,
        })?;
    Ok(PathBuf::from(raw.strip_prefix(FILE_SCHEME).unwrap_or(raw.as_str())))
}

/// Discovery-agent wiring derived from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    /// Run a local agent coprocess that joins `address`.
    pub local_agent: bool,
    /// `host:port` of the external discovery agent.
    pub address: String,
}

impl DiscoverySettings {
    pub fn from_env(env: &EnvMap) -> Self {
        let local_agent = env.get(AGENT_FLAG_VAR).map(|v| to_flag(v)).unwrap_or(false);
        let host = env
            .get(DISCOVERY_HOST_VAR)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_DISCOVERY_HOST);
        // A value that already names a port is taken verbatim.
        let address = if host.contains(':') {
            host.to_owned()
        } else {
            format!("{host}:{DISCOVERY_PORT}")
        };
        Self {
            local_agent,
            address,
        }
    }
}
