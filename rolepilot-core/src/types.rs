//! Domain types: the node [`Role`], the service naming pair, and the
//! structured [`ConfigDocument`].
//!
//! Every document level keeps unrecognised keys in a flattened map so a
//! rewrite preserves the rest of the supervisor config. Recognised fields
//! serialize first; unrecognised keys follow in their original order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Replication position of the node.
///
/// `Unassigned` means no role has been asserted yet. It is never written to
/// the config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Unassigned,
    Primary,
    Replica,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unassigned => "unassigned",
            Role::Primary => "primary",
            Role::Replica => "replica",
        }
    }

    /// `true` for the two roles that may be written to a document.
    pub fn is_assigned(&self) -> bool {
        !matches!(self, Role::Unassigned)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(Role::Primary),
            "replica" => Ok(Role::Replica),
            "unassigned" => Ok(Role::Unassigned),
            other => Err(format!(
                "unknown role '{other}'; expected: primary, replica"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Service naming
// ---------------------------------------------------------------------------

pub const PRIMARY_SUFFIX: &str = "-primary";
pub const REPLICA_SUFFIX: &str = "-replica";

/// Role advertised by a service name: `Primary` when it carries the primary
/// suffix, `Replica` otherwise.
pub fn role_of(service_name: &str) -> Role {
    if service_name.ends_with(PRIMARY_SUFFIX) {
        Role::Primary
    } else {
        Role::Replica
    }
}

/// Service name with one trailing role suffix removed.
pub fn base_name(service_name: &str) -> &str {
    service_name
        .strip_suffix(PRIMARY_SUFFIX)
        .or_else(|| service_name.strip_suffix(REPLICA_SUFFIX))
        .unwrap_or(service_name)
}

/// Name advertised for `role`. Replicas advertise the bare base name.
///
/// Returns `None` for [`Role::Unassigned`].
pub fn service_name(role: Role, base: &str) -> Option<String> {
    match role {
        Role::Primary => Some(format!("{base}{PRIMARY_SUFFIX}")),
        Role::Replica => Some(base.to_owned()),
        Role::Unassigned => None,
    }
}

// ---------------------------------------------------------------------------
// Config document
// ---------------------------------------------------------------------------

/// An auxiliary process launched by the supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coprocess {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Coprocess {
    /// Command arguments; empty when the entry has no `command`.
    pub fn args(&self) -> &[String] {
        self.command.as_deref().unwrap_or_default()
    }
}

/// A service advertised for discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Missing names load as empty and are rejected by the loader.
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The supervisor's configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// `host:port` of the discovery agent.
    #[serde(rename = "consul", default, skip_serializing_if = "Option::is_none")]
    pub discovery_address: Option<String>,
    #[serde(default)]
    pub coprocesses: Vec<Coprocess>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigDocument {
    /// Name of the first declared service, if any.
    pub fn declared_name(&self) -> Option<&str> {
        self.services.first().map(|s| s.name.as_str())
    }

    /// Role advertised by the first declared service.
    pub fn declared_role(&self) -> Option<Role> {
        self.declared_name().map(role_of)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_matches_serde() {
        assert_eq!(Role::Primary.to_string(), "primary");
        assert_eq!(
            serde_json::to_string(&Role::Replica).unwrap(),
            "\"replica\""
        );
    }

    #[test]
    fn role_from_str_is_case_insensitive() {
        assert_eq!("PRIMARY".parse::<Role>().unwrap(), Role::Primary);
        assert!("leader".parse::<Role>().is_err());
    }

    #[test]
    fn unassigned_has_no_service_name() {
        assert_eq!(service_name(Role::Unassigned, "mysql"), None);
        assert!(!Role::Unassigned.is_assigned());
    }

    #[test]
    fn base_name_strips_only_one_suffix() {
        assert_eq!(base_name("mysql-primary"), "mysql");
        assert_eq!(base_name("mysql-replica"), "mysql");
        assert_eq!(base_name("mysql"), "mysql");
        assert_eq!(base_name("db-replica-primary"), "db-replica");
    }

    #[test]
    fn coprocess_without_command_stays_without_one() {
        let raw = r#"{"name":"logger","restarts":"never"}"#;
        let coprocess: Coprocess = serde_json::from_str(raw).unwrap();
        assert!(coprocess.args().is_empty());
        let back = serde_json::to_value(&coprocess).unwrap();
        assert!(back.get("command").is_none());
        assert_eq!(back, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn service_without_name_loads_empty() {
        let service: Service = serde_json::from_str(r#"{"port":3306}"#).unwrap();
        assert_eq!(service.name, "");
    }

    #[test]
    fn unknown_keys_survive_serde() {
        let raw = r#"{"consul":"c:8500","logging":{"level":"INFO"},"services":[{"name":"mysql","port":3306}]}"#;
        let doc: ConfigDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.extra["logging"]["level"], "INFO");
        assert_eq!(doc.services[0].extra["port"], 3306);

        let back: Value = serde_json::to_value(&doc).unwrap();
        let orig: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(back["logging"], orig["logging"]);
        assert_eq!(back["services"], orig["services"]);
    }
}
