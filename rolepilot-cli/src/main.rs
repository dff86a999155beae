//! rolepilot keeps a supervisor's advertised service in step with the
//! node's replication role.
//!
//! # Usage
//!
//! ```text
//! rolepilot show [--config <path>] [--json]
//! rolepilot sync --role primary|replica [--config <path>] [--dry-run] [--no-reload] [--pid <n>]
//! rolepilot diff --role primary|replica [--config <path>]
//! rolepilot reload [--pid <n>]
//! ```
//!
//! The config path defaults to `$CONTAINERPILOT`; discovery wiring follows
//! `$CONSUL_AGENT` and `$CONSUL`.

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, reload::ReloadArgs, show::ShowArgs, sync::SyncArgs};
use rolepilot_core::Role;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "rolepilot",
    version,
    about = "Reflect a database node's role into its supervisor config",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the role and discovery wiring the config currently declares.
    Show(ShowArgs),

    /// Assert a role: rewrite the config if needed and reload the supervisor.
    Sync(SyncArgs),

    /// Show a unified diff of what `sync` would write.
    Diff(DiffArgs),

    /// Signal the supervisor to reload its config.
    Reload(ReloadArgs),
}

// ---------------------------------------------------------------------------
// Shared role argument: parsed from CLI strings, convert to the core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap only accepts the two writable roles.
#[derive(Debug, Clone, Copy)]
pub struct RoleArg(pub Role);

impl FromStr for RoleArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.parse::<Role>()? {
            Role::Unassigned => Err("role must be one of: primary, replica".to_string()),
            role => Ok(Self(role)),
        }
    }
}

impl fmt::Display for RoleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        r.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Show(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Reload(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
