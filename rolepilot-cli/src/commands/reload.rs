//! `rolepilot reload`: signal the supervisor unconditionally.

use anyhow::{Context, Result};
use clap::Args;

use rolepilot_sync::reloader::{SignalSupervisor, Supervisor, INIT_PID};

/// Arguments for `rolepilot reload`.
#[derive(Args, Debug)]
pub struct ReloadArgs {
    /// Supervisor pid to signal.
    #[arg(long, default_value_t = INIT_PID)]
    pub pid: i32,
}

impl ReloadArgs {
    pub fn run(self) -> Result<()> {
        SignalSupervisor::new(self.pid)
            .reload()
            .context("supervisor reload failed")?;
        println!("✓ supervisor reloaded (pid {})", self.pid);
        Ok(())
    }
}
