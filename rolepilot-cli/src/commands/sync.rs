//! `rolepilot sync`: assert a role and reload the supervisor on change.

use anyhow::{Context, Result};
use clap::Args;

use rolepilot_core::Role;
use rolepilot_sync::{
    pipeline::{self, ReconcileOptions},
    reloader::{SignalSupervisor, INIT_PID},
    WriteResult,
};

use super::ConfigArgs;
use crate::RoleArg;

/// Arguments for `rolepilot sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Role to advertise: primary | replica.
    #[arg(long, short = 'r', value_name = "ROLE")]
    pub role: RoleArg,

    /// Show what would be written without writing or reloading.
    #[arg(long)]
    pub dry_run: bool,

    /// Rewrite the config but do not signal the supervisor.
    #[arg(long)]
    pub no_reload: bool,

    /// Supervisor pid to signal.
    #[arg(long, default_value_t = INIT_PID)]
    pub pid: i32,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let desired: Role = self.role.into();
        let supervisor = SignalSupervisor::new(self.pid);
        let options = ReconcileOptions {
            dry_run: self.dry_run,
            reload: !self.no_reload,
        };

        let report = pipeline::reconcile(&self.config.env(), desired, &supervisor, options)
            .with_context(|| format!("sync to role '{desired}' failed"))?;

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        if !report.changed {
            println!(
                "{prefix}✓ {} already advertises {} — nothing to do",
                report.path.display(),
                report.observed
            );
            return Ok(());
        }

        println!(
            "{prefix}✓ role changed {} → {}",
            report.observed, report.desired
        );
        match &report.write {
            Some(WriteResult::Written { path, .. }) => println!("  ✎  {}", path.display()),
            Some(WriteResult::WouldWrite { path, .. }) => println!("  ~  {}", path.display()),
            Some(WriteResult::Unchanged { path, .. }) => println!("  ·  {}", path.display()),
            None => {}
        }
        if report.reloaded {
            println!("  ↻  supervisor reloaded (pid {})", self.pid);
        }
        Ok(())
    }
}
