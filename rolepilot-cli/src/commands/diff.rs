//! `rolepilot diff --role <role>`: show the unified diff `sync` would write.

use anyhow::{Context, Result};
use clap::Args;

use rolepilot_core::{load, Role};
use rolepilot_sync::diff_role;

use super::ConfigArgs;
use crate::RoleArg;

/// Arguments for `rolepilot diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Role to compare against: primary | replica.
    #[arg(long, short = 'r', value_name = "ROLE")]
    pub role: RoleArg,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let desired: Role = self.role.into();
        let state = load(&self.config.env()).context("failed to load supervisor config")?;

        let Some(diff) = diff_role(&state, desired)
            .with_context(|| format!("diff failed for role '{desired}'"))?
        else {
            println!("No differences for {}.", state.path.display());
            return Ok(());
        };

        print!("{diff}");
        if !diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
