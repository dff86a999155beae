pub mod diff;
pub mod reload;
pub mod show;
pub mod sync;

use std::path::PathBuf;

use clap::Args;

use rolepilot_core::{
    env::{self, CONFIG_PATH_VAR},
    EnvMap,
};

/// Config location shared by every command that reads the config.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Supervisor config path (overrides $CONTAINERPILOT).
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Process environment with `--config` applied.
    pub fn env(&self) -> EnvMap {
        let mut env = env::capture();
        if let Some(path) = &self.config {
            env.insert(CONFIG_PATH_VAR.to_string(), path.display().to_string());
        }
        env
    }
}
