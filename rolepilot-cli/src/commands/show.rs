//! `rolepilot show`: what the config currently declares.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use rolepilot_core::{load, Role};

use super::ConfigArgs;

/// Arguments for `rolepilot show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ShowJson<'a> {
    path: String,
    role: Role,
    service: Option<&'a str>,
    discovery_address: Option<&'a str>,
    agent_command: Option<&'a [String]>,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let state = load(&self.config.env()).context("failed to load supervisor config")?;
        let doc = &state.document;
        let report = ShowJson {
            path: state.path.display().to_string(),
            role: state.role,
            service: doc.declared_name(),
            discovery_address: doc.discovery_address.as_deref(),
            agent_command: doc.coprocesses.first().and_then(|c| c.command.as_deref()),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let role = match state.role {
            Role::Primary => report.role.to_string().green().bold(),
            _ => report.role.to_string().cyan().bold(),
        };
        println!("config     {}", report.path);
        println!("role       {role}");
        println!("service    {}", report.service.unwrap_or("-"));
        println!("discovery  {}", report.discovery_address.unwrap_or("-"));
        match report.agent_command {
            Some(cmd) => println!("agent      {}", cmd.join(" ")),
            None => println!("agent      {}", "none".dimmed()),
        }
        Ok(())
    }
}
