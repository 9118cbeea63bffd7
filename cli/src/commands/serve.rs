use std::path::Path;

use anyhow::Result;
use clap::Args;
use config::{ConfigLayer, ServerLayer, SuggestConfig, resolve_config};

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long, help = "Bind host (overrides HOST and the config file)")]
    pub host: Option<String>,

    #[arg(long, short, help = "Bind port (overrides PORT and the config file)")]
    pub port: Option<u16>
}

impl ServeArgs {
    /// Flag values as the CLI config layer; unset flags leave lower layers alone.
    pub fn as_overrides(&self) -> Option<ConfigLayer> {
        if self.host.is_none() && self.port.is_none() {
            return None;
        }
        Some(ConfigLayer {
            server: ServerLayer {
                host: self.host.clone(),
                port: self.port
            },
            ..Default::default()
        })
    }
}

pub fn resolve(args: &ServeArgs, config_path: Option<&Path>) -> Result<SuggestConfig> {
    Ok(resolve_config(config_path, args.as_overrides())?)
}

pub async fn run(config: SuggestConfig) -> Result<()> {
    suggest_server::run_server(config).await?;
    Ok(())
}
