use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use config::{ConfigError, SuggestConfig, resolve_config};

use crate::output;
use crate::ux_error;

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Show the effective configuration (credential redacted)")]
    Show(ShowArgs),

    #[command(about = "Validate the effective configuration")]
    Validate
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(long, help = "Output as JSON instead of TOML")]
    pub json: bool
}

pub fn run(cmd: ConfigCommand, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommand::Show(args) => run_show(args, config_path),
        ConfigCommand::Validate => run_validate(config_path)
    }
}

fn run_show(args: ShowArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;
    println!("{}", render(&config, args.json)?);
    Ok(())
}

fn run_validate(config_path: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;

    output::success("Configuration is valid");
    println!(
        "  {} {}",
        "models:".bold(),
        config.upstream.models.join(", ")
    );
    println!(
        "  {} {} retries, {} ms base delay",
        "retry:".bold(),
        config.retry.max_retries,
        config.retry.base_delay_ms
    );
    println!(
        "  {} {}:{}",
        "server:".bold(),
        config.server.host,
        config.server.port
    );

    if config.upstream.api_key.is_none() {
        output::warn("No Gemini API key configured; suggestion requests will fail");
    }
    Ok(())
}

fn load(config_path: Option<&Path>) -> Result<SuggestConfig> {
    resolve_config(config_path, None).map_err(|e| {
        let err = match &e {
            ConfigError::Invalid(errors) => ux_error::invalid_config(&errors.to_string()),
            ConfigError::File(file_error) => ux_error::UxError::new(file_error.to_string())
                .fix("Check the --config path and its extension (.toml, .yaml, .yml)")
        };
        err.display();
        anyhow::Error::new(err)
    })
}

fn render(config: &SuggestConfig, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(config)?)
    } else {
        Ok(toml::to_string_pretty(config)?)
    }
}
