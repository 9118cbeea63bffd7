use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;
pub mod ux_error;

use commands::{Cli, Commands};

/// `RUST_LOG` wins over `default_level`.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve(args) => {
            let config = commands::serve::resolve(&args, config_path)?;
            init_tracing(&config.observability.log_level);
            commands::serve::run(config).await
        }
        Commands::Suggest(args) => {
            init_tracing("warn");
            commands::suggest::run(args, config_path).await
        }
        Commands::Config(cmd) => {
            init_tracing("warn");
            commands::config::run(cmd, config_path)
        }
    }
}
