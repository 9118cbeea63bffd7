pub mod config;
pub mod serve;
pub mod suggest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "taskpilot",
    author,
    version,
    about = "Taskpilot - AI subtask suggestions for your tasks",
    long_about = "Breaks a task into 3-5 actionable subtasks using Gemini.\n\nConfiguration \
                  comes from defaults, an optional TOML/YAML file, GEMINI_* and SUGGEST_* \
                  environment variables, then command-line flags."
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "TASKPILOT_CONFIG",
        value_name = "FILE",
        help = "Configuration file (.toml, .yaml or .yml)"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP suggestion service")]
    Serve(serve::ServeArgs),

    #[command(about = "Suggest subtasks for one task")]
    Suggest(suggest::SuggestArgs),

    #[command(subcommand, about = "Inspect and validate configuration")]
    Config(config::ConfigCommand)
}
