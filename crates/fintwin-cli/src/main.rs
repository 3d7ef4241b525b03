//! FinTwin CLI - Personal financial twin
//!
//! Usage:
//!   fintwin dashboard            Show the dashboard
//!   fintwin project --months 12  Project savings
//!   fintwin ask --action tips    One-shot advice
//!   fintwin chat                 Login sequence, then advisor chat

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Dashboard { json } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_dashboard(&config, json)
        }
        Commands::Project { months } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_project(&config, months)
        }
        Commands::Budget => {
            let config = commands::load_config(config_path)?;
            commands::cmd_budget(&config)
        }
        Commands::Ask { action, prompt } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_ask(&config, action.as_deref(), &prompt).await
        }
        Commands::Chat { skip_login } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_chat(&config, skip_login).await
        }
        Commands::Login => {
            let config = commands::load_config(config_path)?;
            commands::cmd_login(&config).await
        }
        Commands::Status => commands::cmd_status(config_path).await,
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Config { action } => match action {
            None | Some(ConfigAction::Show) => commands::cmd_config_show(config_path),
            Some(ConfigAction::Path) => commands::cmd_config_path(),
        },
    }
}
