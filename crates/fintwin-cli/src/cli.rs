//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fintwin_core::projection::MAX_HORIZON_MONTHS;

/// FinTwin - Your personal financial twin
#[derive(Parser)]
#[command(name = "fintwin")]
#[command(about = "Personal finance dashboard with an AI savings advisor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the data dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the dashboard (stat cards, projection, budget health, spending mix)
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the savings projection month by month
    Project {
        /// Months to project, up to 600 (defaults to the goal deadline, or 8)
        #[arg(
            short,
            long,
            value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_HORIZON_MONTHS))
        )]
        months: Option<u32>,
    },

    /// Show budget utilization and spending mix per category
    Budget,

    /// Ask the advisor a single question
    Ask {
        /// Quick action: summarize, goal, tips, optimize
        #[arg(short, long)]
        action: Option<String>,

        /// Question to ask (ignored when --action is given)
        prompt: Vec<String>,
    },

    /// Interactive advisor chat
    Chat {
        /// Skip the login sequence
        #[arg(long)]
        skip_login: bool,
    },

    /// Run the login sequence
    Login,

    /// Show advisor backend and configuration status
    Status,

    /// Manage advisor prompts (list, show, path)
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., advisor_system, saving_tips)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Show the path of the override config file
    Path,
}
