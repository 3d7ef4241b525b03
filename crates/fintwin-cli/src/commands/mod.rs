//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `chat` - Advisor commands (ask, interactive chat) and chat input parsing
//! - `config` - Configuration display commands
//! - `dashboard` - Dashboard, projection and budget views
//! - `login` - Login sequence rendering
//! - `prompts` - Prompt library management commands
//! - `status` - Advisor backend status

pub mod chat;
pub mod config;
pub mod dashboard;
pub mod login;
pub mod prompts;
pub mod status;

// Re-export command functions for main.rs
pub use chat::*;
pub use config::*;
pub use dashboard::*;
pub use login::*;
pub use prompts::*;
pub use status::*;

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use fintwin_core::{Advisor, AdvisorClient, AppConfig};

/// Load configuration (explicit path, data dir override, or embedded defaults)
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(path).context("Failed to load configuration")
}

/// Build the advisor from environment configuration
pub fn build_advisor(config: &AppConfig) -> Result<Advisor> {
    let client = AdvisorClient::from_env().ok_or_else(|| {
        anyhow!(
            "No advisor configured. Set GEMINI_API_KEY, or ADVISOR_BACKEND=openai_compatible \
             with OPENAI_COMPATIBLE_HOST, or ADVISOR_BACKEND=mock"
        )
    })?;
    Ok(Advisor::from_config(client, config))
}

/// Format an amount with a currency symbol and thousands separators
pub fn format_currency(symbol: &str, amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}", symbol, grouped)
}

/// Signed variant of [`format_currency`]
pub fn format_signed(symbol: &str, amount: i64) -> String {
    if amount < 0 {
        format!("-{}", format_currency(symbol, amount.unsigned_abs()))
    } else {
        format_currency(symbol, amount.unsigned_abs())
    }
}

/// Horizontal bar of `width` cells filled to `fraction`
pub fn bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
