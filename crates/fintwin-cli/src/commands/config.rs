//! Configuration display commands

use std::path::Path;

use anyhow::Result;
use fintwin_core::config::default_config_path;

use super::load_config;

/// Print the effective configuration as TOML
pub fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    match config.source {
        Some(ref path) => println!("# Loaded from {}", path.display()),
        None => println!("# Built-in defaults"),
    }
    println!("{}", config.to_toml()?);
    Ok(())
}

/// Show where an override config is read from
pub fn cmd_config_path() -> Result<()> {
    match default_config_path() {
        Some(path) => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!();
                eprintln!("Note: No override file yet; built-in defaults are in use.");
                eprintln!("Save 'fintwin config show' output there to customize your profile.");
            }
        }
        None => {
            eprintln!("Could not determine config directory.");
            eprintln!("The data directory is not available on this system.");
        }
    }
    Ok(())
}
