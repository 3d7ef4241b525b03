//! Status command implementation

use std::path::Path;

use anyhow::Result;
use fintwin_core::{AdvisorBackend, AdvisorClient, AppConfig};

pub async fn cmd_status(config_path: Option<&Path>) -> Result<()> {
    println!();
    println!("📊 FinTwin Status");
    println!("   ─────────────────────────────────────────────────────────────");

    match AppConfig::load(config_path) {
        Ok(config) => {
            match config.source {
                Some(ref path) => println!("   Config: {}", path.display()),
                None => println!("   Config: built-in defaults"),
            }
            println!("   Profile: {} ({})", config.profile.name, config.profile.occupation);
            println!("   Currency: {}", config.currency);
            println!(
                "   Advisor: temperature {}, history {} messages",
                config.advisor.temperature, config.advisor.max_history
            );
        }
        Err(e) => println!("   ❌ Config error: {}", e),
    }

    println!();
    match AdvisorClient::from_env() {
        Some(client) => {
            println!("   Backend: {}", client.kind());
            println!("   Host: {}", client.host());
            println!("   Model: {}", client.model());
            if client.health_check().await {
                println!("   ✅ Reachable");
            } else {
                println!("   ❌ Not reachable");
            }
        }
        None => {
            println!("   ❌ No advisor configured");
            println!("      Set GEMINI_API_KEY (or API_KEY) for Gemini,");
            println!("      ADVISOR_BACKEND=openai_compatible with OPENAI_COMPATIBLE_HOST,");
            println!("      or ADVISOR_BACKEND=mock for offline replies.");
        }
    }

    println!();
    Ok(())
}
