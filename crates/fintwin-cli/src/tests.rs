//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use clap::Parser;
use fintwin_core::{AppConfig, AuthStage, EditField, GoalStatus, LoginUpdate, QuickAction};

use crate::cli::{Cli, Commands, ConfigAction, PromptsAction};
use crate::commands::{self, parse_chat_input, ChatCommand};

fn default_config() -> AppConfig {
    AppConfig::embedded().unwrap()
}

// ========== Formatting Tests ==========

#[test]
fn test_format_currency_groups_thousands() {
    assert_eq!(commands::format_currency("₹", 60000), "₹60,000");
    assert_eq!(commands::format_currency("₹", 0), "₹0");
    assert_eq!(commands::format_currency("₹", 999), "₹999");
    assert_eq!(commands::format_currency("$", 1_000_000), "$1,000,000");
}

#[test]
fn test_format_signed() {
    assert_eq!(commands::format_signed("₹", 3000), "₹3,000");
    assert_eq!(commands::format_signed("₹", -1500), "-₹1,500");
}

#[test]
fn test_bar_fills_proportionally() {
    assert_eq!(commands::bar(0.5, 4), "██░░");
    assert_eq!(commands::bar(0.0, 3), "░░░");
    assert_eq!(commands::bar(2.0, 3), "███");
}

// ========== Dashboard Tests ==========

#[test]
fn test_goal_trend() {
    assert_eq!(commands::goal_trend(GoalStatus::Secured, "₹"), "Goal Secured");
    assert_eq!(
        commands::goal_trend(GoalStatus::Shortfall(11000), "₹"),
        "Shortfall: ₹11,000"
    );
}

#[test]
fn test_render_dashboard_default_profile() {
    let config = default_config();
    let out = commands::render_dashboard(&config.profile, &config.currency);

    assert!(out.contains("Rahul Sharma"));
    assert!(out.contains("Current Savings:  ₹25,000"));
    assert!(out.contains("Monthly Burn:     ₹12,000"));
    assert!(out.contains("Laptop Target:"));
    assert!(out.contains("Shortfall: ₹11,000"));
    assert!(out.contains("Conservative"));
    assert!(out.contains("surplus ₹3,000"));
    assert!(out.contains("fintwin ask --action optimize"));
}

#[test]
fn test_render_dashboard_secured_goal() {
    let mut config = default_config();
    config.profile.current_savings = 60000;
    let out = commands::render_dashboard(&config.profile, &config.currency);

    assert!(out.contains("Goal Secured"));
    assert!(!out.contains("fintwin ask --action optimize"));
}

#[test]
fn test_render_projection_uses_deadline() {
    let config = default_config();
    let out = commands::render_projection(&config.profile, &config.currency, None);

    assert!(out.contains("(8 months)"));
    assert!(out.contains("Now"));
    assert!(out.contains("M8"));
    assert!(out.contains("₹49,000"));
    assert!(out.contains("Target: ₹60,000"));
}

#[test]
fn test_render_projection_explicit_months() {
    let config = default_config();
    let out = commands::render_projection(&config.profile, &config.currency, Some(12));

    assert!(out.contains("(12 months)"));
    assert!(out.contains("M12"));
    // 25,000 + 12 * 3,000 clears the target
    assert!(out.contains("₹61,000"));
    assert!(out.contains(" ✓"));
}

#[test]
fn test_render_budget_flags_over_limit() {
    let mut config = default_config();
    config.profile.expenses.food = 5000;
    let out = commands::render_budget(&config.profile, &config.currency);

    let food = out
        .lines()
        .find(|l| l.trim_start().starts_with("Food"))
        .unwrap();
    assert!(food.contains("100%"));
    assert!(food.contains("over"));

    let travel = out
        .lines()
        .find(|l| l.trim_start().starts_with("Travel"))
        .unwrap();
    assert!(!travel.contains("over"));
}

#[test]
fn test_render_budget_spending_mix() {
    let config = default_config();
    let out = commands::render_budget(&config.profile, &config.currency);

    assert!(out.contains("Spending Mix"));
    // 4,000 of 12,000
    assert!(out.contains("Food    33%"));
    assert!(out.contains("Other   42%"));
}

#[test]
fn test_cmd_dashboard_json() {
    let config = default_config();
    assert!(commands::cmd_dashboard(&config, true).is_ok());
}

// ========== Chat Input Tests ==========

#[test]
fn test_parse_plain_question() {
    assert_eq!(
        parse_chat_input("  Can I afford a trip?  "),
        ChatCommand::Ask("Can I afford a trip?".to_string())
    );
}

#[test]
fn test_parse_blank_line() {
    assert_eq!(parse_chat_input("   "), ChatCommand::Empty);
}

#[test]
fn test_parse_quick_actions() {
    assert_eq!(
        parse_chat_input("/summary"),
        ChatCommand::Quick(QuickAction::SummarizeSpending)
    );
    assert_eq!(
        parse_chat_input("/goal-status"),
        ChatCommand::Quick(QuickAction::GoalStatus)
    );
    assert_eq!(
        parse_chat_input("/TIPS"),
        ChatCommand::Quick(QuickAction::SavingTips)
    );
    assert_eq!(
        parse_chat_input("/optimize"),
        ChatCommand::Quick(QuickAction::Optimize)
    );
}

#[test]
fn test_parse_edits_keep_raw_argument() {
    assert_eq!(
        parse_chat_input("/savings 30000"),
        ChatCommand::Edit(EditField::Assets, "30000".to_string())
    );
    assert_eq!(
        parse_chat_input("/goal   abc"),
        ChatCommand::Edit(EditField::Goal, "abc".to_string())
    );
    assert_eq!(
        parse_chat_input("/goal"),
        ChatCommand::Edit(EditField::Goal, String::new())
    );
}

#[test]
fn test_parse_navigation_commands() {
    assert_eq!(parse_chat_input("/dashboard"), ChatCommand::Dashboard);
    assert_eq!(parse_chat_input("/history"), ChatCommand::History);
    assert_eq!(parse_chat_input("/?"), ChatCommand::Help);
    assert_eq!(parse_chat_input("/exit"), ChatCommand::Quit);
    assert_eq!(
        parse_chat_input("/bogus"),
        ChatCommand::Unknown("bogus".to_string())
    );
}

#[test]
fn test_render_message_roles() {
    let user = commands::render_message(&fintwin_core::Message::user("hi"));
    assert!(user.contains("You: hi"));

    let reply = commands::render_message(&fintwin_core::Message::assistant("line one\nline two"));
    assert!(reply.contains("FinTwin:"));
    assert!(reply.contains("\n    line two"));

    let alert = commands::render_message(&fintwin_core::Message::system_alert("Profile updated"));
    assert!(alert.contains("Profile updated"));
}

// ========== Login Rendering Tests ==========

#[test]
fn test_render_login_updates() {
    let stage = commands::render_update(&LoginUpdate::Stage(AuthStage::Mfa));
    assert!(stage.contains("[ 35%] MFA Push Challenge"));

    let line = commands::render_update(&LoginUpdate::Line("[12:00:00] [0xABCDEF] OK".into()));
    assert_eq!(line, "     [12:00:00] [0xABCDEF] OK");

    assert!(commands::render_update(&LoginUpdate::AwaitingPush).contains("Press Enter"));
    assert!(commands::render_update(&LoginUpdate::Authenticated).contains("Access granted"));
}

// ========== Config Tests ==========

#[test]
fn test_cmd_config_show_with_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "currency = \"$\"\n").unwrap();

    assert!(commands::cmd_config_show(Some(&path)).is_ok());
}

#[test]
fn test_cmd_config_show_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    assert!(commands::cmd_config_show(Some(&path)).is_err());
}

#[test]
fn test_load_config_reads_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "currency = \"$\"\n[advisor]\nmax_history = 6\n").unwrap();

    let config = commands::load_config(Some(&path)).unwrap();
    assert_eq!(config.currency, "$");
    assert_eq!(config.advisor.max_history, 6);
    assert_eq!(config.source.as_deref(), Some(path.as_path()));
}

// ========== Prompts Tests ==========

#[test]
fn test_cmd_prompts_show_known_and_unknown() {
    assert!(commands::cmd_prompts_show("saving_tips").is_ok());
    // Unknown ids print the list instead of failing
    assert!(commands::cmd_prompts_show("nope").is_ok());
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_cli_parses_ask_with_action() {
    let cli = Cli::try_parse_from(["fintwin", "ask", "--action", "tips"]).unwrap();
    match cli.command {
        Commands::Ask { action, prompt } => {
            assert_eq!(action.as_deref(), Some("tips"));
            assert!(prompt.is_empty());
        }
        _ => panic!("expected ask"),
    }
}

#[test]
fn test_cli_parses_free_text_question() {
    let cli = Cli::try_parse_from(["fintwin", "ask", "can", "I", "save", "more?"]).unwrap();
    match cli.command {
        Commands::Ask { action, prompt } => {
            assert!(action.is_none());
            assert_eq!(prompt.join(" "), "can I save more?");
        }
        _ => panic!("expected ask"),
    }
}

#[test]
fn test_cli_global_config_and_subcommands() {
    let cli = Cli::try_parse_from(["fintwin", "project", "-m", "12", "--config", "my.toml"]).unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("my.toml")));
    assert!(matches!(cli.command, Commands::Project { months: Some(12) }));

    let cli = Cli::try_parse_from(["fintwin", "chat", "--skip-login"]).unwrap();
    assert!(matches!(cli.command, Commands::Chat { skip_login: true }));

    let cli = Cli::try_parse_from(["fintwin", "prompts", "show", "goal_status"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Prompts {
            action: Some(PromptsAction::Show { .. })
        }
    ));

    let cli = Cli::try_parse_from(["fintwin", "config", "path"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            action: Some(ConfigAction::Path)
        }
    ));
}

#[test]
fn test_cli_bounds_projection_months() {
    let cli = Cli::try_parse_from(["fintwin", "project", "--months", "600"]).unwrap();
    assert!(matches!(cli.command, Commands::Project { months: Some(600) }));

    assert!(Cli::try_parse_from(["fintwin", "project", "--months", "601"]).is_err());
    assert!(Cli::try_parse_from(["fintwin", "project", "--months", "4000000000"]).is_err());
}

#[test]
fn test_cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["fintwin", "transactions"]).is_err());
}
