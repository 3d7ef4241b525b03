//! Advisor commands (ask, chat)

use std::io::Write;

use anyhow::{bail, Result};
use fintwin_core::{
    AdviceOutcome, Advisor, AppConfig, EditField, Error, Message, QuickAction, Role, Session,
};

use super::{build_advisor, format_currency, render_dashboard, spawn_stdin_lines, authenticate};

/// A parsed line of chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Free text for the advisor
    Ask(String),
    /// One of the quick action buttons
    Quick(QuickAction),
    /// Inline edit of a dashboard value (raw, parsed leniently)
    Edit(EditField, String),
    Dashboard,
    History,
    Help,
    Quit,
    /// Blank line
    Empty,
    /// Unrecognized slash command
    Unknown(String),
}

/// Parse one line typed at the chat prompt
pub fn parse_chat_input(line: &str) -> ChatCommand {
    let line = line.trim();
    if line.is_empty() {
        return ChatCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ChatCommand::Ask(line.to_string());
    };

    let (command, arg) = match rest.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (rest, ""),
    };

    match command.to_lowercase().as_str() {
        "summary" | "summarize" => ChatCommand::Quick(QuickAction::SummarizeSpending),
        "goal-status" | "status" => ChatCommand::Quick(QuickAction::GoalStatus),
        "tips" => ChatCommand::Quick(QuickAction::SavingTips),
        "optimize" => ChatCommand::Quick(QuickAction::Optimize),
        "savings" | "assets" => ChatCommand::Edit(EditField::Assets, arg.to_string()),
        "goal" => ChatCommand::Edit(EditField::Goal, arg.to_string()),
        "dashboard" => ChatCommand::Dashboard,
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        other => ChatCommand::Unknown(other.to_string()),
    }
}

pub fn chat_help() -> &'static str {
    "  Commands:\n\
     \x20   /summary           Summarize spending\n\
     \x20   /goal-status       How am I doing on my goal?\n\
     \x20   /tips              Quick saving tips\n\
     \x20   /optimize          Plan to reach the goal faster\n\
     \x20   /savings <amount>  Update current savings\n\
     \x20   /goal <amount>     Update the goal target\n\
     \x20   /dashboard         Show the dashboard\n\
     \x20   /history           Show the conversation\n\
     \x20   /quit              Leave\n"
}

/// Render a conversation entry for the terminal
pub fn render_message(message: &Message) -> String {
    let time = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M");
    match message.role {
        Role::User => format!("  [{}] You: {}", time, message.content),
        Role::Assistant => format!(
            "  [{}] FinTwin:\n{}",
            time,
            indent(&message.content, "    ")
        ),
        Role::SystemAlert => format!("  [{}] ⚙️  {}", time, message.content),
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|l| format!("{}{}", prefix, l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ask once and print the reply
pub async fn cmd_ask(config: &AppConfig, action: Option<&str>, prompt: &[String]) -> Result<()> {
    let advisor = build_advisor(config)?;
    let mut session = Session::from_config(config);

    let prompt = match action {
        Some(action) => {
            let action: QuickAction = action.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            advisor.quick_action_prompt(action, session.profile())?
        }
        None => prompt.join(" "),
    };
    if prompt.trim().is_empty() {
        bail!("Nothing to ask. Pass a question or --action summarize|goal|tips|optimize");
    }

    send(&mut session, &advisor, &prompt).await
}

/// Login, then an interactive advisor session
pub async fn cmd_chat(config: &AppConfig, skip_login: bool) -> Result<()> {
    let advisor = build_advisor(config)?;
    let mut lines = spawn_stdin_lines();

    if !skip_login {
        authenticate(&config.profile.name, &mut lines).await?;
    }

    let mut session = Session::from_config(config);
    println!();
    for message in session.messages() {
        println!("{}", render_message(message));
    }
    println!();
    println!("  Type a question, or /help for commands.");

    loop {
        print!("\n  > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.recv().await else {
            println!();
            break;
        };

        match parse_chat_input(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::Help => print!("{}", chat_help()),
            ChatCommand::Dashboard => {
                print!("{}", render_dashboard(session.profile(), &config.currency))
            }
            ChatCommand::History => {
                for message in session.messages() {
                    println!("{}", render_message(message));
                }
            }
            ChatCommand::Edit(field, raw) => {
                let stored = session.edit(field, &raw);
                let name = match field {
                    EditField::Assets => "Current savings",
                    EditField::Goal => "Goal target",
                };
                println!("  ✓ {} set to {}", name, format_currency(&config.currency, stored));
            }
            ChatCommand::Quick(action) => {
                let prompt = advisor.quick_action_prompt(action, session.profile())?;
                println!("  You: {}", prompt);
                send(&mut session, &advisor, &prompt).await?;
            }
            ChatCommand::Ask(prompt) => send(&mut session, &advisor, &prompt).await?,
            ChatCommand::Unknown(command) => {
                println!("  Unknown command: /{} (try /help)", command);
            }
        }
    }

    Ok(())
}

async fn send(session: &mut Session, advisor: &Advisor, prompt: &str) -> Result<()> {
    println!("  FinTwin is thinking...");
    match session.ask(advisor, prompt).await {
        Ok(Some(AdviceOutcome::Replied(message))) => println!("{}", render_message(&message)),
        Ok(Some(AdviceOutcome::Failed { notice })) => println!("  ⚠️  {}", notice),
        Ok(None) => {}
        Err(Error::AdvisorBusy) => println!("  Still answering your last question..."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
