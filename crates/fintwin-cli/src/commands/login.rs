//! Login sequence rendering

use std::io::BufRead;

use anyhow::{Context, Result};
use fintwin_core::{run_login, AppConfig, LoginSequence, LoginUpdate};
use tokio::sync::mpsc;

pub async fn cmd_login(config: &AppConfig) -> Result<()> {
    let mut lines = spawn_stdin_lines();
    authenticate(&config.profile.name, &mut lines).await?;
    println!("  Run 'fintwin chat --skip-login' to talk to your advisor.");
    Ok(())
}

/// Read stdin on a dedicated thread, one message per line
///
/// The channel closes at end of input.
pub fn spawn_stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run the login sequence, approving the push challenge on any input line
pub async fn authenticate(name: &str, lines: &mut mpsc::Receiver<String>) -> Result<()> {
    println!();
    println!("  🔐 FinTwin Secure Node");
    println!("     ─────────────────────────────────────────────────");

    let (approve_tx, mut approve_rx) = mpsc::channel(1);
    let mut approve_tx = Some(approve_tx);
    let mut sequence = LoginSequence::new(name);

    let login = run_login(&mut sequence, &mut approve_rx, |update| {
        println!("{}", render_update(&update));
    });
    tokio::pin!(login);

    loop {
        tokio::select! {
            result = &mut login => {
                return result.context("Login sequence aborted");
            }
            line = lines.recv(), if approve_tx.is_some() => match line {
                Some(_) => {
                    if let Some(ref tx) = approve_tx {
                        let _ = tx.try_send(());
                    }
                }
                // End of input: closing the approval channel ends the run
                None => approve_tx = None,
            },
        }
    }
}

/// One terminal line per login update
pub fn render_update(update: &LoginUpdate) -> String {
    match update {
        LoginUpdate::Stage(stage) => format!("\n  [{:>3}%] {}", stage.progress(), stage.label()),
        LoginUpdate::Line(line) => format!("     {}", line),
        LoginUpdate::AwaitingPush => {
            "\n  📱 Push challenge sent to your device. Press Enter to approve...".to_string()
        }
        LoginUpdate::Authenticated => "\n  ✅ Access granted.\n".to_string(),
    }
}
