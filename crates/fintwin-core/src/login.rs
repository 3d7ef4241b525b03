//! Scripted login sequence
//!
//! A fixed, linear state machine that walks through the stages shown on the
//! login screen: `Idle → Biometric → Mfa → Zkp → Decrypting → Ready`. Timed
//! waits are returned to the caller as `Directive::Sleep`, and the MFA stage
//! blocks on the single external input, `LoginEvent::PushApproved`.
//!
//! None of this performs authentication; the log lines are presentation only.

use std::collections::VecDeque;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Log lines kept on screen
pub const MAX_LOG_LINES: usize = 13;

/// Login stages in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStage {
    Idle,
    Biometric,
    Mfa,
    Zkp,
    Decrypting,
    Ready,
}

impl AuthStage {
    /// Progress bar percentage when this stage is entered
    pub fn progress(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Biometric => 15,
            Self::Mfa => 35,
            Self::Zkp => 60,
            Self::Decrypting => 85,
            Self::Ready => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Biometric => "Biometric Scan",
            Self::Mfa => "MFA Push Challenge",
            Self::Zkp => "Zero-Knowledge Proof",
            Self::Decrypting => "Decrypting Profile",
            Self::Ready => "Ready",
        }
    }

    /// The stage that follows this one
    pub fn next(&self) -> Option<AuthStage> {
        match self {
            Self::Idle => Some(Self::Biometric),
            Self::Biometric => Some(Self::Mfa),
            Self::Mfa => Some(Self::Zkp),
            Self::Zkp => Some(Self::Decrypting),
            Self::Decrypting => Some(Self::Ready),
            Self::Ready => None,
        }
    }

    /// Only the immediate successor is reachable
    pub fn can_transition_to(&self, target: &AuthStage) -> bool {
        self.next().as_ref() == Some(target)
    }

    pub fn all() -> &'static [AuthStage] {
        &[
            Self::Idle,
            Self::Biometric,
            Self::Mfa,
            Self::Zkp,
            Self::Decrypting,
            Self::Ready,
        ]
    }
}

impl std::fmt::Display for AuthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Inputs to the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginEvent {
    /// User pressed "initialize"
    Start,
    /// The last requested sleep finished
    TimerElapsed,
    /// User approved the push challenge
    PushApproved,
}

/// What the caller should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Wait, then send `TimerElapsed`
    Sleep(Duration),
    /// Wait for the user, then send `PushApproved`
    AwaitPush,
    /// The sequence finished
    Authenticated,
    /// The event does not apply in the current state
    Ignored,
}

/// Observable changes, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginUpdate {
    Stage(AuthStage),
    Line(String),
    AwaitingPush,
    Authenticated,
}

#[derive(Debug, Clone)]
enum Step {
    Enter(AuthStage),
    Log(String),
    Wait(Duration),
    AwaitPush,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Waiting {
    Nothing,
    Timer,
    Push,
}

fn script(name: &str) -> Vec<Step> {
    use Step::*;
    let log = |s: &str| Log(s.to_string());
    let ms = Duration::from_millis;

    vec![
        Enter(AuthStage::Biometric),
        log("INITIATING_KERNEL_SECURE_BOOT..."),
        log("MOUNTING_ENCRYPTED_VOLUME_RSA_4096..."),
        Wait(ms(800)),
        log("BIOMETRIC_SENSOR_ACTIVE: SCANNING..."),
        Wait(ms(1200)),
        log("VECTOR_PATTERN_HASH: MATCH_CONFIRMED"),
        Enter(AuthStage::Mfa),
        log("SECURE_HANDSHAKE: INITIATING_MFA_AUTH"),
        log("SENDING_PUSH_CHALLENGE_TO_DEVICE_NODE..."),
        AwaitPush,
        // Approval animation
        Wait(ms(800)),
        log("MFA_STATUS: APPROVED_BY_USER_DEVICE"),
        Enter(AuthStage::Zkp),
        log("ZERO_KNOWLEDGE_PROTOCOL_START..."),
        log("GENERATING_RANDOM_WITNESS_POINT..."),
        Wait(ms(800)),
        log("ZKP_ITERATION_1: CHALLENGE_RECEIVED"),
        Wait(ms(400)),
        log("ZKP_ITERATION_2: PROOF_SUBMITTED"),
        Wait(ms(400)),
        log("ZKP_ITERATION_3: VERIFIED_SUCCESSFULLY"),
        Enter(AuthStage::Decrypting),
        log("ACCESS_TOKEN_GENERATED: ECDSA_SHA256"),
        log("DECRYPTING_USER_PROFILE_AES_256_GCM..."),
        log("HYDRATING_FINANCIAL_DATA_STRUCTURES..."),
        Wait(ms(1500)),
        Enter(AuthStage::Ready),
        log("AUTHENTICATION_SUCCESSFUL"),
        Log(format!("WELCOMING_{}_TO_FINTWIN_NODE_01", node_name(name))),
        Wait(ms(1200)),
        Complete,
    ]
}

/// "Rahul Sharma" → "RAHUL_SHARMA"
fn node_name(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// The login state machine
#[derive(Debug, Clone)]
pub struct LoginSequence {
    script: Vec<Step>,
    cursor: usize,
    stage: AuthStage,
    waiting: Waiting,
    authenticated: bool,
    log: VecDeque<String>,
    updates: Vec<LoginUpdate>,
    line_counter: u64,
}

impl LoginSequence {
    /// Sequence that welcomes `name` at the end
    pub fn new(name: &str) -> Self {
        Self {
            script: script(name),
            cursor: 0,
            stage: AuthStage::Idle,
            waiting: Waiting::Nothing,
            authenticated: false,
            log: VecDeque::with_capacity(MAX_LOG_LINES),
            updates: Vec::new(),
            line_counter: 0,
        }
    }

    pub fn stage(&self) -> AuthStage {
        self.stage
    }

    pub fn progress(&self) -> u8 {
        self.stage.progress()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_awaiting_push(&self) -> bool {
        self.waiting == Waiting::Push
    }

    /// The most recent log lines, oldest first
    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    /// Drain the updates produced since the last call
    pub fn take_updates(&mut self) -> Vec<LoginUpdate> {
        std::mem::take(&mut self.updates)
    }

    /// Feed one event into the machine
    pub fn handle(&mut self, event: LoginEvent) -> Result<Directive> {
        let applies = match event {
            LoginEvent::Start => self.stage == AuthStage::Idle && self.cursor == 0,
            LoginEvent::TimerElapsed => self.waiting == Waiting::Timer,
            LoginEvent::PushApproved => self.waiting == Waiting::Push,
        };
        if !applies {
            debug!(?event, stage = ?self.stage, "Login event ignored");
            return Ok(Directive::Ignored);
        }

        if event == LoginEvent::Start {
            self.log.clear();
        }
        if event == LoginEvent::PushApproved {
            info!("Push challenge approved");
        }
        self.waiting = Waiting::Nothing;
        self.advance()
    }

    /// Run steps until the script needs to wait
    fn advance(&mut self) -> Result<Directive> {
        while let Some(step) = self.script.get(self.cursor).cloned() {
            self.cursor += 1;
            match step {
                Step::Enter(stage) => {
                    if !self.stage.can_transition_to(&stage) {
                        return Err(Error::Login(format!(
                            "Invalid stage transition {:?} -> {:?}",
                            self.stage, stage
                        )));
                    }
                    debug!(from = ?self.stage, to = ?stage, "Login stage transition");
                    self.stage = stage;
                    self.updates.push(LoginUpdate::Stage(stage));
                }
                Step::Log(msg) => self.push_line(&msg),
                Step::Wait(duration) => {
                    self.waiting = Waiting::Timer;
                    return Ok(Directive::Sleep(duration));
                }
                Step::AwaitPush => {
                    self.waiting = Waiting::Push;
                    self.updates.push(LoginUpdate::AwaitingPush);
                    return Ok(Directive::AwaitPush);
                }
                Step::Complete => {
                    self.authenticated = true;
                    self.updates.push(LoginUpdate::Authenticated);
                    info!("Login sequence complete");
                    return Ok(Directive::Authenticated);
                }
            }
        }
        Ok(Directive::Ignored)
    }

    fn push_line(&mut self, msg: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let line = format!("[{}] [{}] {}", timestamp, self.hex_prefix(), msg);

        if self.log.len() == MAX_LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(line.clone());
        self.updates.push(LoginUpdate::Line(line));
    }

    /// Pseudo-random `0xXXXXXX` tag
    fn hex_prefix(&mut self) -> String {
        self.line_counter += 1;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let mut hasher = Sha256::new();
        hasher.update(nanos.to_le_bytes());
        hasher.update(self.line_counter.to_le_bytes());
        let hash = hasher.finalize();
        format!("0x{}", hex::encode_upper(&hash[..3]))
    }
}

/// Drive a sequence to completion on the tokio clock
///
/// Approvals arrive on `approvals`; any sent before the push challenge is
/// shown are discarded. A closed channel ends the run with `Error::Login`.
pub async fn run_login<F>(
    sequence: &mut LoginSequence,
    approvals: &mut mpsc::Receiver<()>,
    mut on_update: F,
) -> Result<()>
where
    F: FnMut(LoginUpdate),
{
    let mut directive = sequence.handle(LoginEvent::Start)?;

    loop {
        for update in sequence.take_updates() {
            on_update(update);
        }

        directive = match directive {
            Directive::Sleep(duration) => {
                tokio::time::sleep(duration).await;
                sequence.handle(LoginEvent::TimerElapsed)?
            }
            Directive::AwaitPush => {
                while approvals.try_recv().is_ok() {}
                approvals
                    .recv()
                    .await
                    .ok_or_else(|| Error::Login("Push approval channel closed".into()))?;
                sequence.handle(LoginEvent::PushApproved)?
            }
            Directive::Authenticated => return Ok(()),
            Directive::Ignored => {
                return Err(Error::Login("Login sequence stalled".into()));
            }
        };
    }
}
