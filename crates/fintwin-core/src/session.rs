//! Session state for one dashboard run
//!
//! The session owns the profile and the advisory conversation log. Profile
//! edits are pure merges (`SessionState::merge`), and advisory requests go
//! through a single slot: while one is outstanding, a second is rejected.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::advisor::Advisor;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::models::{Message, RiskAppetite, UserProfile};

/// Shown instead of a reply when the advisory call fails
pub const CONNECTION_ERROR_NOTICE: &str =
    "Connection error. I'm still securing your data node. Please retry in a moment.";

/// Replaces an empty reply from the advisor
pub const EMPTY_REPLY_FALLBACK: &str =
    "I encountered an error processing your financial data. Please try again.";

/// Opening assistant message for a new session
pub fn greeting(name: &str) -> String {
    format!(
        "Hi {}! I'm here to help you manage your money. \n\n\
         • Your savings are on track.\n\
         • Want to see a plan to reach your goal faster?",
        name
    )
}

/// Field-level profile update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub current_savings: Option<u64>,
    pub savings_per_month: Option<u64>,
    pub monthly_income: Option<u64>,
    pub goal_name: Option<String>,
    pub goal_target: Option<u64>,
    pub goal_deadline_months: Option<u32>,
    pub risk_appetite: Option<RiskAppetite>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch produced by the dashboard's inline edit boxes
    pub fn from_edit(field: EditField, raw: &str) -> Self {
        let amount = parse_amount(raw);
        match field {
            EditField::Assets => Self {
                current_savings: Some(amount),
                ..Default::default()
            },
            EditField::Goal => Self {
                goal_target: Some(amount),
                ..Default::default()
            },
        }
    }

    /// One-line description for the conversation log
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = self.current_savings {
            parts.push(format!("current savings {}", v));
        }
        if let Some(v) = self.savings_per_month {
            parts.push(format!("savings rate {}/mo", v));
        }
        if let Some(v) = self.monthly_income {
            parts.push(format!("monthly income {}", v));
        }
        if let Some(ref v) = self.goal_name {
            parts.push(format!("goal name {}", v));
        }
        if let Some(v) = self.goal_target {
            parts.push(format!("goal target {}", v));
        }
        if let Some(v) = self.goal_deadline_months {
            parts.push(format!("goal deadline {} months", v));
        }
        if let Some(v) = self.risk_appetite {
            parts.push(format!("risk appetite {}", v));
        }
        format!("Profile updated: {}", parts.join(", "))
    }
}

/// Editable dashboard values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    /// Total assets card (current savings)
    Assets,
    /// Goal target card
    Goal,
}

impl std::str::FromStr for EditField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "assets" | "savings" => Ok(Self::Assets),
            "goal" => Ok(Self::Goal),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

/// Parse a numeric edit the lenient way
///
/// Leading whitespace is skipped and the leading run of digits is used
/// ("12abc" is 12). Anything without leading digits is 0, negative input
/// clamps to 0 and overflow saturates.
pub fn parse_amount(raw: &str) -> u64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let value = digits
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        });

    if negative {
        0
    } else {
        value
    }
}

/// Everything one session holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub profile: UserProfile,
    /// Append-only conversation log
    pub messages: Vec<Message>,
    /// An advisory request is outstanding
    pub loading: bool,
}

impl SessionState {
    /// Fresh state for `profile`, opening with the greeting
    pub fn new(profile: UserProfile) -> Self {
        let messages = vec![Message::assistant(greeting(&profile.name))];
        Self {
            profile,
            messages,
            loading: false,
        }
    }

    /// Apply a profile patch, returning the new state
    pub fn merge(mut self, patch: &ProfilePatch) -> Self {
        let profile = &mut self.profile;
        if let Some(v) = patch.current_savings {
            profile.current_savings = v;
        }
        if let Some(v) = patch.savings_per_month {
            profile.savings_per_month = v;
        }
        if let Some(v) = patch.monthly_income {
            profile.monthly_income = v;
        }
        if let Some(ref v) = patch.goal_name {
            profile.goal.name = v.clone();
        }
        if let Some(v) = patch.goal_target {
            profile.goal.target_amount = v;
        }
        if let Some(v) = patch.goal_deadline_months {
            profile.goal.deadline_months = v;
        }
        if let Some(v) = patch.risk_appetite {
            profile.risk_appetite = v;
        }
        self
    }
}

/// Snapshot taken when an advisory request is issued
#[derive(Debug, Clone)]
pub struct PendingAdvice {
    pub profile: UserProfile,
    /// Log as it stood before the prompt was appended
    pub history: Vec<Message>,
    pub prompt: String,
}

/// How an advisory request settled
#[derive(Debug, Clone, PartialEq)]
pub enum AdviceOutcome {
    /// The reply was appended to the log
    Replied(Message),
    /// Nothing was appended; show `notice` to the user
    Failed { notice: String },
}

/// A dashboard session
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            state: SessionState::new(profile),
        }
    }

    /// Start from the configured default profile
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.profile.clone())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn profile(&self) -> &UserProfile {
        &self.state.profile
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Merge a patch into the profile and note it in the log
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if patch.is_empty() {
            return;
        }
        self.state = self.state.clone().merge(patch);
        info!(update = %patch.describe(), "Profile updated");
        self.state
            .messages
            .push(Message::system_alert(patch.describe()));
    }

    /// Apply an inline dashboard edit, returning the stored amount
    pub fn edit(&mut self, field: EditField, raw: &str) -> u64 {
        let patch = ProfilePatch::from_edit(field, raw);
        self.apply(&patch);
        match field {
            EditField::Assets => self.state.profile.current_savings,
            EditField::Goal => self.state.profile.goal.target_amount,
        }
    }

    /// Claim the advisory slot for `prompt`
    ///
    /// Blank prompts are ignored (`Ok(None)`). While another request is
    /// outstanding this fails with `Error::AdvisorBusy`. Otherwise the user
    /// message is appended and the session is marked loading.
    pub fn begin_advice(&mut self, prompt: &str) -> Result<Option<PendingAdvice>> {
        if prompt.trim().is_empty() {
            return Ok(None);
        }
        if self.state.loading {
            warn!("Advisory request rejected: previous request still outstanding");
            return Err(Error::AdvisorBusy);
        }

        let pending = PendingAdvice {
            profile: self.state.profile.clone(),
            history: self.state.messages.clone(),
            prompt: prompt.to_string(),
        };
        self.state.messages.push(Message::user(prompt));
        self.state.loading = true;
        Ok(Some(pending))
    }

    /// Release the advisory slot with the backend's result
    pub fn finish_advice(&mut self, pending: PendingAdvice, result: Result<String>) -> AdviceOutcome {
        self.state.loading = false;

        match result {
            Ok(text) => {
                let content = if text.trim().is_empty() {
                    warn!(prompt = %pending.prompt, "Advisor returned an empty reply");
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    text
                };
                let message = Message::assistant(content);
                self.state.messages.push(message.clone());
                AdviceOutcome::Replied(message)
            }
            Err(e) => {
                error!(error = %e, prompt = %pending.prompt, "Advisory request failed");
                AdviceOutcome::Failed {
                    notice: CONNECTION_ERROR_NOTICE.to_string(),
                }
            }
        }
    }

    /// Send `prompt` to the advisor and record the result
    pub async fn ask(&mut self, advisor: &Advisor, prompt: &str) -> Result<Option<AdviceOutcome>> {
        let Some(pending) = self.begin_advice(prompt)? else {
            return Ok(None);
        };
        let result = advisor
            .advise(&pending.profile, &pending.history, &pending.prompt)
            .await;
        Ok(Some(self.finish_advice(pending, result)))
    }
}
