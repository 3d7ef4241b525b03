//! Pluggable advisor backend abstraction
//!
//! This module provides a backend-agnostic interface for the chat advisor:
//! one operation, `advise(profile, history, prompt) -> text | error`.
//!
//! # Architecture
//!
//! - `AdvisorBackend` trait: defines the interface for all backends
//! - `AdvisorClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OpenAICompatibleBackend`, `MockBackend`
//! - `Advisor`: renders the profile into a system instruction and forwards
//!   the conversation to the client
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = AdvisorClient::from_env().ok_or("no advisor configured")?;
//! let advisor = Advisor::new(client, config.advisor.clone(), &config.currency);
//! let reply = advisor.advise(&profile, &messages, "How am I doing?").await?;
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `ADVISOR_BACKEND`: Backend to use (gemini, openai_compatible, mock). Default: gemini
//! - `GEMINI_API_KEY` / `API_KEY`, `GEMINI_MODEL`, `GEMINI_HOST`
//! - `OPENAI_COMPATIBLE_HOST`, `OPENAI_COMPATIBLE_MODEL`, `OPENAI_COMPATIBLE_API_KEY`

mod gemini;
mod mock;
mod openai_compatible;
pub mod types;

pub use gemini::{GeminiBackend, DEFAULT_GEMINI_HOST, DEFAULT_GEMINI_MODEL};
pub use mock::{canned_reply, MockBackend};
pub use openai_compatible::{OpenAICompatibleBackend, DEFAULT_OPENAI_MODEL};
pub use types::*;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::config::{AdvisorSettings, AppConfig};
use crate::error::{Error, Result};
use crate::models::{Category, Message, Role, UserProfile};
use crate::projection;
use crate::prompts::{PromptId, PromptLibrary};

/// Trait defining the interface for all advisor backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AdvisorBackend: Send + Sync {
    /// Produce a reply to `request.prompt` given the instruction and history
    async fn advise(&self, request: &AdviceRequest) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete advisor client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AdvisorClient {
    /// Gemini generateContent API
    Gemini(GeminiBackend),
    /// OpenAI-compatible chat completions (OpenAI, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AdvisorClient {
    /// Create an advisor client from environment variables
    ///
    /// Checks `ADVISOR_BACKEND` to determine which backend to use:
    /// - `gemini` (default): Uses GEMINI_API_KEY (or API_KEY), GEMINI_MODEL, GEMINI_HOST
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `mock`: Creates a mock backend
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("ADVISOR_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" | "google" => GeminiBackend::from_env().map(AdvisorClient::Gemini),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AdvisorClient::OpenAICompatible)
            }
            "mock" => Some(AdvisorClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown ADVISOR_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(AdvisorClient::Gemini)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AdvisorClient::Mock(MockBackend::new())
    }

    /// Short backend name for display
    pub fn kind(&self) -> &'static str {
        match self {
            AdvisorClient::Gemini(_) => "gemini",
            AdvisorClient::OpenAICompatible(_) => "openai_compatible",
            AdvisorClient::Mock(_) => "mock",
        }
    }
}

// Implement AdvisorBackend for AdvisorClient by delegating to the inner backend
#[async_trait]
impl AdvisorBackend for AdvisorClient {
    async fn advise(&self, request: &AdviceRequest) -> Result<String> {
        match self {
            AdvisorClient::Gemini(b) => b.advise(request).await,
            AdvisorClient::OpenAICompatible(b) => b.advise(request).await,
            AdvisorClient::Mock(b) => b.advise(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AdvisorClient::Gemini(b) => b.health_check().await,
            AdvisorClient::OpenAICompatible(b) => b.health_check().await,
            AdvisorClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AdvisorClient::Gemini(b) => b.model(),
            AdvisorClient::OpenAICompatible(b) => b.model(),
            AdvisorClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AdvisorClient::Gemini(b) => b.host(),
            AdvisorClient::OpenAICompatible(b) => b.host(),
            AdvisorClient::Mock(b) => b.host(),
        }
    }
}

/// Advisory service: profile-aware front for an `AdvisorClient`
#[derive(Clone)]
pub struct Advisor {
    client: AdvisorClient,
    prompts: Arc<RwLock<PromptLibrary>>,
    settings: AdvisorSettings,
    currency: String,
}

impl Advisor {
    pub fn new(client: AdvisorClient, settings: AdvisorSettings, currency: &str) -> Self {
        Self {
            client,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
            settings,
            currency: currency.to_string(),
        }
    }

    /// Build from loaded configuration
    pub fn from_config(client: AdvisorClient, config: &AppConfig) -> Self {
        Self::new(client, config.advisor.clone(), &config.currency)
    }

    /// Replace the prompt library (e.g. embedded-only in tests)
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    pub fn client(&self) -> &AdvisorClient {
        &self.client
    }

    pub fn settings(&self) -> &AdvisorSettings {
        &self.settings
    }

    /// Render the persona and profile context sent as the system instruction
    pub fn system_instruction(&self, profile: &UserProfile) -> Result<String> {
        let monthly_income = profile.monthly_income.to_string();
        let monthly_spending = projection::total_monthly_spend(&profile.expenses).to_string();
        let savings_per_month = profile.savings_per_month.to_string();
        let current_savings = profile.current_savings.to_string();
        let goal_target = profile.goal.target_amount.to_string();
        let deadline_months = profile.goal.deadline_months.to_string();
        let age = profile.age.to_string();
        let limits = limits_summary(profile, &self.currency);
        let shortfall_amount = projection::profile_shortfall(profile);
        let shortfall = if shortfall_amount > 0 {
            shortfall_amount.to_string()
        } else {
            String::new()
        };

        let mut vars = HashMap::new();
        vars.insert("name", profile.name.as_str());
        vars.insert("age", age.as_str());
        vars.insert("occupation", profile.occupation.as_str());
        vars.insert("currency", self.currency.as_str());
        vars.insert("monthly_income", monthly_income.as_str());
        vars.insert("monthly_spending", monthly_spending.as_str());
        vars.insert("savings_per_month", savings_per_month.as_str());
        vars.insert("current_savings", current_savings.as_str());
        vars.insert("goal_name", profile.goal.name.as_str());
        vars.insert("goal_target", goal_target.as_str());
        vars.insert("deadline_months", deadline_months.as_str());
        vars.insert("limits", limits.as_str());
        vars.insert("risk_appetite", profile.risk_appetite.as_str());
        vars.insert("shortfall", shortfall.as_str());

        // `PromptLibrary::get` fills its cache, so lookups need the write lock
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::Prompt("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(PromptId::AdvisorSystem)?;
        Ok(template.render_system(&vars))
    }

    /// Render the user prompt behind a quick action
    pub fn quick_action_prompt(&self, action: QuickAction, profile: &UserProfile) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("goal_name", profile.goal.name.as_str());
        vars.insert("currency", self.currency.as_str());

        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::Prompt("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(action.prompt_id())?;
        Ok(template.render_user(&vars))
    }

    /// Assemble the backend request for one prompt
    pub fn build_request(
        &self,
        profile: &UserProfile,
        history: &[Message],
        prompt: &str,
    ) -> Result<AdviceRequest> {
        Ok(AdviceRequest {
            system_instruction: self.system_instruction(profile)?,
            history: history_turns(history, self.settings.max_history),
            prompt: prompt.to_string(),
            temperature: self.settings.temperature,
        })
    }

    /// Ask the backend for advice
    ///
    /// `history` is the log before `prompt` was appended.
    pub async fn advise(
        &self,
        profile: &UserProfile,
        history: &[Message],
        prompt: &str,
    ) -> Result<String> {
        let request = self.build_request(profile, history, prompt)?;
        debug!(
            backend = self.client.kind(),
            model = self.client.model(),
            turns = request.history.len(),
            "Sending advisory request"
        );
        self.client.advise(&request).await
    }
}

/// Convert the message log into backend turns
///
/// System alerts are UI-only and never sent. The most recent `max` entries
/// are kept. The result opens with a user turn, strictly alternates roles
/// (questions left unanswered by a failed call are merged into the next
/// user turn) and ends with an assistant turn, since the new prompt follows.
pub fn history_turns(history: &[Message], max: usize) -> Vec<Turn> {
    let turns: Vec<Turn> = history
        .iter()
        .filter_map(|m| match m.role {
            Role::User => Some(Turn::user(m.content.clone())),
            Role::Assistant => Some(Turn::assistant(m.content.clone())),
            Role::SystemAlert => None,
        })
        .collect();

    let start = turns.len().saturating_sub(max);
    let mut merged: Vec<Turn> = Vec::with_capacity(turns.len() - start);
    for turn in turns
        .into_iter()
        .skip(start)
        .skip_while(|t| t.role == TurnRole::Assistant)
    {
        match merged.last_mut() {
            Some(last) if last.role == turn.role => {
                last.content.push_str("\n\n");
                last.content.push_str(&turn.content);
            }
            _ => merged.push(turn),
        }
    }

    if merged.last().is_some_and(|t| t.role == TurnRole::User) {
        merged.pop();
    }
    merged
}

/// "food: limit ₹4500, current ₹4000, travel: ..." in display order
fn limits_summary(profile: &UserProfile, currency: &str) -> String {
    Category::all()
        .iter()
        .map(|&c| {
            format!(
                "{}: limit {}{}, current {}{}",
                c.as_str(),
                currency,
                profile.budget_limits.get(c),
                currency,
                profile.expenses.get(c)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advisor(client: AdvisorClient) -> Advisor {
        let config = AppConfig::embedded().unwrap();
        Advisor::from_config(client, &config).with_prompts(PromptLibrary::embedded_only())
    }

    fn profile() -> UserProfile {
        AppConfig::embedded().unwrap().profile
    }

    #[test]
    fn test_advisor_client_mock() {
        let client = AdvisorClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
        assert_eq!(client.kind(), "mock");
    }

    #[test]
    fn test_system_instruction_includes_profile() {
        let advisor = advisor(AdvisorClient::mock());
        let text = advisor.system_instruction(&profile()).unwrap();

        assert!(text.contains("Rahul Sharma, a 22-year-old Engineering Student"));
        assert!(text.contains("Monthly Spending: ₹12000"));
        assert!(text.contains("Goal: Laptop (Target: ₹60000)"));
        assert!(text.contains("food: limit ₹4500, current ₹4000"));
        assert!(text.contains("Projected Shortfall at deadline: ₹11000"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_system_instruction_keeps_context_with_braces_in_profile() {
        let advisor = advisor(AdvisorClient::mock());
        let mut profile = profile();
        profile.occupation = "Student {{#if nope}}".to_string();
        profile.goal.name = "{{name}}".to_string();

        let text = advisor.system_instruction(&profile).unwrap();
        assert!(text.contains("a 22-year-old Student {{#if nope}}"));
        assert!(text.contains("Monthly Income: ₹15000"));
        assert!(text.contains("Goal: {{name}} (Target: ₹60000)"));
        assert!(text.contains("food: limit ₹4500, current ₹4000"));
        assert!(text.contains("Projected Shortfall at deadline: ₹11000"));
    }

    #[test]
    fn test_system_instruction_omits_secured_shortfall() {
        let advisor = advisor(AdvisorClient::mock());
        let mut profile = profile();
        profile.current_savings = 60000;

        let text = advisor.system_instruction(&profile).unwrap();
        assert!(!text.contains("Shortfall at deadline"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_quick_action_prompts() {
        let advisor = advisor(AdvisorClient::mock());
        let profile = profile();

        assert_eq!(
            advisor
                .quick_action_prompt(QuickAction::GoalStatus, &profile)
                .unwrap(),
            "How am I doing on my Laptop goal?"
        );
        assert_eq!(
            advisor
                .quick_action_prompt(QuickAction::Optimize, &profile)
                .unwrap(),
            "Give me a simple plan to reach my goal based on my current spending."
        );
    }

    #[test]
    fn test_history_turns_drops_alerts_and_leading_assistant() {
        let history = vec![
            Message::assistant("Hi Rahul!"),
            Message::user("How much did I spend?"),
            Message::system_alert("Savings updated"),
            Message::assistant("12000 this month."),
        ];

        let turns = history_turns(&history, 20);
        assert_eq!(
            turns,
            vec![
                Turn::user("How much did I spend?"),
                Turn::assistant("12000 this month."),
            ]
        );
    }

    #[test]
    fn test_history_turns_keeps_most_recent() {
        let history: Vec<Message> = (0..10)
            .flat_map(|i| {
                vec![
                    Message::user(format!("q{}", i)),
                    Message::assistant(format!("a{}", i)),
                ]
            })
            .collect();

        let turns = history_turns(&history, 5);
        // Window of 5 starts on an assistant turn, which is dropped
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0], Turn::user("q8"));
        assert_eq!(turns[3], Turn::assistant("a9"));
    }

    #[test]
    fn test_history_turns_alternate_after_failed_call() {
        // "q1" got no reply, "q3" is still unanswered
        let history = vec![
            Message::assistant("Hi Rahul!"),
            Message::user("q1"),
            Message::user("q2"),
            Message::assistant("a2"),
            Message::system_alert("Savings updated"),
            Message::assistant("a2 follow-up"),
            Message::user("q3"),
        ];

        let turns = history_turns(&history, 20);
        assert_eq!(
            turns,
            vec![
                Turn::user("q1\n\nq2"),
                Turn::assistant("a2\n\na2 follow-up"),
            ]
        );
        assert!(history_turns(&[Message::user("only")], 20).is_empty());
    }

    #[tokio::test]
    async fn test_advise_forwards_request() {
        let mock = MockBackend::new();
        let advisor = advisor(AdvisorClient::Mock(mock.clone()));
        let history = vec![Message::assistant("greeting")];

        let reply = advisor
            .advise(&profile(), &history, "Give me 3 quick tips to save more this month.")
            .await
            .unwrap();
        assert!(reply.starts_with("Here are 3 quick tips"));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].history.is_empty());
        assert!((requests[0].temperature - 0.7).abs() < f32::EPSILON);
        assert!(requests[0].system_instruction.contains("You are FinTwin"));
    }

    #[tokio::test]
    async fn test_advise_propagates_failure() {
        let advisor = advisor(AdvisorClient::Mock(MockBackend::failing()));
        let result = advisor.advise(&profile(), &[], "hello").await;
        assert!(matches!(result, Err(Error::Advisor(_))));
    }

    #[test]
    fn test_quick_action_parse() {
        assert_eq!(
            "summary".parse::<QuickAction>().unwrap(),
            QuickAction::SummarizeSpending
        );
        assert!("dance".parse::<QuickAction>().is_err());
        assert_eq!(QuickAction::all().len(), 4);
    }
}
