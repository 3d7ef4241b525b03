//! Advisor request types
//!
//! These types are backend-agnostic and used across all advisor implementations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prompts::PromptId;

/// Speaker of a conversation turn sent to a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One prior exchange entry forwarded as conversation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Everything a backend needs to produce one reply
#[derive(Debug, Clone)]
pub struct AdviceRequest {
    /// Persona and profile context, rendered from the advisor system prompt
    pub system_instruction: String,
    /// Prior conversation, oldest first, always starting with a user turn
    pub history: Vec<Turn>,
    /// The new user prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
}

/// Canned prompts offered next to the chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickAction {
    SummarizeSpending,
    GoalStatus,
    SavingTips,
    /// The dashboard's "Optimize Now" button
    Optimize,
}

impl QuickAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SummarizeSpending => "summarize",
            Self::GoalStatus => "goal",
            Self::SavingTips => "tips",
            Self::Optimize => "optimize",
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            Self::SummarizeSpending => "Summarize Spending",
            Self::GoalStatus => "Goal Status",
            Self::SavingTips => "Saving Tips",
            Self::Optimize => "Optimize Now",
        }
    }

    pub fn all() -> &'static [QuickAction] {
        &[
            Self::SummarizeSpending,
            Self::GoalStatus,
            Self::SavingTips,
            Self::Optimize,
        ]
    }

    /// Prompt template backing this action
    pub fn prompt_id(&self) -> PromptId {
        match self {
            Self::SummarizeSpending => PromptId::SummarizeSpending,
            Self::GoalStatus => PromptId::GoalStatus,
            Self::SavingTips => PromptId::SavingTips,
            Self::Optimize => PromptId::OptimizePlan,
        }
    }
}

impl std::str::FromStr for QuickAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summarize" | "summary" => Ok(Self::SummarizeSpending),
            "goal" | "goal-status" => Ok(Self::GoalStatus),
            "tips" => Ok(Self::SavingTips),
            "optimize" => Ok(Self::Optimize),
            _ => Err(format!(
                "Unknown action: {} (expected summarize, goal, tips or optimize)",
                s
            )),
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
