//! FinTwin Core Library
//!
//! Shared functionality for the FinTwin personal finance dashboard:
//! - User profile and conversation models
//! - Savings projection and budget health calculations
//! - Session state with pure profile merges and a single-slot advisor queue
//! - Pluggable advisor backends (Gemini, OpenAI-compatible, mock)
//! - Prompt library for customizable advisor prompts
//! - Layered configuration (embedded defaults + override file)
//! - Scripted login sequence state machine

pub mod advisor;
pub mod config;
pub mod error;
pub mod login;
pub mod models;
pub mod projection;
pub mod prompts;
pub mod session;

/// Test utilities including a mock advisor server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::{
    AdviceRequest, Advisor, AdvisorBackend, AdvisorClient, GeminiBackend, MockBackend,
    OpenAICompatibleBackend, QuickAction, Turn, TurnRole,
};
pub use config::{AdvisorSettings, AppConfig};
pub use error::{Error, Result};
pub use login::{run_login, AuthStage, Directive, LoginEvent, LoginSequence, LoginUpdate};
pub use models::{
    BudgetLimits, Category, Expenses, Goal, Message, RiskAppetite, Role, UserProfile,
};
pub use projection::{
    CategoryBreakdown, DashboardSummary, GoalStatus, ProjectionPoint, Utilization,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use session::{
    AdviceOutcome, EditField, PendingAdvice, ProfilePatch, Session, SessionState,
};
