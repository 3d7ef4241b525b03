//! Domain models for FinTwin

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::projection::MAX_HORIZON_MONTHS;

/// Spending categories tracked on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Travel,
    Subscriptions,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Travel => "travel",
            Self::Subscriptions => "subscriptions",
            Self::Other => "other",
        }
    }

    /// Short label used in charts and tables
    pub fn label(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Travel => "Travel",
            Self::Subscriptions => "Subs",
            Self::Other => "Other",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [Category] {
        &[Self::Food, Self::Travel, Self::Subscriptions, Self::Other]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "travel" => Ok(Self::Travel),
            "subscriptions" | "subs" => Ok(Self::Subscriptions),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Amount spent per category this period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expenses {
    pub food: u64,
    pub travel: u64,
    pub subscriptions: u64,
    /// Optional in profile files, absent means nothing spent
    #[serde(default)]
    pub other: u64,
}

impl Expenses {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Food => self.food,
            Category::Travel => self.travel,
            Category::Subscriptions => self.subscriptions,
            Category::Other => self.other,
        }
    }
}

/// Spending ceiling per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLimits {
    pub food: u64,
    pub travel: u64,
    pub subscriptions: u64,
    pub other: u64,
}

impl BudgetLimits {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Food => self.food,
            Category::Travel => self.travel,
            Category::Subscriptions => self.subscriptions,
            Category::Other => self.other,
        }
    }
}

/// A savings goal with a target and a deadline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    pub target_amount: u64,
    pub deadline_months: u32,
}

/// Advisory risk label (not used in any computation)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskAppetite {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskAppetite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Strategy label shown next to the risk card
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Low => "Conservative",
            Self::Medium => "Balanced",
            Self::High => "Aggressive",
        }
    }
}

impl std::str::FromStr for RiskAppetite {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown risk appetite: {}", s)),
        }
    }
}

impl std::fmt::Display for RiskAppetite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user's financial profile for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub occupation: String,
    pub monthly_income: u64,
    pub expenses: Expenses,
    pub budget_limits: BudgetLimits,
    pub savings_per_month: u64,
    pub current_savings: u64,
    pub goal: Goal,
    #[serde(default)]
    pub risk_appetite: RiskAppetite,
}

impl UserProfile {
    /// Check the fields the type system cannot
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidData("Profile name cannot be empty".into()));
        }
        if self.goal.name.trim().is_empty() {
            return Err(Error::InvalidData("Goal name cannot be empty".into()));
        }
        if self.goal.deadline_months > MAX_HORIZON_MONTHS {
            return Err(Error::InvalidData(format!(
                "Goal deadline cannot exceed {} months",
                MAX_HORIZON_MONTHS
            )));
        }
        Ok(())
    }
}

/// Who authored a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    SystemAlert,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::SystemAlert => "system_alert",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An entry in the advisory conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system_alert(content: impl Into<String>) -> Self {
        Self::new(Role::SystemAlert, content)
    }
}
