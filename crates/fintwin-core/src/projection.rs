//! Savings projection and budget health
//!
//! Pure functions over a [`UserProfile`]. Nothing here holds state or
//! caches results; the dashboard recomputes everything whenever the profile
//! changes.
//!
//! Zero denominators are defined rather than propagated:
//! - a budget limit of 0 reads as 0% when nothing was spent, and as 100%
//!   (over budget) when anything was spent
//! - a category share of a zero total is 0%

use serde::{Deserialize, Serialize};

use crate::models::{Category, Expenses, Goal, UserProfile};

/// Horizon used when the goal has no deadline
pub const DEFAULT_HORIZON_MONTHS: u32 = 8;

/// Longest horizon that is ever projected (50 years)
pub const MAX_HORIZON_MONTHS: u32 = 600;

/// One point of the projected savings curve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Months from now (0 = today)
    pub month: u32,
    /// Chart label: "Now", "M1", "M2", ...
    pub label: String,
    /// Projected balance at this month
    pub savings: u64,
    /// Goal target (reference line)
    pub target: u64,
}

/// Budget usage for one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Utilization {
    /// Display percentage, always within [0, 100]
    pub percentage: f64,
    /// True when spending exceeds the limit
    pub is_over: bool,
}

/// Where the goal stands at its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum GoalStatus {
    /// Final balance meets or exceeds the target
    Secured,
    /// Final balance misses the target by this much
    Shortfall(u64),
}

/// Per-category row of the budget health panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub label: &'static str,
    pub spent: u64,
    pub limit: u64,
    pub utilization: Utilization,
    /// Share of total monthly spend, rounded percent
    pub share: u32,
}

/// Everything the dashboard renders for a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub current_savings: u64,
    pub savings_per_month: u64,
    pub monthly_spend: u64,
    pub monthly_surplus: i64,
    pub goal_name: String,
    pub goal_target: u64,
    pub shortfall: i64,
    pub goal_status: GoalStatus,
    pub risk_appetite: String,
    pub risk_strategy: String,
    pub trajectory: Vec<ProjectionPoint>,
    pub categories: Vec<CategoryBreakdown>,
}

impl DashboardSummary {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let horizon = projection_horizon(&profile.goal);
        Self {
            current_savings: profile.current_savings,
            savings_per_month: profile.savings_per_month,
            monthly_spend: total_monthly_spend(&profile.expenses),
            monthly_surplus: monthly_surplus(profile),
            goal_name: profile.goal.name.clone(),
            goal_target: profile.goal.target_amount,
            shortfall: profile_shortfall(profile),
            goal_status: goal_status(profile),
            risk_appetite: profile.risk_appetite.as_str().to_string(),
            risk_strategy: profile.risk_appetite.strategy().to_string(),
            trajectory: projection_for(profile, horizon),
            categories: category_breakdown(profile),
        }
    }
}

/// Sum of all category spending (an absent `other` is already 0)
pub fn total_monthly_spend(expenses: &Expenses) -> u64 {
    Category::all()
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(expenses.get(*c)))
}

/// Months to project: the goal deadline, or the default when it is 0
///
/// Capped at [`MAX_HORIZON_MONTHS`].
pub fn projection_horizon(goal: &Goal) -> u32 {
    if goal.deadline_months == 0 {
        DEFAULT_HORIZON_MONTHS
    } else {
        goal.deadline_months.min(MAX_HORIZON_MONTHS)
    }
}

/// Linear savings balance for months `0..=horizon`
///
/// Returns exactly `horizon + 1` values; index `i` is
/// `current_savings + savings_per_month * i`.
pub fn savings_trajectory(current_savings: u64, savings_per_month: u64, horizon: u32) -> Vec<u64> {
    (0..=horizon)
        .map(|i| balance_after(current_savings, savings_per_month, i))
        .collect()
}

/// Labelled trajectory for a profile over an explicit horizon
pub fn projection_for(profile: &UserProfile, horizon: u32) -> Vec<ProjectionPoint> {
    savings_trajectory(profile.current_savings, profile.savings_per_month, horizon)
        .into_iter()
        .enumerate()
        .map(|(i, savings)| ProjectionPoint {
            month: i as u32,
            label: if i == 0 {
                "Now".to_string()
            } else {
                format!("M{}", i)
            },
            savings,
            target: profile.goal.target_amount,
        })
        .collect()
}

/// Target minus the balance at the deadline
///
/// Positive means the goal is missed by that amount; zero or negative means
/// it is secured. A deadline of 0 compares against today's balance.
pub fn shortfall(
    target_amount: u64,
    current_savings: u64,
    savings_per_month: u64,
    deadline_months: u32,
) -> i64 {
    let final_point = balance_after(current_savings, savings_per_month, deadline_months);
    let diff = target_amount as i128 - final_point as i128;
    diff.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Shortfall for a profile's goal
pub fn profile_shortfall(profile: &UserProfile) -> i64 {
    shortfall(
        profile.goal.target_amount,
        profile.current_savings,
        profile.savings_per_month,
        profile.goal.deadline_months,
    )
}

pub fn goal_status(profile: &UserProfile) -> GoalStatus {
    match profile_shortfall(profile) {
        s if s <= 0 => GoalStatus::Secured,
        s => GoalStatus::Shortfall(s as u64),
    }
}

/// Budget usage of one category, capped at 100% for display
pub fn budget_utilization(spent: u64, limit: u64) -> Utilization {
    let is_over = spent > limit;
    let percentage = if limit == 0 {
        if spent == 0 {
            0.0
        } else {
            100.0
        }
    } else {
        (spent as f64 / limit as f64 * 100.0).min(100.0)
    };
    Utilization {
        percentage,
        is_over,
    }
}

/// Share of total spend as a rounded integer percentage
pub fn category_share(spend: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (spend as f64 / total as f64 * 100.0).round() as u32
}

/// Income left after this month's spending (negative when overspending)
pub fn monthly_surplus(profile: &UserProfile) -> i64 {
    let spend = total_monthly_spend(&profile.expenses);
    let diff = profile.monthly_income as i128 - spend as i128;
    diff.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

pub fn category_breakdown(profile: &UserProfile) -> Vec<CategoryBreakdown> {
    let total = total_monthly_spend(&profile.expenses);
    Category::all()
        .iter()
        .map(|&category| {
            let spent = profile.expenses.get(category);
            let limit = profile.budget_limits.get(category);
            CategoryBreakdown {
                category,
                label: category.label(),
                spent,
                limit,
                utilization: budget_utilization(spent, limit),
                share: category_share(spent, total),
            }
        })
        .collect()
}

fn balance_after(current_savings: u64, savings_per_month: u64, months: u32) -> u64 {
    current_savings.saturating_add(savings_per_month.saturating_mul(months as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn default_profile() -> UserProfile {
        AppConfig::embedded().unwrap().profile
    }

    #[test]
    fn test_total_spend_default_profile() {
        let profile = default_profile();
        assert_eq!(total_monthly_spend(&profile.expenses), 12000);
    }

    #[test]
    fn test_total_spend_without_other() {
        let expenses = Expenses {
            food: 100,
            travel: 50,
            subscriptions: 25,
            other: 0,
        };
        assert_eq!(total_monthly_spend(&expenses), 175);
    }

    #[test]
    fn test_trajectory_shape() {
        for (current, rate, horizon) in [(0, 0, 0), (25000, 3000, 8), (10, 7, 30), (5, 0, 3)] {
            let points = savings_trajectory(current, rate, horizon);
            assert_eq!(points.len(), horizon as usize + 1);
            assert_eq!(points[0], current);
            for pair in points.windows(2) {
                assert_eq!(pair[1] - pair[0], rate);
            }
        }
    }

    #[test]
    fn test_zero_horizon_is_single_point() {
        assert_eq!(savings_trajectory(25000, 3000, 0), vec![25000]);
    }

    #[test]
    fn test_projection_horizon_defaults_to_eight() {
        let mut goal = default_profile().goal;
        goal.deadline_months = 0;
        assert_eq!(projection_horizon(&goal), 8);
        goal.deadline_months = 3;
        assert_eq!(projection_horizon(&goal), 3);
    }

    #[test]
    fn test_projection_horizon_is_capped() {
        let mut goal = default_profile().goal;
        goal.deadline_months = u32::MAX;
        assert_eq!(projection_horizon(&goal), MAX_HORIZON_MONTHS);
        assert_eq!(projection_for(&default_profile(), projection_horizon(&goal)).len(), 601);
    }

    #[test]
    fn test_projection_labels_and_target() {
        let profile = default_profile();
        let points = projection_for(&profile, 2);
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Now", "M1", "M2"]);
        assert!(points.iter().all(|p| p.target == 60000));
        assert_eq!(points[2].savings, 31000);
    }

    #[test]
    fn test_shortfall_laptop_example() {
        assert_eq!(shortfall(60000, 25000, 3000, 8), 11000);
        let profile = default_profile();
        assert_eq!(goal_status(&profile), GoalStatus::Shortfall(11000));
    }

    #[test]
    fn test_shortfall_secured() {
        assert_eq!(shortfall(40000, 25000, 3000, 8), -9000);
        let mut profile = default_profile();
        profile.goal.target_amount = 49000;
        assert_eq!(goal_status(&profile), GoalStatus::Secured);
    }

    #[test]
    fn test_shortfall_zero_deadline_uses_today() {
        assert_eq!(shortfall(60000, 25000, 3000, 0), 35000);
    }

    #[test]
    fn test_shortfall_non_increasing_in_rate() {
        let mut previous = i64::MAX;
        for rate in (0..10_000).step_by(250) {
            let s = shortfall(60000, 25000, rate, 8);
            assert!(s <= previous);
            previous = s;
        }
    }

    #[test]
    fn test_shortfall_saturates() {
        assert_eq!(shortfall(0, u64::MAX, u64::MAX, 12), i64::MIN);
        assert_eq!(shortfall(u64::MAX, 0, 0, 0), i64::MAX);
    }

    #[test]
    fn test_utilization_capped() {
        let u = budget_utilization(5000, 4500);
        assert!(u.is_over);
        assert_eq!(u.percentage, 100.0);

        let u = budget_utilization(4000, 4500);
        assert!(!u.is_over);
        assert!((u.percentage - 88.888).abs() < 0.01);

        let u = budget_utilization(4500, 4500);
        assert!(!u.is_over);
        assert_eq!(u.percentage, 100.0);
    }

    #[test]
    fn test_utilization_range_and_over_flag() {
        for spent in [0u64, 1, 99, 100, 101, 1_000_000] {
            for limit in [0u64, 1, 100, 5000] {
                let u = budget_utilization(spent, limit);
                assert!((0.0..=100.0).contains(&u.percentage));
                assert_eq!(u.is_over, spent > limit);
            }
        }
    }

    #[test]
    fn test_utilization_zero_limit() {
        assert_eq!(
            budget_utilization(0, 0),
            Utilization {
                percentage: 0.0,
                is_over: false
            }
        );
        assert_eq!(
            budget_utilization(10, 0),
            Utilization {
                percentage: 100.0,
                is_over: true
            }
        );
    }

    #[test]
    fn test_category_share() {
        assert_eq!(category_share(4000, 12000), 33);
        assert_eq!(category_share(5000, 12000), 42);
        assert_eq!(category_share(100, 0), 0);
    }

    #[test]
    fn test_shares_sum_close_to_hundred() {
        let profile = default_profile();
        let rows = category_breakdown(&profile);
        let sum: i64 = rows.iter().map(|r| r.share as i64).sum();
        let slack = (Category::all().len() - 1) as i64;
        assert!((sum - 100).abs() <= slack, "sum was {}", sum);
    }

    #[test]
    fn test_breakdown_default_profile() {
        let rows = category_breakdown(&default_profile());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].label, "Food");
        assert_eq!(rows[0].share, 33);
        assert!(rows.iter().all(|r| !r.utilization.is_over));
    }

    #[test]
    fn test_monthly_surplus() {
        let mut profile = default_profile();
        assert_eq!(monthly_surplus(&profile), 3000);
        profile.monthly_income = 10000;
        assert_eq!(monthly_surplus(&profile), -2000);
    }

    #[test]
    fn test_dashboard_summary() {
        let summary = DashboardSummary::from_profile(&default_profile());
        assert_eq!(summary.monthly_spend, 12000);
        assert_eq!(summary.shortfall, 11000);
        assert_eq!(summary.trajectory.len(), 9);
        assert_eq!(summary.trajectory.last().unwrap().savings, 49000);
        assert_eq!(summary.risk_strategy, "Conservative");
    }
}
