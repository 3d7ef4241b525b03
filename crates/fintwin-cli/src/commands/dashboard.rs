//! Dashboard views (dashboard, project, budget)

use std::fmt::Write;

use anyhow::Result;
use fintwin_core::projection::{self, projection_for, projection_horizon};
use fintwin_core::{AppConfig, DashboardSummary, GoalStatus, UserProfile};

use super::{bar, format_currency, format_signed};

const BAR_WIDTH: usize = 24;

pub fn cmd_dashboard(config: &AppConfig, json: bool) -> Result<()> {
    let summary = DashboardSummary::from_profile(&config.profile);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print!("{}", render_dashboard(&config.profile, &config.currency));
    Ok(())
}

pub fn cmd_project(config: &AppConfig, months: Option<u32>) -> Result<()> {
    print!(
        "{}",
        render_projection(&config.profile, &config.currency, months)
    );
    Ok(())
}

pub fn cmd_budget(config: &AppConfig) -> Result<()> {
    print!("{}", render_budget(&config.profile, &config.currency));
    Ok(())
}

/// Text for the goal card's trend line
pub fn goal_trend(status: GoalStatus, currency: &str) -> String {
    match status {
        GoalStatus::Secured => "Goal Secured".to_string(),
        GoalStatus::Shortfall(amount) => format!("Shortfall: {}", format_currency(currency, amount)),
    }
}

pub fn render_dashboard(profile: &UserProfile, currency: &str) -> String {
    let summary = DashboardSummary::from_profile(profile);
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "╭─────────────────────────────────────────╮");
    let _ = writeln!(out, "│          💰 FinTwin Dashboard           │");
    let _ = writeln!(out, "╰─────────────────────────────────────────╯");
    let _ = writeln!(out);
    let _ = writeln!(out, "  {} · {}, {}", profile.name, profile.age, profile.occupation);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Current Savings:  {:<12} +{}/mo",
        format_currency(currency, summary.current_savings),
        format_currency(currency, summary.savings_per_month)
    );
    let _ = writeln!(
        out,
        "  Monthly Burn:     {:<12} Calculated",
        format_currency(currency, summary.monthly_spend)
    );
    let _ = writeln!(
        out,
        "  {} Target:{}{:<12} {}",
        summary.goal_name,
        " ".repeat(10usize.saturating_sub(summary.goal_name.chars().count())),
        format_currency(currency, summary.goal_target),
        goal_trend(summary.goal_status, currency)
    );
    let _ = writeln!(
        out,
        "  Risk Strategy:    {:<12} {}",
        summary.risk_appetite, summary.risk_strategy
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  💸 This month: income {}, spend {}, surplus {}",
        format_currency(currency, profile.monthly_income),
        format_currency(currency, summary.monthly_spend),
        format_signed(currency, summary.monthly_surplus)
    );

    out.push_str(&render_projection(profile, currency, None));
    out.push_str(&render_budget(profile, currency));

    if let GoalStatus::Shortfall(_) = summary.goal_status {
        let _ = writeln!(
            out,
            "  Run 'fintwin ask --action optimize' for a plan to close the gap."
        );
        let _ = writeln!(out);
    }
    out
}

pub fn render_projection(profile: &UserProfile, currency: &str, months: Option<u32>) -> String {
    let horizon = months.unwrap_or_else(|| projection_horizon(&profile.goal));
    let points = projection_for(profile, horizon);
    let scale = points
        .iter()
        .map(|p| p.savings)
        .chain(std::iter::once(profile.goal.target_amount))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  📈 Savings Projection ({} months)", horizon);
    let _ = writeln!(out, "     ─────────────────────────────────────────────────");
    for point in &points {
        let fraction = if scale == 0 {
            0.0
        } else {
            point.savings as f64 / scale as f64
        };
        let marker = if point.savings >= point.target { " ✓" } else { "" };
        let _ = writeln!(
            out,
            "     {:<4} {:>12}  {}{}",
            point.label,
            format_currency(currency, point.savings),
            bar(fraction, BAR_WIDTH),
            marker
        );
    }
    let _ = writeln!(
        out,
        "     Target: {}",
        format_currency(currency, profile.goal.target_amount)
    );
    out
}

pub fn render_budget(profile: &UserProfile, currency: &str) -> String {
    let breakdown = projection::category_breakdown(profile);

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  🩺 Budget Health");
    let _ = writeln!(out, "     ─────────────────────────────────────────────────");
    for row in &breakdown {
        let flag = if row.utilization.is_over { "  ⚠️  over" } else { "" };
        let _ = writeln!(
            out,
            "     {:<6} {:>9} / {:<9} {:>4.0}%  {}{}",
            row.label,
            format_currency(currency, row.spent),
            format_currency(currency, row.limit),
            row.utilization.percentage,
            bar(row.utilization.percentage / 100.0, 12),
            flag
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  🥧 Spending Mix");
    let _ = writeln!(out, "     ─────────────────────────────────────────────────");
    for row in &breakdown {
        let _ = writeln!(out, "     {:<6} {:>3}%", row.label, row.share);
    }
    let _ = writeln!(out);
    out
}
