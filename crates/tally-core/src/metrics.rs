//! Derived metrics for budgets and the dashboard
//!
//! Turns raw limits, totals and expense lists into display-ready aggregates:
//! - Budget status: remaining amount, percentage used, GREEN/YELLOW/RED tier
//! - Month-over-month comparison
//! - Category breakdown, daily trend and headline dashboard stats
//!
//! Percentages follow the backend's rounding: the ratio is rounded to four
//! decimal places and then scaled to a percentage.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{
    Budget, CategorySpending, ComparisonStatus, DailyTrend, DashboardStats, Expense,
    MonthlyComparison,
};

/// Percentage used at which a budget turns yellow
pub const WARNING_THRESHOLD: f64 = 80.0;

/// Percentage used at which a budget turns red
pub const OVER_BUDGET_THRESHOLD: f64 = 100.0;

/// `part / whole` as a percentage with two decimals (ratio rounded to 4 places)
pub fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    positive_zero(((part / whole) * 10_000.0).round() / 100.0)
}

/// Round a money amount to cents
pub fn round_cents(amount: f64) -> f64 {
    positive_zero((amount * 100.0).round() / 100.0)
}

/// `-0.0` prints as "-0.00"; fold it into `0.0`
fn positive_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Format an amount as dollars with two decimals
pub fn format_money(amount: f64) -> String {
    let amount = round_cents(amount);
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

/// Spend-versus-limit classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetTier {
    Green,
    Yellow,
    Red,
}

impl BudgetTier {
    /// Band a percentage; each tier's lower bound is inclusive
    pub fn from_percentage(percentage_used: f64) -> Self {
        if percentage_used >= OVER_BUDGET_THRESHOLD {
            Self::Red
        } else if percentage_used >= WARNING_THRESHOLD {
            Self::Yellow
        } else {
            Self::Green
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

impl std::fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget status derived from a limit and the amount spent against it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStatus {
    pub monthly_limit: f64,
    pub total_spent: f64,
    /// May be negative when over budget
    pub remaining_amount: f64,
    /// Not clamped; 120.0 means 20% over
    pub percentage_used: f64,
    pub tier: BudgetTier,
}

impl BudgetStatus {
    pub fn compute(monthly_limit: f64, total_spent: f64) -> Self {
        let percentage_used = percentage_of(total_spent, monthly_limit);
        Self {
            monthly_limit,
            total_spent,
            remaining_amount: round_cents(monthly_limit - total_spent),
            percentage_used,
            tier: BudgetTier::from_percentage(percentage_used),
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining_amount < 0.0
    }

    /// Width of a progress bar in percent; clamped for rendering only
    pub fn progress_width(&self) -> f64 {
        self.percentage_used.clamp(0.0, 100.0)
    }

    /// "Left: $X.XX" or "Over budget: $X.XX"
    pub fn remaining_label(&self) -> String {
        if self.is_over_budget() {
            format!("Over budget: {}", format_money(self.remaining_amount.abs()))
        } else {
            format!("Left: {}", format_money(self.remaining_amount))
        }
    }
}

impl Budget {
    /// Status recomputed from the limit and total spent
    pub fn status(&self) -> BudgetStatus {
        BudgetStatus::compute(self.monthly_limit, self.total_spent)
    }
}

impl MonthlyComparison {
    pub fn compute(current_month_spent: f64, previous_month_spent: f64) -> Self {
        let (percentage_change, status) = if previous_month_spent > 0.0 {
            let change =
                percentage_of(current_month_spent - previous_month_spent, previous_month_spent);
            let status = if change > 0.0 {
                ComparisonStatus::Increased
            } else if change < 0.0 {
                ComparisonStatus::Decreased
            } else {
                ComparisonStatus::NoChange
            };
            (change, status)
        } else if current_month_spent > 0.0 {
            (100.0, ComparisonStatus::Increased)
        } else {
            (0.0, ComparisonStatus::NoChange)
        };

        Self {
            current_month_spent,
            previous_month_spent,
            percentage_change,
            status,
        }
    }

    /// Increases are shown as a warning; decreases and no change are not
    pub fn is_warning(&self) -> bool {
        self.status == ComparisonStatus::Increased
    }

    /// e.g. "12.5% vs last month"
    pub fn summary(&self) -> String {
        format!("{:.1}% vs last month", self.percentage_change)
    }
}

/// First and last day of a calendar month
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// The (year, month) before the given one
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// The (year, month) after the given one
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Sum of expense amounts dated within `[from, to]`
pub fn total_between(expenses: &[Expense], from: NaiveDate, to: NaiveDate) -> f64 {
    round_cents(
        expenses
            .iter()
            .filter(|e| e.date >= from && e.date <= to)
            .fold(0.0, |acc, e| acc + e.amount),
    )
}

/// Spend grouped by category, largest first
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategorySpending> {
    let mut by_category: BTreeMap<i64, CategorySpending> = BTreeMap::new();

    for expense in expenses {
        let entry = by_category
            .entry(expense.category_id)
            .or_insert_with(|| CategorySpending {
                category_id: expense.category_id,
                category_name: expense.category_name.clone(),
                category_color: expense.category_color.clone(),
                amount: 0.0,
                percentage: 0.0,
            });
        entry.amount += expense.amount;
    }

    let total = by_category.values().fold(0.0, |acc, c| acc + c.amount);

    let mut breakdown: Vec<CategorySpending> = by_category
        .into_values()
        .map(|mut c| {
            c.amount = round_cents(c.amount);
            c.percentage = percentage_of(c.amount, total);
            c
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    breakdown
}

/// Per-day totals, oldest first
pub fn daily_trend(expenses: &[Expense]) -> Vec<DailyTrend> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for expense in expenses {
        *by_day.entry(expense.date).or_insert(0.0) += expense.amount;
    }
    by_day
        .into_iter()
        .map(|(date, amount)| DailyTrend {
            date,
            amount: round_cents(amount),
        })
        .collect()
}

/// Headline numbers for the month containing `today`
pub fn dashboard_stats(expenses: &[Expense], today: NaiveDate) -> DashboardStats {
    let (month_start, month_end) = month_bounds(today.year(), today.month())
        .unwrap_or((today, today));

    let in_month: Vec<&Expense> = expenses
        .iter()
        .filter(|e| e.date >= month_start && e.date <= month_end)
        .collect();

    let total_spent_this_month = round_cents(in_month.iter().fold(0.0, |acc, e| acc + e.amount));
    let total_spent_today = total_between(expenses, today, today);

    let days_passed = today.day() as f64;
    let average_daily_spending = if total_spent_this_month > 0.0 {
        round_cents(total_spent_this_month / days_passed)
    } else {
        0.0
    };

    DashboardStats {
        total_spent_this_month,
        total_spent_today,
        transaction_count_this_month: in_month.len() as u64,
        average_daily_spending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;

    fn expense(id: i64, category_id: i64, name: &str, amount: f64, date: &str) -> Expense {
        Expense {
            id,
            amount,
            category_id,
            category_name: name.to_string(),
            category_color: None,
            category_icon: None,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: None,
            payment_method: PaymentMethod::Cash,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_budget_at_warning_threshold_is_yellow() {
        let status = BudgetStatus::compute(500.0, 400.0);
        assert_eq!(status.percentage_used, 80.0);
        assert_eq!(status.tier, BudgetTier::Yellow);
        assert_eq!(status.remaining_amount, 100.0);
        assert_eq!(status.remaining_label(), "Left: $100.00");
    }

    #[test]
    fn test_budget_exactly_spent_is_red() {
        let status = BudgetStatus::compute(500.0, 500.0);
        assert_eq!(status.percentage_used, 100.0);
        assert_eq!(status.tier, BudgetTier::Red);
        assert_eq!(status.remaining_amount, 0.0);
        assert!(!status.is_over_budget());
    }

    #[test]
    fn test_budget_overspent_is_red_with_negative_remaining() {
        let status = BudgetStatus::compute(500.0, 600.0);
        assert_eq!(status.tier, BudgetTier::Red);
        assert_eq!(status.remaining_amount, -100.0);
        assert_eq!(status.percentage_used, 120.0);
        assert!(status.is_over_budget());
        assert_eq!(status.remaining_label(), "Over budget: $100.00");
        // Display width is clamped, the value is not
        assert_eq!(status.progress_width(), 100.0);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(BudgetTier::from_percentage(0.0), BudgetTier::Green);
        assert_eq!(BudgetTier::from_percentage(79.99), BudgetTier::Green);
        assert_eq!(BudgetTier::from_percentage(80.0), BudgetTier::Yellow);
        assert_eq!(BudgetTier::from_percentage(99.99), BudgetTier::Yellow);
        assert_eq!(BudgetTier::from_percentage(100.0), BudgetTier::Red);
        assert_eq!(BudgetTier::from_percentage(250.0), BudgetTier::Red);
    }

    #[test]
    fn test_zero_limit_reports_zero_percent() {
        let status = BudgetStatus::compute(0.0, 50.0);
        assert_eq!(status.percentage_used, 0.0);
        assert_eq!(status.tier, BudgetTier::Green);
        assert_eq!(status.remaining_amount, -50.0);
    }

    #[test]
    fn test_budget_status_ignores_stale_server_fields() {
        let budget = Budget {
            id: 1,
            category_id: 1,
            category_name: "Food".to_string(),
            category_color: None,
            category_icon: None,
            monthly_limit: 200.0,
            month: 3,
            year: 2024,
            total_spent: 170.0,
            remaining_amount: 0.0,
            percentage_used: 0.0,
        };
        let status = budget.status();
        assert_eq!(status.percentage_used, 85.0);
        assert_eq!(status.tier, BudgetTier::Yellow);
        assert_eq!(status.remaining_amount, 30.0);
    }

    #[test]
    fn test_monthly_comparison() {
        let up = MonthlyComparison::compute(150.0, 100.0);
        assert_eq!(up.status, ComparisonStatus::Increased);
        assert_eq!(up.percentage_change, 50.0);
        assert!(up.is_warning());
        assert_eq!(up.summary(), "50.0% vs last month");

        let down = MonthlyComparison::compute(75.0, 100.0);
        assert_eq!(down.status, ComparisonStatus::Decreased);
        assert_eq!(down.percentage_change, -25.0);
        assert!(!down.is_warning());

        let flat = MonthlyComparison::compute(100.0, 100.0);
        assert_eq!(flat.status, ComparisonStatus::NoChange);

        let first_month = MonthlyComparison::compute(40.0, 0.0);
        assert_eq!(first_month.status, ComparisonStatus::Increased);
        assert_eq!(first_month.percentage_change, 100.0);

        let empty = MonthlyComparison::compute(0.0, 0.0);
        assert_eq!(empty.status, ComparisonStatus::NoChange);
        assert_eq!(empty.percentage_change, 0.0);
    }

    #[test]
    fn test_month_bounds_and_stepping() {
        let (from, to) = month_bounds(2024, 2).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, to) = month_bounds(2023, 12).unwrap();
        assert_eq!(to, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

        assert!(month_bounds(2024, 13).is_none());
        assert_eq!(previous_month(2024, 1), (2023, 12));
        assert_eq!(next_month(2024, 12), (2025, 1));
    }

    #[test]
    fn test_category_breakdown() {
        let expenses = vec![
            expense(1, 1, "Food", 30.0, "2024-03-01"),
            expense(2, 2, "Transport", 10.0, "2024-03-02"),
            expense(3, 1, "Food", 60.0, "2024-03-03"),
        ];
        let breakdown = category_breakdown(&expenses);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category_name, "Food");
        assert_eq!(breakdown[0].amount, 90.0);
        assert_eq!(breakdown[0].percentage, 90.0);
        assert_eq!(breakdown[1].percentage, 10.0);

        assert!(category_breakdown(&[]).is_empty());
    }

    #[test]
    fn test_daily_trend_is_sorted_by_date() {
        let expenses = vec![
            expense(1, 1, "Food", 5.0, "2024-03-03"),
            expense(2, 1, "Food", 7.5, "2024-03-01"),
            expense(3, 2, "Transport", 2.5, "2024-03-03"),
        ];
        let trend = daily_trend(&expenses);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(trend[0].amount, 7.5);
        assert_eq!(trend[1].amount, 7.5);
    }

    #[test]
    fn test_dashboard_stats() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let expenses = vec![
            expense(1, 1, "Food", 20.0, "2024-03-10"),
            expense(2, 1, "Food", 30.0, "2024-03-02"),
            expense(3, 1, "Food", 500.0, "2024-02-28"),
        ];
        let stats = dashboard_stats(&expenses, today);
        assert_eq!(stats.total_spent_this_month, 50.0);
        assert_eq!(stats.total_spent_today, 20.0);
        assert_eq!(stats.transaction_count_this_month, 2);
        assert_eq!(stats.average_daily_spending, 5.0);

        let empty = dashboard_stats(&[], today);
        assert_eq!(empty.average_daily_spending, 0.0);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1234.5), "$1234.50");
        assert_eq!(format_money(-3.0), "-$3.00");
        assert_eq!(format_money(-0.0), "$0.00");
        assert_eq!(format_money(-0.001), "$0.00");
    }

    #[test]
    fn test_empty_month_has_no_negative_zero() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let stats = dashboard_stats(&[], today);
        assert_eq!(format_money(stats.total_spent_this_month), "$0.00");
        assert_eq!(format_money(stats.total_spent_today), "$0.00");
        assert!(stats.total_spent_this_month.is_sign_positive());

        let (from, to) = month_bounds(2026, 3).unwrap();
        let spent = total_between(&[], from, to);
        assert!(spent.is_sign_positive());

        let status = BudgetStatus::compute(100.0, spent);
        assert_eq!(format!("{:.1}%", status.percentage_used), "0.0%");
        assert_eq!(status.remaining_label(), "Left: $100.00");
        assert_eq!(status.tier, BudgetTier::Green);

        assert!(category_breakdown(&[]).is_empty());
    }
}
