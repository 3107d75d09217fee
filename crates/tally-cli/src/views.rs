//! Terminal rendering for expenses, budgets and the dashboard
//!
//! Every function here takes already-loaded data and returns the text to
//! print. No fetching and no business rules; derived numbers come from
//! `tally_core::metrics`.

use std::fmt::Write;

use tally_core::metrics::{format_money, BudgetTier};
use tally_core::models::{
    Budget, Category, CategorySpending, DailyTrend, DashboardStats, Expense, MonthlyComparison,
    Page,
};

use crate::commands::truncate;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

/// Cells in a full-width bar
const BAR_CELLS: usize = 20;

fn tier_color(tier: BudgetTier) -> &'static str {
    match tier {
        BudgetTier::Green => GREEN,
        BudgetTier::Yellow => YELLOW,
        BudgetTier::Red => RED,
    }
}

/// `[████████░░]` filled to `percent` (0-100)
pub fn progress_bar(percent: f64, cells: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * cells as f64).round() as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(cells - filled))
}

/// Bar scaled against the largest value in a series
fn scaled_bar(value: f64, max: f64, cells: usize) -> String {
    let filled = if max > 0.0 {
        ((value / max) * cells as f64).round() as usize
    } else {
        0
    };
    "▇".repeat(filled.max(usize::from(value > 0.0)))
}

/// The four headline cards plus the month-over-month line
pub fn render_stat_cards(stats: &DashboardStats, comparison: &MonthlyComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  💸 This Month:     {}", format_money(stats.total_spent_this_month));
    let _ = writeln!(out, "  📅 Today:          {}", format_money(stats.total_spent_today));
    let _ = writeln!(out, "  🧾 Transactions:   {}", stats.transaction_count_this_month);
    let _ = writeln!(out, "  📈 Daily Average:  {}", format_money(stats.average_daily_spending));

    let (color, arrow) = if comparison.is_warning() {
        (RED, "▲")
    } else if comparison.percentage_change < 0.0 {
        (GREEN, "▼")
    } else {
        (GREEN, "•")
    };
    let _ = writeln!(
        out,
        "  {}{} {}{} (last month: {})",
        color,
        arrow,
        comparison.summary(),
        RESET,
        format_money(comparison.previous_month_spent)
    );
    out
}

/// Spend per category with share-of-total bars
pub fn render_category_breakdown(breakdown: &[CategorySpending]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🍩 Spending by Category");
    let _ = writeln!(out, "{}", RULE);

    if breakdown.is_empty() {
        let _ = writeln!(out, "   No spending recorded for this month.");
        return out;
    }

    for item in breakdown {
        let _ = writeln!(
            out,
            "   {:15} │ {:>10} │ {:>6.2}% │ {}",
            truncate(&item.category_name, 15),
            format_money(item.amount),
            item.percentage,
            progress_bar(item.percentage, BAR_CELLS)
        );
    }
    out
}

/// Daily totals as horizontal bars, oldest first
pub fn render_trend(trend: &[DailyTrend]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📊 Daily Spending");
    let _ = writeln!(out, "{}", RULE);

    if trend.is_empty() {
        let _ = writeln!(out, "   No spending recorded for this month.");
        return out;
    }

    let max = trend.iter().map(|d| d.amount).fold(0.0, f64::max);
    for day in trend {
        let _ = writeln!(
            out,
            "   {} │ {:>10} │ {}",
            day.date.format("%b %d"),
            format_money(day.amount),
            scaled_bar(day.amount, max, 30)
        );
    }
    out
}

/// One budget as a card: name, spent of limit, colored bar and remaining
pub fn render_budget_card(budget: &Budget) -> String {
    let status = budget.status();
    let color = tier_color(status.tier);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "   #{:<4} {} {}({}){}",
        budget.id,
        budget.category_name,
        DIM,
        status.tier,
        RESET
    );
    let _ = writeln!(
        out,
        "         Spent {} of {}",
        format_money(status.total_spent),
        format_money(status.monthly_limit)
    );
    let _ = writeln!(
        out,
        "         {}{} {:.1}%{}",
        color,
        progress_bar(status.progress_width(), BAR_CELLS),
        status.percentage_used,
        RESET
    );
    let _ = writeln!(
        out,
        "         {}{}{}",
        color,
        status.remaining_label(),
        RESET
    );
    out
}

pub fn render_budgets(budgets: &[Budget], year: i32, month: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🎯 Budgets for {:04}-{:02}", year, month);
    let _ = writeln!(out, "{}", RULE);

    if budgets.is_empty() {
        let _ = writeln!(out, "   No budgets set for this month. Create one with:");
        let _ = writeln!(out, "     tally budgets set --category Food --limit 500");
        return out;
    }

    for budget in budgets {
        out.push_str(&render_budget_card(budget));
        out.push('\n');
    }
    out
}

/// A page of expenses as a table, with the pager line
pub fn render_expense_table(page: &Page<Expense>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📝 Expenses");
    let _ = writeln!(out, "{}", RULE);

    if page.content.is_empty() {
        let _ = writeln!(out, "   No expenses found.");
        return out;
    }

    let _ = writeln!(
        out,
        "   {:>5} │ {:10} │ {:>10} │ {:13} │ {:11} │ Description",
        "ID", "Date", "Amount", "Category", "Paid with"
    );
    let _ = writeln!(
        out,
        "   ──────┼────────────┼────────────┼───────────────┼─────────────┼────────────"
    );
    for expense in &page.content {
        let _ = writeln!(
            out,
            "   {:>5} │ {} │ {}{:>10}{} │ {:13} │ {:11} │ {}",
            expense.id,
            expense.date,
            RED,
            format_money(expense.amount),
            RESET,
            truncate(&expense.category_name, 13),
            expense.payment_method.label(),
            truncate(expense.description.as_deref().unwrap_or(""), 30)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "   Page {} of {} ({} total)",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    );
    out
}

pub fn render_expense_detail(expense: &Expense) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🧾 Expense #{}", expense.id);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "   Description: {}",
        expense.description.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out, "   Amount:      {}", format_money(expense.amount));
    let _ = writeln!(out, "   Date:        {}", expense.date);
    let _ = writeln!(out, "   Category:    {}", expense.category_name);
    let _ = writeln!(out, "   Paid with:   {}", expense.payment_method.label());
    if let Some(created) = expense.created_at {
        let _ = writeln!(out, "   Created:     {}", created.format("%Y-%m-%d %H:%M"));
    }
    if let Some(updated) = expense.updated_at {
        let _ = writeln!(out, "   Updated:     {}", updated.format("%Y-%m-%d %H:%M"));
    }
    out
}

pub fn render_categories(categories: &[Category]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🏷️  Categories");
    let _ = writeln!(out, "{}", RULE);

    for category in categories {
        let kind = if category.is_default() {
            ""
        } else {
            " (custom)"
        };
        let _ = writeln!(
            out,
            "   {:>4} │ {:15} │ {} │ {}{}{}{}",
            category.id,
            truncate(&category.name, 15),
            category.color,
            DIM,
            category.icon,
            RESET,
            kind
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::models::{ComparisonStatus, PaymentMethod};

    fn budget(limit: f64, spent: f64) -> Budget {
        let status = tally_core::BudgetStatus::compute(limit, spent);
        Budget {
            id: 3,
            category_id: 1,
            category_name: "Food".to_string(),
            category_color: Some("#FF5733".to_string()),
            category_icon: Some("utensils".to_string()),
            monthly_limit: limit,
            month: 3,
            year: 2026,
            total_spent: spent,
            remaining_amount: status.remaining_amount,
            percentage_used: status.percentage_used,
        }
    }

    #[test]
    fn test_progress_bar_clamps() {
        assert_eq!(progress_bar(0.0, 4), "[░░░░]");
        assert_eq!(progress_bar(50.0, 4), "[██░░]");
        assert_eq!(progress_bar(250.0, 4), "[████]");
    }

    #[test]
    fn test_budget_card_yellow() {
        let card = render_budget_card(&budget(500.0, 400.0));
        assert!(card.contains("(YELLOW)"));
        assert!(card.contains("Spent $400.00 of $500.00"));
        assert!(card.contains("80.0%"));
        assert!(card.contains("Left: $100.00"));
    }

    #[test]
    fn test_budget_card_over_budget() {
        let card = render_budget_card(&budget(500.0, 600.0));
        assert!(card.contains("(RED)"));
        assert!(card.contains("120.0%"));
        assert!(card.contains("Over budget: $100.00"));
        // Bar is full, never wider
        assert!(card.contains(&progress_bar(100.0, BAR_CELLS)));
    }

    #[test]
    fn test_budget_card_exactly_spent_is_red() {
        let card = render_budget_card(&budget(500.0, 500.0));
        assert!(card.contains("(RED)"));
        assert!(card.contains(&format!("{}Left: $0.00{}", RED, RESET)));
        assert!(!card.contains(GREEN));
    }

    #[test]
    fn test_budget_card_unspent() {
        let card = render_budget_card(&budget(200.0, 0.0));
        assert!(card.contains("Spent $0.00 of $200.00"));
        assert!(card.contains(" 0.0%"));
        assert!(!card.contains("-0"));
    }

    #[test]
    fn test_empty_budgets_hint() {
        let out = render_budgets(&[], 2026, 3);
        assert!(out.contains("2026-03"));
        assert!(out.contains("No budgets set"));
    }

    #[test]
    fn test_expense_table() {
        let page = Page {
            content: vec![Expense {
                id: 42,
                amount: 12.5,
                category_id: 1,
                category_name: "Food".to_string(),
                category_color: None,
                category_icon: None,
                date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
                description: Some("Lunch".to_string()),
                payment_method: PaymentMethod::NetBanking,
                created_at: None,
                updated_at: None,
            }],
            total_pages: 3,
            total_elements: 25,
            number: 1,
            size: 10,
        };
        let out = render_expense_table(&page);
        assert!(out.contains("$12.50"));
        assert!(out.contains("Net Banking"));
        assert!(out.contains("Lunch"));
        assert!(out.contains("Page 2 of 3 (25 total)"));
    }

    #[test]
    fn test_stat_cards_comparison_polarity() {
        let stats = DashboardStats {
            total_spent_this_month: 175.5,
            total_spent_today: 100.0,
            transaction_count_this_month: 3,
            average_daily_spending: 11.7,
        };
        let up = MonthlyComparison::compute(175.5, 100.0);
        let out = render_stat_cards(&stats, &up);
        assert!(out.contains("$175.50"));
        assert!(out.contains(&format!("{}▲ 75.5% vs last month", RED)));

        let down = MonthlyComparison::compute(50.0, 100.0);
        assert_eq!(down.status, ComparisonStatus::Decreased);
        let out = render_stat_cards(&stats, &down);
        assert!(out.contains(&format!("{}▼ -50.0% vs last month", GREEN)));
    }

    #[test]
    fn test_breakdown_and_trend() {
        let breakdown = vec![CategorySpending {
            category_id: 1,
            category_name: "Food".to_string(),
            category_color: None,
            amount: 125.5,
            percentage: 71.51,
        }];
        let out = render_category_breakdown(&breakdown);
        assert!(out.contains("71.51%"));

        let trend = vec![
            DailyTrend {
                date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                amount: 30.0,
            },
            DailyTrend {
                date: NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(),
                amount: 60.0,
            },
        ];
        let out = render_trend(&trend);
        assert!(out.contains("Mar 10"));
        assert!(out.contains(&"▇".repeat(30)));
        assert!(render_trend(&[]).contains("No spending"));
    }

    #[test]
    fn test_categories_marks_custom() {
        let categories = vec![
            Category {
                id: 1,
                name: "Food".to_string(),
                color: "#FF5733".to_string(),
                icon: "utensils".to_string(),
                user_id: None,
            },
            Category {
                id: 9,
                name: "Pets".to_string(),
                color: "#808080".to_string(),
                icon: "more-horizontal".to_string(),
                user_id: Some(1),
            },
        ];
        let out = render_categories(&categories);
        assert_eq!(out.matches("(custom)").count(), 1);
        assert!(out.contains("Pets"));
    }
}
