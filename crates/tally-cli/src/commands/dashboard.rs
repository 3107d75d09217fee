//! Dashboard command

use anyhow::{Context, Result};
use tally_core::models::MonthQuery;

use super::{api_error, resolve_month, App};
use crate::views;

pub async fn cmd_dashboard(app: &App, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let user = app.require_login()?;
    let (year, month) = resolve_month(year, month)?;

    let overview = app
        .services
        .dashboard
        .overview(&MonthQuery::new(year, month))
        .await
        .map_err(api_error)
        .context("Failed to load dashboard")?;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           💰 Tally Dashboard            │");
    println!("╰─────────────────────────────────────────╯");
    println!("  {} · {:04}-{:02}", user.name, year, month);
    println!();
    print!(
        "{}",
        views::render_stat_cards(&overview.stats, &overview.monthly_comparison)
    );
    println!();
    print!("{}", views::render_category_breakdown(&overview.category_breakdown));
    println!();
    print!("{}", views::render_trend(&overview.daily_trend));
    println!();

    if overview.stats.transaction_count_this_month == 0 {
        println!("  Record your first expense with:");
        println!("    tally expenses add --amount 12.50 --category Food --description Lunch");
    }

    Ok(())
}
