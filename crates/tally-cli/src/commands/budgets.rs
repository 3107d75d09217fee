//! Budget command implementations (list, set, edit, delete)

use anyhow::{Context, Result};
use tally_core::metrics::format_money;
use tally_core::models::{Budget, MonthQuery};
use tally_core::validation::BudgetForm;
use tracing::info;

use super::{api_error, confirm, form_error, resolve_category, resolve_month, App};
use crate::views;

pub async fn cmd_budgets_list(app: &App, year: Option<i32>, month: Option<u32>) -> Result<()> {
    app.require_login()?;
    let (year, month) = resolve_month(year, month)?;

    let budgets = app
        .services
        .budgets
        .list(&MonthQuery::new(year, month))
        .await
        .map_err(api_error)
        .context("Failed to load budgets")?;

    println!();
    print!("{}", views::render_budgets(&budgets, year, month));
    Ok(())
}

pub async fn cmd_budgets_set(
    app: &App,
    category: &str,
    limit: &str,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<()> {
    app.require_login()?;
    let (default_year, default_month) = resolve_month(None, None)?;

    let mut form = BudgetForm::new(year.unwrap_or(default_year), month.unwrap_or(default_month));
    form.category_id = resolve_category(app, category).await?;
    form.monthly_limit = limit.to_string();

    let request = form.validate().map_err(form_error)?;
    let budget = app
        .services
        .budgets
        .create(&request)
        .await
        .map_err(api_error)?;

    info!("Created budget {}", budget.id);
    println!(
        "✅ Set {} budget to {}/month",
        budget.category_name,
        format_money(budget.monthly_limit)
    );
    cmd_budgets_list(app, Some(budget.year), Some(budget.month)).await
}

/// Find a budget in one month's list; there is no lookup by ID alone
async fn find_budget(app: &App, id: i64, year: i32, month: u32) -> Result<Budget> {
    let budgets = app
        .services
        .budgets
        .list(&MonthQuery::new(year, month))
        .await
        .map_err(api_error)?;
    budgets.into_iter().find(|b| b.id == id).ok_or_else(|| {
        anyhow::anyhow!(
            "Budget #{} not found in {:04}-{:02} (use --month/--year)",
            id,
            year,
            month
        )
    })
}

/// Change a budget's limit
pub async fn cmd_budgets_edit(
    app: &App,
    id: i64,
    limit: &str,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<()> {
    app.require_login()?;
    let (year, month) = resolve_month(year, month)?;
    let existing = find_budget(app, id, year, month).await?;

    let mut form = BudgetForm::from_budget(&existing);
    form.monthly_limit = limit.to_string();
    let request = form.validate().map_err(form_error)?;

    let budget = app
        .services
        .budgets
        .update(id, &request)
        .await
        .map_err(api_error)
        .context("Failed to update budget")?;

    println!(
        "✅ {} budget is now {}/month",
        budget.category_name,
        format_money(budget.monthly_limit)
    );
    cmd_budgets_list(app, Some(year), Some(month)).await
}

/// Delete a budget, then re-list the month it belonged to
pub async fn cmd_budgets_delete(
    app: &App,
    id: i64,
    month: Option<u32>,
    year: Option<i32>,
    yes: bool,
) -> Result<()> {
    app.require_login()?;
    let (year, month) = resolve_month(year, month)?;
    let existing = find_budget(app, id, year, month).await?;

    let prompt = format!(
        "Delete the {} budget for {:04}-{:02} (#{})?",
        existing.category_name, existing.year, existing.month, id
    );
    if !yes && !confirm(&prompt)? {
        println!("Cancelled");
        return Ok(());
    }

    app.services
        .budgets
        .delete(id)
        .await
        .map_err(api_error)
        .context("Failed to delete budget")?;

    println!("🗑️  Deleted budget #{}", id);
    cmd_budgets_list(app, Some(existing.year), Some(existing.month)).await
}
