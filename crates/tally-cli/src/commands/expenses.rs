//! Expense command implementations (list, show, add, edit, delete)

use anyhow::{Context, Result};
use tally_core::metrics::format_money;
use tally_core::models::{ExpenseFilters, ExpenseQuery, SortDirection, SortField};
use tally_core::validation::ExpenseForm;
use tracing::info;

use super::{api_error, confirm, form_error, parse_date_arg, resolve_category, today, App};
use crate::views;

/// Raw `expenses list` arguments
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// 1-based
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub direction: String,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            sort_by: "date".to_string(),
            direction: "desc".to_string(),
            category: None,
            from: None,
            to: None,
            search: None,
        }
    }
}

/// Raw `expenses add` / `expenses edit` field values; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ExpenseInput {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub payment_method: Option<String>,
}

async fn build_query(app: &App, options: &ListOptions) -> Result<ExpenseQuery> {
    if options.page == 0 {
        anyhow::bail!("Page numbers start at 1");
    }
    if options.size == 0 {
        anyhow::bail!("Page size must be at least 1");
    }

    let sort_by: SortField = options.sort_by.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let direction: SortDirection = options
        .direction
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let category_id = match options.category.as_deref() {
        Some(raw) => Some(
            resolve_category(app, raw)
                .await?
                .parse::<i64>()
                .context("Invalid category")?,
        ),
        None => None,
    };

    let filters = ExpenseFilters {
        category_id,
        start_date: parse_date_arg(options.from.as_deref(), "--from")?,
        end_date: parse_date_arg(options.to.as_deref(), "--to")?,
        search: options.search.clone(),
    };

    let query = ExpenseQuery {
        size: options.size,
        sort_by,
        direction,
        ..Default::default()
    };
    Ok(query.with_filters(filters).with_page(options.page - 1))
}

pub async fn cmd_expenses_list(app: &App, options: &ListOptions) -> Result<()> {
    app.require_login()?;
    let query = build_query(app, options).await?;

    let page = app
        .services
        .expenses
        .list(&query)
        .await
        .map_err(api_error)
        .context("Failed to load expenses")?;

    println!();
    print!("{}", views::render_expense_table(&page));
    if page.content.is_empty() && !query.filters().is_active() {
        println!("   Add one with:");
        println!("     tally expenses add --amount 12.50 --category Food --description Lunch");
    }
    if page.has_next() {
        println!("   Next page: --page {}", page.number + 2);
    }
    Ok(())
}

pub async fn cmd_expenses_show(app: &App, id: i64) -> Result<()> {
    app.require_login()?;
    let expense = app.services.expenses.get(id).await.map_err(api_error)?;
    println!();
    print!("{}", views::render_expense_detail(&expense));
    Ok(())
}

/// Overlay the given values onto a form
async fn apply_input(app: &App, form: &mut ExpenseForm, input: &ExpenseInput) -> Result<()> {
    if let Some(amount) = &input.amount {
        form.amount = amount.clone();
    }
    if let Some(category) = &input.category {
        form.category_id = resolve_category(app, category).await?;
    }
    if let Some(description) = &input.description {
        form.description = description.clone();
    }
    if let Some(date) = &input.date {
        form.date = date.clone();
    }
    if let Some(method) = &input.payment_method {
        form.payment_method = method.clone();
    }
    Ok(())
}

pub async fn cmd_expenses_add(app: &App, input: &ExpenseInput) -> Result<()> {
    app.require_login()?;
    let today = today();

    let mut form = ExpenseForm::new(today);
    apply_input(app, &mut form, input).await?;

    let request = form.validate(today).map_err(form_error)?;
    let expense = app
        .services
        .expenses
        .create(&request)
        .await
        .map_err(api_error)
        .context("Failed to add expense")?;

    info!("Created expense {}", expense.id);
    println!(
        "✅ Added expense #{}: {} in {}",
        expense.id,
        format_money(expense.amount),
        expense.category_name
    );
    cmd_expenses_list(app, &ListOptions::default()).await
}

pub async fn cmd_expenses_edit(app: &App, id: i64, input: &ExpenseInput) -> Result<()> {
    app.require_login()?;
    let existing = app.services.expenses.get(id).await.map_err(api_error)?;

    let mut form = ExpenseForm::from_expense(&existing);
    apply_input(app, &mut form, input).await?;

    let request = form.validate(today()).map_err(form_error)?;
    let expense = app
        .services
        .expenses
        .update(id, &request)
        .await
        .map_err(api_error)
        .context("Failed to update expense")?;

    println!("✅ Updated expense #{}", expense.id);
    cmd_expenses_list(app, &ListOptions::default()).await
}

pub async fn cmd_expenses_delete(app: &App, id: i64, yes: bool) -> Result<()> {
    app.require_login()?;

    if !yes {
        let expense = app.services.expenses.get(id).await.map_err(api_error)?;
        let prompt = format!(
            "Delete expense #{} ({}, {})?",
            expense.id,
            expense.description.as_deref().unwrap_or("no description"),
            format_money(expense.amount)
        );
        if !confirm(&prompt)? {
            println!("Cancelled");
            return Ok(());
        }
    }

    app.services
        .expenses
        .delete(id)
        .await
        .map_err(api_error)
        .context("Failed to delete expense")?;

    println!("🗑️  Deleted expense #{}", id);
    cmd_expenses_list(app, &ListOptions::default()).await
}
