//! Tally CLI - Personal expense tracker client
//!
//! Usage:
//!   tally register --name N --email E --password P   Create an account
//!   tally login --email E --password P                Log in
//!   tally dashboard                                   Monthly overview
//!   tally expenses add --amount 12.50 --category Food --description Lunch
//!   tally budgets set --category Food --limit 500

mod cli;
mod commands;
mod views;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::{App, ExpenseInput, ListOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(
        cli.config.as_deref(),
        cli.api_url.as_deref(),
        cli.session_file.as_deref(),
    )?;
    let app = App::new(&config)?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::cmd_register(&app, &name, &email, &password).await,
        Commands::Login { email, password } => commands::cmd_login(&app, &email, &password).await,
        Commands::Logout => commands::cmd_logout(&app),
        Commands::Whoami => commands::cmd_whoami(&app),
        Commands::Dashboard { year, month } => commands::cmd_dashboard(&app, year, month).await,
        Commands::Expenses { action } => match action {
            None => commands::cmd_expenses_list(&app, &ListOptions::default()).await,
            Some(ExpensesAction::List {
                page,
                size,
                sort_by,
                direction,
                category,
                from,
                to,
                search,
            }) => {
                let options = ListOptions {
                    page,
                    size,
                    sort_by,
                    direction,
                    category,
                    from,
                    to,
                    search,
                };
                commands::cmd_expenses_list(&app, &options).await
            }
            Some(ExpensesAction::Show { id }) => commands::cmd_expenses_show(&app, id).await,
            Some(ExpensesAction::Add {
                amount,
                category,
                description,
                date,
                payment_method,
            }) => {
                let input = ExpenseInput {
                    amount: Some(amount),
                    category: Some(category),
                    description: Some(description),
                    date,
                    payment_method: Some(payment_method),
                };
                commands::cmd_expenses_add(&app, &input).await
            }
            Some(ExpensesAction::Edit {
                id,
                amount,
                category,
                description,
                date,
                payment_method,
            }) => {
                let input = ExpenseInput {
                    amount,
                    category,
                    description,
                    date,
                    payment_method,
                };
                commands::cmd_expenses_edit(&app, id, &input).await
            }
            Some(ExpensesAction::Delete { id, yes }) => {
                commands::cmd_expenses_delete(&app, id, yes).await
            }
        },
        Commands::Budgets { action } => match action {
            None => commands::cmd_budgets_list(&app, None, None).await,
            Some(BudgetsAction::List { year, month }) => {
                commands::cmd_budgets_list(&app, year, month).await
            }
            Some(BudgetsAction::Set {
                category,
                limit,
                month,
                year,
            }) => commands::cmd_budgets_set(&app, &category, &limit, month, year).await,
            Some(BudgetsAction::Edit {
                id,
                limit,
                month,
                year,
            }) => commands::cmd_budgets_edit(&app, id, &limit, month, year).await,
            Some(BudgetsAction::Delete {
                id,
                month,
                year,
                yes,
            }) => commands::cmd_budgets_delete(&app, id, month, year, yes).await,
        },
        Commands::Categories { action } => match action {
            None | Some(CategoriesAction::List) => commands::cmd_categories_list(&app).await,
            Some(CategoriesAction::Add { name, color, icon }) => {
                commands::cmd_categories_add(&app, &name, color.as_deref(), icon.as_deref()).await
            }
        },
    }
}
