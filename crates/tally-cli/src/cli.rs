//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track expenses and stay within budget
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal expense tracker client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Base URL of the Tally API (overrides config and TALLY_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Where the login session is stored (overrides config and TALLY_SESSION_FILE)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Config file (defaults to ~/.config/tally/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// At least 6 characters
        #[arg(long)]
        password: String,
    },

    /// Log in with an existing account
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Show this month's spending overview
    Dashboard {
        /// Year for the breakdown and trend (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Month 1-12 for the breakdown and trend (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
    },

    /// Manage expenses (list, show, add, edit, delete)
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Manage monthly budgets (list, set, edit, delete)
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Manage categories (list, add)
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List expenses, newest first
    List {
        /// Page number (starting at 1)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Expenses per page
        #[arg(long, default_value = "10")]
        size: u32,

        /// Sort field: date, amount, description
        #[arg(long, default_value = "date")]
        sort_by: String,

        /// Sort direction: asc, desc
        #[arg(long, default_value = "desc")]
        direction: String,

        /// Only this category (name or ID)
        #[arg(long)]
        category: Option<String>,

        /// Earliest date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Latest date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Text to look for in descriptions
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one expense
    Show {
        /// Expense ID
        id: i64,
    },

    /// Record a new expense
    Add {
        /// Amount, e.g. 12.50
        #[arg(long)]
        amount: String,

        /// Category name or ID
        #[arg(long)]
        category: String,

        #[arg(long)]
        description: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// CASH, CARD, UPI, NET_BANKING or OTHER
        #[arg(long, default_value = "CASH")]
        payment_method: String,
    },

    /// Change an expense; omitted fields keep their current value
    Edit {
        /// Expense ID
        id: i64,

        #[arg(long)]
        amount: Option<String>,

        /// Category name or ID
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        payment_method: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets for a month with progress
    List {
        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        /// Month 1-12, defaults to the current month
        #[arg(long)]
        month: Option<u32>,
    },

    /// Set a monthly limit for a category
    Set {
        /// Category name or ID
        #[arg(long)]
        category: String,

        /// Monthly limit, e.g. 500
        #[arg(long)]
        limit: String,

        /// Month 1-12, defaults to the current month
        #[arg(long)]
        month: Option<u32>,

        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Change a budget's monthly limit
    Edit {
        /// Budget ID
        id: i64,

        #[arg(long)]
        limit: String,

        /// Month the budget belongs to, defaults to the current month
        #[arg(long)]
        month: Option<u32>,

        /// Year the budget belongs to, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: i64,

        /// Month the budget belongs to, defaults to the current month
        #[arg(long)]
        month: Option<u32>,

        /// Year the budget belongs to, defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List default and custom categories
    List,

    /// Create a custom category
    Add {
        #[arg(long)]
        name: String,

        /// Hex color like #A1B2C3 (defaults to grey)
        #[arg(long)]
        color: Option<String>,

        /// Icon name (defaults to more-horizontal)
        #[arg(long)]
        icon: Option<String>,
    },
}
