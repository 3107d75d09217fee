//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `auth` - Session commands (register, login, logout, whoami)
//! - `budgets` - Budget commands (list, set, edit, delete)
//! - `categories` - Category commands (list, add)
//! - `core` - Shared plumbing (App, error mapping, confirmation prompt)
//! - `dashboard` - Monthly overview
//! - `expenses` - Expense commands (list, show, add, edit, delete)

pub mod auth;
pub mod budgets;
pub mod categories;
pub mod core;
pub mod dashboard;
pub mod expenses;

// Re-export command functions for main.rs
pub use auth::*;
pub use budgets::*;
pub use categories::*;
pub use self::core::*;
pub use dashboard::*;
pub use expenses::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
