//! Tally Core Library
//!
//! Client-side functionality for the Tally expense tracker:
//! - REST API client with bearer-token sessions
//! - Domain services for auth, expenses, categories, budgets and dashboards
//! - Session store with a login/logout state machine, persisted to disk
//! - Derived budget metrics (remaining, percentage used, tiers, comparisons)
//! - Typed form validation with field-level error maps

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod validation;

/// Test utilities including an in-memory mock of the REST API
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use context::AuthContext;
pub use error::{Error, Result};
pub use metrics::{BudgetStatus, BudgetTier};
pub use services::{
    AuthService, BudgetService, CategoryService, DashboardService, ExpenseService, Services,
};
pub use session::{Session, SessionPhase, SessionState, SessionStore};
pub use validation::{BudgetForm, CategoryForm, ExpenseForm, FieldErrors, LoginForm, RegisterForm};
