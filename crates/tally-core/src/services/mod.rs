//! Domain services, one method per REST endpoint
//!
//! Services are stateless wrappers over a shared [`ApiClient`]. They never
//! cache; callers refetch after a mutation.

mod auth;
mod budgets;
mod categories;
mod dashboard;
mod expenses;

pub use auth::AuthService;
pub use budgets::BudgetService;
pub use categories::CategoryService;
pub use dashboard::DashboardService;
pub use expenses::ExpenseService;

use crate::api::ApiClient;
use crate::error::Error;

/// All services over one client
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub expenses: ExpenseService,
    pub categories: CategoryService,
    pub budgets: BudgetService,
    pub dashboard: DashboardService,
}

impl Services {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthService::new(client.clone()),
            expenses: ExpenseService::new(client.clone()),
            categories: CategoryService::new(client.clone()),
            budgets: BudgetService::new(client.clone()),
            dashboard: DashboardService::new(client),
        }
    }
}

/// Give a bare 404 a readable subject
fn not_found_as(err: Error, what: impl FnOnce() -> String) -> Error {
    match err {
        Error::NotFound(_) => Error::NotFound(what()),
        other => other,
    }
}
