use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Budget, BudgetRequest, MonthQuery};

use super::not_found_as;

#[derive(Clone)]
pub struct BudgetService {
    client: ApiClient,
}

impl BudgetService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Budgets for a month, with spend figures computed by the server.
    /// An empty query means the server's current month.
    pub async fn list(&self, month: &MonthQuery) -> Result<Vec<Budget>> {
        self.client.get_query("/budgets", month).await
    }

    /// Fails with the server's message if the category already has a budget
    /// for that month
    pub async fn create(&self, request: &BudgetRequest) -> Result<Budget> {
        self.client.post("/budgets", request).await
    }

    pub async fn update(&self, id: i64, request: &BudgetRequest) -> Result<Budget> {
        self.client
            .put(&format!("/budgets/{}", id), request)
            .await
            .map_err(|e| not_found_as(e, || format!("Budget {}", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client
            .delete(&format!("/budgets/{}", id))
            .await
            .map_err(|e| not_found_as(e, || format!("Budget {}", id)))
    }
}
