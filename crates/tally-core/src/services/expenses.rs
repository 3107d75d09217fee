use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Expense, ExpenseQuery, ExpenseRequest, Page};

use super::not_found_as;

#[derive(Clone)]
pub struct ExpenseService {
    client: ApiClient,
}

impl ExpenseService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// One page of expenses, filtered and sorted server-side
    pub async fn list(&self, query: &ExpenseQuery) -> Result<Page<Expense>> {
        self.client.get_query("/expenses", query).await
    }

    pub async fn get(&self, id: i64) -> Result<Expense> {
        self.client
            .get(&format!("/expenses/{}", id))
            .await
            .map_err(|e| not_found_as(e, || format!("Expense {}", id)))
    }

    pub async fn create(&self, request: &ExpenseRequest) -> Result<Expense> {
        self.client.post("/expenses", request).await
    }

    pub async fn update(&self, id: i64, request: &ExpenseRequest) -> Result<Expense> {
        self.client
            .put(&format!("/expenses/{}", id), request)
            .await
            .map_err(|e| not_found_as(e, || format!("Expense {}", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client
            .delete(&format!("/expenses/{}", id))
            .await
            .map_err(|e| not_found_as(e, || format!("Expense {}", id)))
    }
}
