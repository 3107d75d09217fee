use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Category, NewCategory};

/// Categories are reference data: list, plus creating custom ones
#[derive(Clone)]
pub struct CategoryService {
    client: ApiClient,
}

impl CategoryService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Default categories plus the user's own
    pub async fn list(&self) -> Result<Vec<Category>> {
        self.client.get("/categories").await
    }

    pub async fn create(&self, category: &NewCategory) -> Result<Category> {
        self.client.post("/categories", category).await
    }
}
