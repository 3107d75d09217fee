use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{
    CategorySpending, DailyTrend, DashboardOverview, DashboardStats, MonthQuery,
    MonthlyComparison,
};

#[derive(Clone)]
pub struct DashboardService {
    client: ApiClient,
}

impl DashboardService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Month-to-date headline numbers
    pub async fn stats(&self) -> Result<DashboardStats> {
        self.client.get("/dashboard/stats").await
    }

    pub async fn category_breakdown(&self, month: &MonthQuery) -> Result<Vec<CategorySpending>> {
        self.client
            .get_query("/dashboard/category-breakdown", month)
            .await
    }

    pub async fn trends(&self, month: &MonthQuery) -> Result<Vec<DailyTrend>> {
        self.client.get_query("/dashboard/trends", month).await
    }

    /// Current month against the previous one
    pub async fn monthly_comparison(&self) -> Result<MonthlyComparison> {
        self.client.get("/dashboard/monthly-comparison").await
    }

    /// Load all four dashboard resources concurrently.
    ///
    /// Fails as a unit: if any request fails, nothing is returned.
    pub async fn overview(&self, month: &MonthQuery) -> Result<DashboardOverview> {
        let (stats, category_breakdown, daily_trend, monthly_comparison) = tokio::try_join!(
            self.stats(),
            self.category_breakdown(month),
            self.trends(month),
            self.monthly_comparison(),
        )
        .map_err(|e| {
            warn!(year = ?month.year, month = ?month.month, "Dashboard load failed: {}", e);
            e
        })?;
        debug!(
            categories = category_breakdown.len(),
            days = daily_trend.len(),
            "Dashboard loaded"
        );
        Ok(DashboardOverview {
            stats,
            category_breakdown,
            daily_trend,
            monthly_comparison,
        })
    }
}
