//! Test utilities for tally-core
//!
//! An in-process mock of the expense tracker REST API, for integration tests
//! and for exercising the CLI without a real backend. Everything lives in
//! memory and disappears when the server is dropped.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Datelike, Local, NaiveDate};
use sha2::{Digest, Sha256};
use tokio::sync::oneshot;

use crate::metrics::{self, BudgetStatus};
use crate::models::{
    AuthResponse, Budget, BudgetRequest, Category, CategorySpending, DailyTrend, DashboardStats,
    Expense, ExpenseQuery, ExpenseRequest, LoginRequest, MonthQuery, MonthlyComparison,
    NewCategory, Page, RegisterRequest, SortDirection, SortField,
};

/// The categories every user starts with: (name, color, icon)
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 8] = [
    ("Food", "#FF5733", "utensils"),
    ("Transport", "#33FF57", "car"),
    ("Shopping", "#3357FF", "shopping-bag"),
    ("Entertainment", "#FF33A8", "film"),
    ("Bills", "#33FFF5", "file-text"),
    ("Health", "#FF3333", "heart"),
    ("Education", "#A833FF", "book"),
    ("Other", "#808080", "more-horizontal"),
];

/// Mock Tally API server for testing
pub struct MockServer {
    addr: SocketAddr,
    state: SharedState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockServer {
    /// Start the mock server on an available port, using today's date
    pub async fn start() -> Self {
        Self::start_on(Local::now().date_naive()).await
    }

    /// Start the mock server with a fixed "today" for date-relative endpoints
    pub async fn start_on(today: NaiveDate) -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockState::new(today)));

        let app = Router::new()
            .route("/api/auth/register", post(handle_register))
            .route("/api/auth/login", post(handle_login))
            .route("/api/categories", get(list_categories).post(create_category))
            .route("/api/expenses", get(list_expenses).post(create_expense))
            .route(
                "/api/expenses/:id",
                get(get_expense).put(update_expense).delete(delete_expense),
            )
            .route("/api/budgets", get(list_budgets).post(create_budget))
            .route("/api/budgets/:id", put(update_budget).delete(delete_budget))
            .route("/api/dashboard/stats", get(dashboard_stats))
            .route(
                "/api/dashboard/category-breakdown",
                get(dashboard_category_breakdown),
            )
            .route("/api/dashboard/trends", get(dashboard_trends))
            .route(
                "/api/dashboard/monthly-comparison",
                get(dashboard_monthly_comparison),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL of the API (including the `/api` prefix)
    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// The date the server treats as today
    pub fn today(&self) -> NaiveDate {
        self.state.lock().unwrap().today
    }

    /// Number of expenses stored across all users
    pub fn expense_count(&self) -> usize {
        self.state.lock().unwrap().expenses.len()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.stop();
    }
}

type SharedState = Arc<Mutex<MockState>>;

struct MockUser {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
}

struct StoredExpense {
    user_id: i64,
    expense: Expense,
}

struct StoredBudget {
    id: i64,
    user_id: i64,
    category_id: i64,
    monthly_limit: f64,
    month: u32,
    year: i32,
}

struct MockState {
    today: NaiveDate,
    next_id: i64,
    users: Vec<MockUser>,
    tokens: HashMap<String, i64>,
    categories: Vec<Category>,
    expenses: Vec<StoredExpense>,
    budgets: Vec<StoredBudget>,
}

impl MockState {
    fn new(today: NaiveDate) -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .zip(1..)
            .map(|((name, color, icon), id)| Category {
                id,
                name: name.to_string(),
                color: color.to_string(),
                icon: icon.to_string(),
                user_id: None,
            })
            .collect::<Vec<_>>();

        Self {
            today,
            next_id: categories.len() as i64 + 1,
            users: Vec::new(),
            tokens: HashMap::new(),
            categories,
            expenses: Vec::new(),
            budgets: Vec::new(),
        }
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn issue_token(&mut self, user_id: i64, email: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}:{}", user_id, email, self.tokens.len()));
        let token = hex::encode(hasher.finalize());
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn auth_response(&mut self, user_id: i64) -> Option<AuthResponse> {
        let (name, email) = self
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| (u.name.clone(), u.email.clone()))?;
        let token = self.issue_token(user_id, &email);
        Some(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            id: user_id,
            name,
            email,
        })
    }

    /// Category usable by `user_id` (a default or one of theirs)
    fn category_for(&self, user_id: i64, category_id: i64) -> Result<&Category, MockError> {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| MockError::not_found("Category not found"))?;
        if category.user_id.is_some_and(|owner| owner != user_id) {
            return Err(MockError::forbidden(
                "You do not have permission to use this category",
            ));
        }
        Ok(category)
    }

    fn user_expenses(&self, user_id: i64) -> Vec<Expense> {
        self.expenses
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.expense.clone())
            .collect()
    }

    fn user_expenses_in_month(&self, user_id: i64, year: i32, month: u32) -> Vec<Expense> {
        match metrics::month_bounds(year, month) {
            Some((from, to)) => self
                .user_expenses(user_id)
                .into_iter()
                .filter(|e| e.date >= from && e.date <= to)
                .collect(),
            None => Vec::new(),
        }
    }

    fn budget_view(&self, budget: &StoredBudget) -> Budget {
        let category = self.categories.iter().find(|c| c.id == budget.category_id);
        let total_spent = metrics::round_cents(
            self.user_expenses_in_month(budget.user_id, budget.year, budget.month)
                .iter()
                .filter(|e| e.category_id == budget.category_id)
                .fold(0.0, |acc, e| acc + e.amount),
        );
        let status = BudgetStatus::compute(budget.monthly_limit, total_spent);
        Budget {
            id: budget.id,
            category_id: budget.category_id,
            category_name: category.map(|c| c.name.clone()).unwrap_or_default(),
            category_color: category.map(|c| c.color.clone()),
            category_icon: category.map(|c| c.icon.clone()),
            monthly_limit: budget.monthly_limit,
            month: budget.month,
            year: budget.year,
            total_spent: status.total_spent,
            remaining_amount: status.remaining_amount,
            percentage_used: status.percentage_used,
        }
    }

    fn resolve_month(&self, query: &MonthQuery) -> (i32, u32) {
        (
            query.year.unwrap_or(self.today.year()),
            query.month.unwrap_or(self.today.month()),
        )
    }
}

/// Error response in the backend's `{"message": ...}` shape
struct MockError {
    status: StatusCode,
    message: Option<String>,
}

impl MockError {
    fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: Some(msg.to_string()),
        }
    }

    fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: Some(msg.to_string()),
        }
    }

    fn forbidden(msg: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: Some(msg.to_string()),
        }
    }

    /// Bare 401 with no body, as the security filter sends
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: None,
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        match self.message {
            Some(message) => {
                let body = Json(serde_json::json!({ "message": message }));
                (self.status, body).into_response()
            }
            None => self.status.into_response(),
        }
    }
}

type MockResult<T> = Result<T, MockError>;

fn lock(state: &SharedState) -> MockResult<MutexGuard<'_, MockState>> {
    state.lock().map_err(|_| MockError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: Some("An internal error occurred".to_string()),
    })
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Resolve the bearer token to a user id
fn current_user(state: &MockState, headers: &HeaderMap) -> MockResult<i64> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| state.tokens.get(token).copied())
        .ok_or_else(MockError::unauthorized)
}

async fn handle_register(
    State(state): State<SharedState>,
    Json(request): Json<RegisterRequest>,
) -> MockResult<Json<AuthResponse>> {
    let mut state = lock(&state)?;
    if state
        .users
        .iter()
        .any(|u| u.email.eq_ignore_ascii_case(&request.email))
    {
        return Err(MockError::bad_request("Email already in use"));
    }

    let id = state.next_id();
    state.users.push(MockUser {
        id,
        name: request.name,
        email: request.email,
        password_hash: hash_password(&request.password),
    });

    state
        .auth_response(id)
        .map(Json)
        .ok_or_else(|| MockError::not_found("User not found"))
}

async fn handle_login(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> MockResult<Json<AuthResponse>> {
    let mut state = lock(&state)?;
    let hash = hash_password(&request.password);
    let user_id = state
        .users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(&request.email) && u.password_hash == hash)
        .map(|u| u.id)
        .ok_or_else(MockError::unauthorized)?;

    state
        .auth_response(user_id)
        .map(Json)
        .ok_or_else(MockError::unauthorized)
}

async fn list_categories(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> MockResult<Json<Vec<Category>>> {
    let state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    let categories = state
        .categories
        .iter()
        .filter(|c| c.user_id.map_or(true, |owner| owner == user_id))
        .cloned()
        .collect();
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<NewCategory>,
) -> MockResult<(StatusCode, Json<Category>)> {
    let mut state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    if request.name.trim().is_empty() {
        return Err(MockError::bad_request("Name is required"));
    }

    let id = state.next_id();
    let category = Category {
        id,
        name: request.name,
        color: request.color,
        icon: request.icon,
        user_id: Some(user_id),
    };
    state.categories.push(category.clone());
    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_expenses(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<ExpenseQuery>,
) -> MockResult<Json<Page<Expense>>> {
    let state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;

    let search = query.search.as_deref().map(str::to_lowercase);
    let mut matching: Vec<Expense> = state
        .user_expenses(user_id)
        .into_iter()
        .filter(|e| query.category_id.map_or(true, |c| e.category_id == c))
        .filter(|e| query.start_date.map_or(true, |d| e.date >= d))
        .filter(|e| query.end_date.map_or(true, |d| e.date <= d))
        .filter(|e| match &search {
            Some(s) => e
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(s)),
            None => true,
        })
        .collect();

    matching.sort_by(|a, b| {
        let ordering = match query.sort_by {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Amount => a
                .amount
                .partial_cmp(&b.amount)
                .unwrap_or(std::cmp::Ordering::Equal),
            SortField::Description => a.description.cmp(&b.description),
        }
        .then_with(|| a.id.cmp(&b.id));
        match query.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let size = query.size.max(1);
    let total_elements = matching.len() as u64;
    let total_pages = total_elements.div_ceil(size as u64) as u32;
    let content = matching
        .into_iter()
        .skip((query.page * size) as usize)
        .take(size as usize)
        .collect();

    Ok(Json(Page {
        content,
        total_pages,
        total_elements,
        number: query.page,
        size,
    }))
}

/// Look up an expense and check it belongs to `user_id`
fn owned_expense<'a>(
    state: &'a mut MockState,
    user_id: i64,
    id: i64,
    action: &str,
) -> MockResult<&'a mut StoredExpense> {
    let stored = state
        .expenses
        .iter_mut()
        .find(|s| s.expense.id == id)
        .ok_or_else(|| MockError::not_found("Expense not found"))?;
    if stored.user_id != user_id {
        return Err(MockError::forbidden(&format!(
            "You do not have permission to {} this expense",
            action
        )));
    }
    Ok(stored)
}

fn check_expense(request: &ExpenseRequest) -> MockResult<()> {
    if request.amount < 0.01 {
        return Err(MockError::bad_request("Amount must be positive"));
    }
    Ok(())
}

async fn create_expense(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<ExpenseRequest>,
) -> MockResult<(StatusCode, Json<Expense>)> {
    let mut state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    check_expense(&request)?;
    let category = state.category_for(user_id, request.category_id)?.clone();

    let id = state.next_id();
    let expense = Expense {
        id,
        amount: request.amount,
        category_id: category.id,
        category_name: category.name,
        category_color: Some(category.color),
        category_icon: Some(category.icon),
        date: request.date,
        description: request.description,
        payment_method: request.payment_method,
        created_at: Some(Local::now().naive_local()),
        updated_at: None,
    };
    state.expenses.push(StoredExpense {
        user_id,
        expense: expense.clone(),
    });
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn get_expense(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> MockResult<Json<Expense>> {
    let mut state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    let stored = owned_expense(&mut state, user_id, id, "access")?;
    Ok(Json(stored.expense.clone()))
}

async fn update_expense(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<ExpenseRequest>,
) -> MockResult<Json<Expense>> {
    let mut state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    check_expense(&request)?;
    owned_expense(&mut state, user_id, id, "update")?;
    let category = state.category_for(user_id, request.category_id)?.clone();

    let stored = owned_expense(&mut state, user_id, id, "update")?;
    let expense = &mut stored.expense;
    expense.amount = request.amount;
    expense.category_id = category.id;
    expense.category_name = category.name;
    expense.category_color = Some(category.color);
    expense.category_icon = Some(category.icon);
    expense.date = request.date;
    expense.description = request.description;
    expense.payment_method = request.payment_method;
    expense.updated_at = Some(Local::now().naive_local());
    Ok(Json(expense.clone()))
}

async fn delete_expense(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> MockResult<StatusCode> {
    let mut state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    owned_expense(&mut state, user_id, id, "delete")?;
    state.expenses.retain(|s| s.expense.id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_budgets(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> MockResult<Json<Vec<Budget>>> {
    let state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    let (year, month) = state.resolve_month(&query);
    let budgets = state
        .budgets
        .iter()
        .filter(|b| b.user_id == user_id && b.year == year && b.month == month)
        .map(|b| state.budget_view(b))
        .collect();
    Ok(Json(budgets))
}

async fn create_budget(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<BudgetRequest>,
) -> MockResult<(StatusCode, Json<Budget>)> {
    let mut state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    if request.monthly_limit < 0.01 {
        return Err(MockError::bad_request("Limit must be positive"));
    }
    state.category_for(user_id, request.category_id)?;

    let duplicate = state.budgets.iter().any(|b| {
        b.user_id == user_id
            && b.category_id == request.category_id
            && b.month == request.month
            && b.year == request.year
    });
    if duplicate {
        return Err(MockError::bad_request(
            "Budget for this category and month already exists",
        ));
    }

    let id = state.next_id();
    let budget = StoredBudget {
        id,
        user_id,
        category_id: request.category_id,
        monthly_limit: request.monthly_limit,
        month: request.month,
        year: request.year,
    };
    let view = state.budget_view(&budget);
    state.budgets.push(budget);
    Ok((StatusCode::CREATED, Json(view)))
}

fn owned_budget_index(
    state: &MockState,
    user_id: i64,
    id: i64,
    action: &str,
) -> MockResult<usize> {
    let index = state
        .budgets
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| MockError::not_found("Budget not found"))?;
    if state.budgets[index].user_id != user_id {
        return Err(MockError::forbidden(&format!(
            "You do not have permission to {} this budget",
            action
        )));
    }
    Ok(index)
}

/// Only the limit of an existing budget can change
async fn update_budget(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<BudgetRequest>,
) -> MockResult<Json<Budget>> {
    let mut state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    if request.monthly_limit < 0.01 {
        return Err(MockError::bad_request("Limit must be positive"));
    }
    let index = owned_budget_index(&state, user_id, id, "update")?;
    state.budgets[index].monthly_limit = request.monthly_limit;
    Ok(Json(state.budget_view(&state.budgets[index])))
}

async fn delete_budget(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> MockResult<StatusCode> {
    let mut state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    let index = owned_budget_index(&state, user_id, id, "delete")?;
    state.budgets.remove(index);
    Ok(StatusCode::NO_CONTENT)
}

async fn dashboard_stats(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> MockResult<Json<DashboardStats>> {
    let state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    let expenses = state.user_expenses(user_id);
    Ok(Json(metrics::dashboard_stats(&expenses, state.today)))
}

async fn dashboard_category_breakdown(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> MockResult<Json<Vec<CategorySpending>>> {
    let state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    let (year, month) = state.resolve_month(&query);
    let expenses = state.user_expenses_in_month(user_id, year, month);
    Ok(Json(metrics::category_breakdown(&expenses)))
}

async fn dashboard_trends(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> MockResult<Json<Vec<DailyTrend>>> {
    let state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    let (year, month) = state.resolve_month(&query);
    let expenses = state.user_expenses_in_month(user_id, year, month);
    Ok(Json(metrics::daily_trend(&expenses)))
}

async fn dashboard_monthly_comparison(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> MockResult<Json<MonthlyComparison>> {
    let state = lock(&state)?;
    let user_id = current_user(&state, &headers)?;
    let (year, month) = (state.today.year(), state.today.month());
    let (prev_year, prev_month) = metrics::previous_month(year, month);

    let total = |expenses: Vec<Expense>| -> f64 {
        metrics::round_cents(expenses.iter().fold(0.0, |acc, e| acc + e.amount))
    };
    let current = total(state.user_expenses_in_month(user_id, year, month));
    let previous = total(state.user_expenses_in_month(user_id, prev_year, prev_month));
    Ok(Json(MonthlyComparison::compute(current, previous)))
}
