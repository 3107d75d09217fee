//! CLI command tests
//!
//! Commands run against the in-memory mock backend from tally-core.

use std::sync::Arc;

use tally_core::models::{ExpenseQuery, MonthQuery, PaymentMethod, User};
use tally_core::session::{MemoryStorage, Session};
use tally_core::test_utils::MockServer;
use tally_core::{ApiClient, SessionStore};

use crate::commands::{self, truncate, App, ExpenseInput, ListOptions};

fn anonymous_app(server: &MockServer) -> App {
    let client = ApiClient::with_base_url(&server.url(), Arc::new(SessionStore::in_memory()));
    App::with_client(client)
}

async fn logged_in_app(server: &MockServer, email: &str) -> App {
    let app = anonymous_app(server);
    commands::cmd_register(&app, "Ada Lovelace", email, "secret123")
        .await
        .unwrap();
    app
}

fn lunch() -> ExpenseInput {
    ExpenseInput {
        amount: Some("12.50".to_string()),
        category: Some("food".to_string()),
        description: Some("Lunch".to_string()),
        date: None,
        payment_method: Some("card".to_string()),
    }
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("Entertainment expenses", 10), "Enterta...");
    // Multi-byte characters are never split
    assert_eq!(truncate("Café crème brûlée", 8), "Café ...");
}

#[test]
fn test_resolve_month() {
    assert_eq!(commands::resolve_month(Some(2025), Some(7)).unwrap(), (2025, 7));
    assert!(commands::resolve_month(Some(2025), Some(13)).is_err());

    let (year, month) = commands::resolve_month(None, None).unwrap();
    let today = commands::today();
    assert_eq!((year, month), (chrono::Datelike::year(&today), chrono::Datelike::month(&today)));
}

#[test]
fn test_parse_date_arg() {
    assert!(commands::parse_date_arg(None, "--from").unwrap().is_none());
    assert_eq!(
        commands::parse_date_arg(Some("2026-03-01"), "--from")
            .unwrap()
            .unwrap()
            .to_string(),
        "2026-03-01"
    );
    let err = commands::parse_date_arg(Some("03/01/2026"), "--to").unwrap_err();
    assert!(err.to_string().contains("--to"));
}

#[test]
fn test_load_config_flag_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    let config =
        commands::load_config(None, Some("http://127.0.0.1:9999/api/"), Some(&session)).unwrap();
    assert_eq!(config.api_url, "http://127.0.0.1:9999/api");
    assert_eq!(config.session_file, session);
}

// ========== Auth Command Tests ==========

#[tokio::test]
async fn test_cmd_register_logs_in() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    assert!(app.auth.is_authenticated());
    assert_eq!(app.require_login().unwrap().email, "ada@example.com");
}

#[tokio::test]
async fn test_cmd_register_validation_errors() {
    let server = MockServer::start().await;
    let app = anonymous_app(&server);

    let err = commands::cmd_register(&app, "A", "ada@example", "123")
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Name must be at least 2 characters"));
    assert!(message.contains("Invalid email address"));
    assert!(message.contains("Password must be at least 6 characters"));
    assert!(!app.auth.is_authenticated());
}

#[tokio::test]
async fn test_cmd_login_with_wrong_password() {
    let server = MockServer::start().await;
    logged_in_app(&server, "ada@example.com").await;

    let app = anonymous_app(&server);
    let err = commands::cmd_login(&app, "ada@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(!app.auth.is_authenticated());
}

#[tokio::test]
async fn test_cmd_logout_and_whoami() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    commands::cmd_whoami(&app).unwrap();
    commands::cmd_logout(&app).unwrap();
    assert!(!app.auth.is_authenticated());

    // Logging out twice is harmless
    commands::cmd_logout(&app).unwrap();
    commands::cmd_whoami(&app).unwrap();
}

#[tokio::test]
async fn test_commands_require_login() {
    let server = MockServer::start().await;
    let app = anonymous_app(&server);

    let err = commands::cmd_expenses_list(&app, &ListOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Not logged in"));

    let err = commands::cmd_dashboard(&app, None, None).await.unwrap_err();
    assert!(err.to_string().contains("Not logged in"));
}

#[tokio::test]
async fn test_expired_session_is_cleared() {
    let server = MockServer::start().await;
    let stale = Session {
        user: User {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        },
        token: "stale".to_string(),
    };
    let session = Arc::new(SessionStore::new(Box::new(MemoryStorage::with_session(stale))));
    let app = App::with_client(ApiClient::with_base_url(&server.url(), session));

    let err = commands::cmd_dashboard(&app, None, None).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Your session has expired. Please log in again."));
    assert!(!app.auth.is_authenticated());
}

#[tokio::test]
async fn test_session_file_persists_between_runs() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    let config = commands::load_config(None, Some(&server.url()), Some(&session)).unwrap();

    {
        let app = App::new(&config).unwrap();
        commands::cmd_register(&app, "Ada Lovelace", "ada@example.com", "secret123")
            .await
            .unwrap();
    }

    let app = App::new(&config).unwrap();
    assert_eq!(app.require_login().unwrap().name, "Ada Lovelace");
    commands::cmd_categories_list(&app).await.unwrap();

    commands::cmd_logout(&app).unwrap();
    assert!(!session.exists());
}

// ========== Expense Command Tests ==========

#[tokio::test]
async fn test_cmd_expenses_add_then_delete() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    commands::cmd_expenses_add(&app, &lunch()).await.unwrap();
    assert_eq!(server.expense_count(), 1);

    let page = app
        .services
        .expenses
        .list(&ExpenseQuery::default())
        .await
        .unwrap();
    let created = &page.content[0];
    assert_eq!(created.category_name, "Food");
    assert_eq!(created.payment_method, PaymentMethod::Card);
    assert_eq!(created.date, commands::today());

    commands::cmd_expenses_show(&app, created.id).await.unwrap();
    commands::cmd_expenses_delete(&app, created.id, true)
        .await
        .unwrap();

    let page = app
        .services
        .expenses
        .list(&ExpenseQuery::default())
        .await
        .unwrap();
    assert!(page.content.iter().all(|e| e.id != created.id));
}

#[tokio::test]
async fn test_cmd_expenses_add_rejects_bad_input() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    let mut input = lunch();
    input.amount = Some("-5".to_string());
    let err = commands::cmd_expenses_add(&app, &input).await.unwrap_err();
    assert!(err.to_string().contains("Amount must be positive"));

    let mut input = lunch();
    let tomorrow = commands::today().succ_opt().unwrap();
    input.date = Some(tomorrow.format("%Y-%m-%d").to_string());
    let err = commands::cmd_expenses_add(&app, &input).await.unwrap_err();
    assert!(err.to_string().contains("Date cannot be in the future"));

    let mut input = lunch();
    input.category = Some("Groceries".to_string());
    let err = commands::cmd_expenses_add(&app, &input).await.unwrap_err();
    assert!(err.to_string().contains("Unknown category: Groceries"));

    assert_eq!(server.expense_count(), 0);
}

#[tokio::test]
async fn test_cmd_expenses_edit_keeps_unchanged_fields() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;
    commands::cmd_expenses_add(&app, &lunch()).await.unwrap();
    let id = app
        .services
        .expenses
        .list(&ExpenseQuery::default())
        .await
        .unwrap()
        .content[0]
        .id;

    let change = ExpenseInput {
        amount: Some("15".to_string()),
        category: Some("2".to_string()),
        ..Default::default()
    };
    commands::cmd_expenses_edit(&app, id, &change).await.unwrap();

    let updated = app.services.expenses.get(id).await.unwrap();
    assert_eq!(updated.amount, 15.0);
    assert_eq!(updated.category_name, "Transport");
    assert_eq!(updated.description.as_deref(), Some("Lunch"));
    assert_eq!(updated.payment_method, PaymentMethod::Card);
}

#[tokio::test]
async fn test_cmd_expenses_list_options() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;
    commands::cmd_expenses_add(&app, &lunch()).await.unwrap();

    let filtered = ListOptions {
        category: Some("Food".to_string()),
        search: Some("lunch".to_string()),
        sort_by: "amount".to_string(),
        direction: "asc".to_string(),
        ..Default::default()
    };
    commands::cmd_expenses_list(&app, &filtered).await.unwrap();

    let bad_page = ListOptions {
        page: 0,
        ..Default::default()
    };
    let err = commands::cmd_expenses_list(&app, &bad_page)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Page numbers start at 1"));

    let bad_sort = ListOptions {
        sort_by: "merchant".to_string(),
        ..Default::default()
    };
    let err = commands::cmd_expenses_list(&app, &bad_sort)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown sort field"));
}

#[tokio::test]
async fn test_cmd_expenses_show_missing() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    let err = commands::cmd_expenses_show(&app, 404).await.unwrap_err();
    assert_eq!(err.to_string(), "Expense not found");
}

// ========== Budget Command Tests ==========

#[tokio::test]
async fn test_cmd_budgets_set_edit_delete() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    commands::cmd_budgets_set(&app, "Food", "500", None, None)
        .await
        .unwrap();

    let budgets = app
        .services
        .budgets
        .list(&MonthQuery::default())
        .await
        .unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].monthly_limit, 500.0);
    let id = budgets[0].id;

    commands::cmd_budgets_edit(&app, id, "650", None, None)
        .await
        .unwrap();
    let budgets = app
        .services
        .budgets
        .list(&MonthQuery::default())
        .await
        .unwrap();
    assert_eq!(budgets[0].monthly_limit, 650.0);
    assert_eq!(budgets[0].category_name, "Food");

    commands::cmd_budgets_delete(&app, id, None, None, true)
        .await
        .unwrap();
    assert!(app
        .services
        .budgets
        .list(&MonthQuery::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_cmd_budgets_delete_in_past_month() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    commands::cmd_budgets_set(&app, "Food", "300", Some(1), Some(2025))
        .await
        .unwrap();
    commands::cmd_budgets_set(&app, "Transport", "80", Some(1), Some(2025))
        .await
        .unwrap();

    let january = MonthQuery::new(2025, 1);
    let budgets = app.services.budgets.list(&january).await.unwrap();
    assert_eq!(budgets.len(), 2);
    let food = budgets
        .iter()
        .find(|b| b.category_name == "Food")
        .unwrap()
        .id;

    // Without --month/--year the budget is looked for in the current month
    let err = commands::cmd_budgets_delete(&app, food, None, None, true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found in"));

    commands::cmd_budgets_delete(&app, food, Some(1), Some(2025), true)
        .await
        .unwrap();
    let remaining = app.services.budgets.list(&january).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].category_name, "Transport");
    assert_eq!(remaining[0].year, 2025);
    assert_eq!(remaining[0].month, 1);
}

#[tokio::test]
async fn test_cmd_budgets_set_duplicate() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    commands::cmd_budgets_set(&app, "Bills", "120", None, None)
        .await
        .unwrap();
    let err = commands::cmd_budgets_set(&app, "Bills", "200", None, None)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Budget for this category and month already exists"
    );
}

#[tokio::test]
async fn test_cmd_budgets_validation() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    let err = commands::cmd_budgets_set(&app, "Food", "0", None, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Limit must be positive"));

    let err = commands::cmd_budgets_set(&app, "Food", "100", None, Some(2020))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Year must be valid"));

    let err = commands::cmd_budgets_edit(&app, 999, "100", None, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Budget #999 not found"));
}

// ========== Category and Dashboard Command Tests ==========

#[tokio::test]
async fn test_cmd_categories_add() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;

    commands::cmd_categories_add(&app, "Pets", Some("#12AB34"), Some("paw"))
        .await
        .unwrap();
    let categories = app.services.categories.list().await.unwrap();
    assert_eq!(categories.len(), 9);

    let err = commands::cmd_categories_add(&app, "Garden", Some("green"), None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Color must be a hex value"));

    // Custom categories resolve by name like the defaults
    let mut input = lunch();
    input.category = Some("pets".to_string());
    commands::cmd_expenses_add(&app, &input).await.unwrap();
}

#[tokio::test]
async fn test_cmd_dashboard() {
    let server = MockServer::start().await;
    let app = logged_in_app(&server, "ada@example.com").await;
    commands::cmd_expenses_add(&app, &lunch()).await.unwrap();

    commands::cmd_dashboard(&app, None, None).await.unwrap();

    let err = commands::cmd_dashboard(&app, None, Some(0)).await.unwrap_err();
    assert!(err.to_string().contains("Month must be between 1 and 12"));
}
