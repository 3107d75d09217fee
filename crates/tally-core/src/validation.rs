//! Typed form state and client-side validation
//!
//! Each form holds the raw text a user entered. `validate()` is pure: it either
//! produces the typed request body for the API or a `FieldErrors` map keyed by
//! field name. Nothing is sent to the server until validation passes.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{
    BudgetRequest, ExpenseRequest, LoginRequest, NewCategory, PaymentMethod, RegisterRequest,
};

/// Smallest accepted amount or limit
pub const MIN_AMOUNT: f64 = 0.01;

/// Earliest year a budget can be set for
pub const MIN_BUDGET_YEAR: i32 = 2024;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Color given to categories created without one
pub const DEFAULT_CATEGORY_COLOR: &str = "#808080";

/// Icon given to categories created without one
pub const DEFAULT_CATEGORY_ICON: &str = "more-horizontal";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid email regex")
    })
}

fn color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"))
}

/// Field name -> first error message for that field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first error per field wins
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join("; "))
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !email_regex().is_match(email) {
        errors.add("email", "Invalid email address");
    }
}

/// Parse a positive money amount, recording `required`/`positive` errors
fn check_amount(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    required: &str,
    positive: &str,
) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, required);
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= MIN_AMOUNT => Some(v),
        Ok(_) => {
            errors.add(field, positive);
            None
        }
        Err(_) => {
            errors.add(field, format!("{} must be a number", field_label(field)));
            None
        }
    }
}

fn check_id(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    required: &str,
) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.add(field, required);
            None
        }
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "amount" => "Amount",
        "monthlyLimit" => "Limit",
        _ => field,
    }
}

/// Sign-in form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result(|| LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

/// Account creation form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        } else if name.chars().count() < MIN_NAME_LEN {
            errors.add("name", "Name must be at least 2 characters");
        }

        check_email(&mut errors, &self.email);

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add("password", "Password must be at least 6 characters");
        }

        errors.into_result(|| RegisterRequest {
            name: name.to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

/// New/edit expense form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseForm {
    pub description: String,
    pub amount: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub category_id: String,
    pub payment_method: String,
}

impl ExpenseForm {
    /// Blank form for a new expense: dated today, paid in cash
    pub fn new(today: NaiveDate) -> Self {
        Self {
            description: String::new(),
            amount: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            category_id: String::new(),
            payment_method: PaymentMethod::Cash.as_str().to_string(),
        }
    }

    /// Form pre-filled from an existing expense for editing
    pub fn from_expense(expense: &crate::models::Expense) -> Self {
        Self {
            description: expense.description.clone().unwrap_or_default(),
            amount: format!("{:.2}", expense.amount),
            date: expense.date.format("%Y-%m-%d").to_string(),
            category_id: expense.category_id.to_string(),
            payment_method: expense.payment_method.as_str().to_string(),
        }
    }

    pub fn validate(&self, today: NaiveDate) -> Result<ExpenseRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", "Description is required");
        }

        let amount = check_amount(
            &mut errors,
            "amount",
            &self.amount,
            "Amount is required",
            "Amount must be positive",
        );

        let date = if self.date.trim().is_empty() {
            errors.add("date", "Date is required");
            None
        } else {
            match NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d") {
                Ok(d) if d > today => {
                    errors.add("date", "Date cannot be in the future");
                    None
                }
                Ok(d) => Some(d),
                Err(_) => {
                    errors.add("date", "Date must be in YYYY-MM-DD format");
                    None
                }
            }
        };

        let category_id = check_id(
            &mut errors,
            "categoryId",
            &self.category_id,
            "Category is required",
        );

        let payment_method = if self.payment_method.trim().is_empty() {
            errors.add("paymentMethod", "Payment method is required");
            None
        } else {
            match self.payment_method.parse::<PaymentMethod>() {
                Ok(m) => Some(m),
                Err(e) => {
                    errors.add("paymentMethod", e);
                    None
                }
            }
        };

        match (amount, date, category_id, payment_method) {
            (Some(amount), Some(date), Some(category_id), Some(payment_method))
                if errors.is_empty() =>
            {
                Ok(ExpenseRequest {
                    amount,
                    category_id,
                    date,
                    description: Some(description.to_string()),
                    payment_method,
                })
            }
            _ => Err(errors),
        }
    }
}

/// New/edit budget form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetForm {
    pub category_id: String,
    pub monthly_limit: String,
    pub month: String,
    pub year: String,
}

impl BudgetForm {
    /// Blank form for the given month
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            category_id: String::new(),
            monthly_limit: String::new(),
            month: month.to_string(),
            year: year.to_string(),
        }
    }

    /// Form pre-filled from an existing budget for editing
    pub fn from_budget(budget: &crate::models::Budget) -> Self {
        Self {
            category_id: budget.category_id.to_string(),
            monthly_limit: format!("{:.2}", budget.monthly_limit),
            month: budget.month.to_string(),
            year: budget.year.to_string(),
        }
    }

    pub fn validate(&self) -> Result<BudgetRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let category_id = check_id(
            &mut errors,
            "categoryId",
            &self.category_id,
            "Category is required",
        );

        let monthly_limit = check_amount(
            &mut errors,
            "monthlyLimit",
            &self.monthly_limit,
            "Limit is required",
            "Limit must be positive",
        );

        let month = match self.month.trim().parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => Some(m),
            _ => {
                errors.add("month", "Month must be between 1 and 12");
                None
            }
        };

        let year = match self.year.trim().parse::<i32>() {
            Ok(y) if y >= MIN_BUDGET_YEAR => Some(y),
            _ => {
                errors.add("year", "Year must be valid");
                None
            }
        };

        match (category_id, monthly_limit, month, year) {
            (Some(category_id), Some(monthly_limit), Some(month), Some(year)) => {
                Ok(BudgetRequest {
                    category_id,
                    monthly_limit,
                    month,
                    year,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Custom category form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForm {
    pub name: String,
    /// Optional; defaults to grey
    pub color: String,
    /// Optional; defaults to a generic icon
    pub icon: String,
}

impl CategoryForm {
    pub fn validate(&self) -> Result<NewCategory, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let color = self.color.trim();
        let color = if color.is_empty() {
            DEFAULT_CATEGORY_COLOR
        } else {
            if !color_regex().is_match(color) {
                errors.add("color", "Color must be a hex value like #A1B2C3");
            }
            color
        };

        let icon = match self.icon.trim() {
            "" => DEFAULT_CATEGORY_ICON,
            icon => icon,
        };

        errors.into_result(|| NewCategory {
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        })
    }
}
