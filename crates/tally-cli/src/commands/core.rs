//! Shared command plumbing
//!
//! This module contains:
//! - `App` - API client, services and auth context built from configuration
//! - `api_error` / `form_error` - turn library errors into user-facing messages
//! - `confirm` - the `[y/N]` prompt used before deletes
//! - date and category helpers shared by several commands

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use tally_core::models::User;
use tally_core::{
    ApiClient, AuthContext, ClientConfig, Error as ApiError, FieldErrors, Services, SessionStore,
};
use tracing::debug;

/// Everything a command needs to talk to the API
pub struct App {
    pub client: ApiClient,
    pub services: Services,
    pub auth: AuthContext,
}

impl App {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        debug!(
            api_url = %config.api_url,
            session = %config.session_file.display(),
            "Connecting"
        );
        let session = Arc::new(SessionStore::file(&config.session_file));
        let client = ApiClient::new(config, session).context("Failed to create API client")?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self {
            services: Services::new(client.clone()),
            auth: AuthContext::new(&client),
            client,
        }
    }

    /// The logged-in user, or an error telling them to log in
    pub fn require_login(&self) -> Result<User> {
        self.auth
            .current_user()
            .ok_or_else(|| anyhow::anyhow!("Not logged in. Run 'tally login' first."))
    }
}

/// Resolve configuration from file, environment and command-line overrides
pub fn load_config(
    config_path: Option<&Path>,
    api_url: Option<&str>,
    session_file: Option<&Path>,
) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config = config.with_api_url(url);
    }
    if let Some(path) = session_file {
        config = config.with_session_file(path.to_path_buf());
    }
    Ok(config)
}

/// Map a library error to the message the user should see
pub fn api_error(err: ApiError) -> anyhow::Error {
    debug!("API error: {:?}", err);
    anyhow::anyhow!(err.user_message())
}

/// Field errors as a single message, one per field
pub fn form_error(errors: FieldErrors) -> anyhow::Error {
    anyhow::anyhow!("{}", errors)
}

/// Ask a yes/no question; anything but "y" is no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// The local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Fill in a missing year or month from today's date
pub fn resolve_month(year: Option<i32>, month: Option<u32>) -> Result<(i32, u32)> {
    let today = today();
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());
    if !(1..=12).contains(&month) {
        anyhow::bail!("Month must be between 1 and 12");
    }
    Ok((year, month))
}

/// Parse an optional `YYYY-MM-DD` argument
pub fn parse_date_arg(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
        })
        .transpose()
}

/// Accept a category ID or a (case-insensitive) category name, returning the ID
pub async fn resolve_category(app: &App, raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.parse::<i64>().is_ok() {
        return Ok(raw.to_string());
    }

    let categories = app.services.categories.list().await.map_err(api_error)?;
    categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(raw))
        .map(|c| c.id.to_string())
        .ok_or_else(|| {
            let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
            anyhow::anyhow!("Unknown category: {}. Available: {}", raw, names.join(", "))
        })
}
