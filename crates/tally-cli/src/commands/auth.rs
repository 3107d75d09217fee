//! Session commands (register, login, logout, whoami)

use anyhow::Result;
use tally_core::validation::{LoginForm, RegisterForm};
use tally_core::Error as ApiError;
use tracing::info;

use super::{api_error, cmd_dashboard, form_error, App};

fn auth_error(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Validation(errors) => form_error(errors),
        other => api_error(other),
    }
}

/// Create an account, then show the dashboard
pub async fn cmd_register(app: &App, name: &str, email: &str, password: &str) -> Result<()> {
    let form = RegisterForm {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };
    let user = app.auth.register(&form).await.map_err(auth_error)?;

    info!("Registered {}", user.email);
    println!("✅ Welcome to Tally, {}!", user.name);
    cmd_dashboard(app, None, None).await
}

/// Log in, then show the dashboard
pub async fn cmd_login(app: &App, email: &str, password: &str) -> Result<()> {
    let form = LoginForm {
        email: email.to_string(),
        password: password.to_string(),
    };
    let user = app.auth.login(&form).await.map_err(auth_error)?;

    println!("✅ Welcome back, {}!", user.name);
    cmd_dashboard(app, None, None).await
}

pub fn cmd_logout(app: &App) -> Result<()> {
    if !app.auth.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }
    app.auth.logout().map_err(api_error)?;
    println!("👋 Logged out");
    Ok(())
}

pub fn cmd_whoami(app: &App) -> Result<()> {
    match app.auth.current_user() {
        Some(user) => {
            println!("{} <{}>", user.name, user.email);
            println!("   API: {}", app.client.base_url());
        }
        None => println!("Not logged in. Run 'tally login' or 'tally register'."),
    }
    Ok(())
}
