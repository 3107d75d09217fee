//! Authentication context
//!
//! Drives the session state machine from the login, registration and logout
//! flows. Form input is validated locally before anything is sent; a rejected
//! attempt leaves the session `Anonymous` with a message fit for display.

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::models::{AuthResponse, User};
use crate::services::AuthService;
use crate::session::{Session, SessionPhase, SessionStore};
use crate::validation::{LoginForm, RegisterForm};

pub const LOGIN_FAILED: &str = "Invalid email or password";
pub const REGISTRATION_FAILED: &str = "Registration failed";

pub struct AuthContext {
    session: Arc<SessionStore>,
    auth: AuthService,
}

impl AuthContext {
    /// Context sharing the client's session store
    pub fn new(client: &ApiClient) -> Self {
        Self {
            session: client.session().clone(),
            auth: AuthService::new(client.clone()),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Sign in. Invalid input fails with `Error::Validation` before any state
    /// change; a rejected attempt fails with `Error::AuthFailed`.
    pub async fn login(&self, form: &LoginForm) -> Result<User> {
        let request = form.validate().map_err(Error::Validation)?;
        self.session.begin()?;
        let outcome = self.auth.login(&request).await;
        self.settle(outcome, LOGIN_FAILED)
    }

    /// Create an account and sign straight in
    pub async fn register(&self, form: &RegisterForm) -> Result<User> {
        let request = form.validate().map_err(Error::Validation)?;
        self.session.begin()?;
        let outcome = self.auth.register(&request).await;
        self.settle(outcome, REGISTRATION_FAILED)
    }

    pub fn logout(&self) -> Result<()> {
        if let Some(user) = self.session.user() {
            info!("Logged out {}", user.email);
        }
        self.session.logout()
    }

    /// Finish an attempt begun with `SessionStore::begin`
    fn settle(&self, outcome: Result<AuthResponse>, fallback: &str) -> Result<User> {
        match outcome {
            Ok(response) => {
                let user = response.user();
                self.session.complete(Session {
                    user: user.clone(),
                    token: response.token,
                })?;
                debug!(user = %user.email, "Authenticated");
                Ok(user)
            }
            Err(e) => {
                debug!("Authentication rejected: {}", e);
                self.session.fail()?;
                let message = e.server_message().unwrap_or(fallback).to_string();
                Err(Error::AuthFailed(message))
            }
        }
    }
}
