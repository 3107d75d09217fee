//! Error types for Tally

use thiserror::Error;

use crate::validation::FieldErrors;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// The backend rejected the request and (usually) said why
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not authenticated")]
    Unauthorized,

    /// Login or registration was rejected; the text is user-facing
    #[error("{0}")]
    AuthFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Session error: {0}")]
    Session(String),
}

impl Error {
    /// Text suitable for showing to the user (the server's message verbatim
    /// when there is one)
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { status, message } if message.is_empty() => {
                format!("Request failed with status {}", status)
            }
            Self::Api { message, .. } => message.clone(),
            Self::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            Self::AuthFailed(message) => message.clone(),
            Self::NotFound(what) => format!("{} not found", what),
            Self::Validation(errors) => errors.to_string(),
            Self::Http(e) if e.is_connect() || e.is_timeout() => {
                "Unable to reach the server. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Server-supplied rejection message, if the backend sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
