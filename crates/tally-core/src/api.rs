//! HTTP client for the Tally REST API
//!
//! Thin wrapper over `reqwest` that knows the base URL, attaches the bearer
//! token from the shared [`SessionStore`], and turns non-2xx responses into
//! [`Error`] values carrying the server's `{"message": ...}` text.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::SessionStore;

/// Error body shape returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Shared API client; cheap to clone
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Build a client from resolved configuration
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Client with default HTTP settings pointed at `base_url`
    pub fn with_base_url(base_url: &str, session: Arc<SessionStore>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request, attaching the bearer token when one exists
    fn request(&self, method: Method, path: &str) -> (RequestBuilder, bool) {
        let builder = self.http_client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => (builder.bearer_auth(token), true),
            None => (builder, false),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
        authed: bool,
    ) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "API request");

        if status.is_success() {
            return Ok(response);
        }
        Err(self.error_from(response, path, authed).await)
    }

    async fn error_from(&self, response: Response, path: &str, authed: bool) -> Error {
        let status = response.status();
        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        if status == StatusCode::UNAUTHORIZED && authed {
            // Token rejected: the stored session is no good anymore
            if let Err(e) = self.session.logout() {
                warn!("Failed to clear rejected session: {}", e);
            }
        }

        match (status, message) {
            (_, Some(message)) => Error::Api {
                status: status.as_u16(),
                message,
            },
            (StatusCode::UNAUTHORIZED, None) => Error::Unauthorized,
            (StatusCode::NOT_FOUND, None) => Error::NotFound(path.to_string()),
            (_, None) => Error::Api {
                status: status.as_u16(),
                message: String::new(),
            },
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let (builder, authed) = self.request(Method::GET, path);
        let response = self.send(Method::GET, path, builder, authed).await?;
        Ok(response.json().await?)
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let (builder, authed) = self.request(Method::GET, path);
        let response = self
            .send(Method::GET, path, builder.query(query), authed)
            .await?;
        Ok(response.json().await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, authed) = self.request(Method::POST, path);
        let response = self
            .send(Method::POST, path, builder.json(body), authed)
            .await?;
        Ok(response.json().await?)
    }

    /// POST without the bearer token (login and registration)
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http_client.post(self.url(path)).json(body);
        let response = self.send(Method::POST, path, builder, false).await?;
        Ok(response.json().await?)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, authed) = self.request(Method::PUT, path);
        let response = self
            .send(Method::PUT, path, builder.json(body), authed)
            .await?;
        Ok(response.json().await?)
    }

    /// DELETE; any 2xx (normally 204 No Content) is success
    pub async fn delete(&self, path: &str) -> Result<()> {
        let (builder, authed) = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, builder, authed).await?;
        Ok(())
    }
}
