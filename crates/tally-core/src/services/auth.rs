use tracing::debug;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};

/// `/auth` endpoints. Neither sends a bearer token.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        debug!(email = %request.email, "Logging in");
        self.client.post_public("/auth/login", request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        debug!(email = %request.email, "Registering");
        self.client.post_public("/auth/register", request).await
    }
}
