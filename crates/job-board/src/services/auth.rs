use async_trait::async_trait;

use crate::api::{ApiClient, ApiError};
use crate::domain::{AuthResponse, LoginRequest, RegisterRequest};
use crate::session::AuthGateway;

#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, profile: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/api/auth/register", profile).await
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/api/auth/login", credentials).await
    }

    /// Asks the backend whether `token` is still accepted.
    pub async fn validate_token(&self, token: &str) -> Result<bool, ApiError> {
        self.client
            .get_with_query("/api/auth/validate", &[("token", token)])
            .await
    }
}

#[async_trait]
impl AuthGateway for AuthService {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        AuthService::login(self, credentials).await
    }

    async fn register(&self, profile: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        AuthService::register(self, profile).await
    }
}
