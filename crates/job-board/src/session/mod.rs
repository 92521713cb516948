//! Who is using the client right now.
//!
//! A [`Session`] is built per request from whatever token the caller presented
//! and is passed explicitly to every page view.

pub mod claims;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::api::ApiError;
use crate::domain::{AuthResponse, LoginRequest, RegisterRequest, Role, UserId};

pub use claims::{decode_claims, TokenClaims, TokenError};
pub use store::{MemoryTokenStore, TokenStore};

/// Cookie carrying the bearer token between browser and web service.
pub const TOKEN_COOKIE: &str = "auth_token";

/// The authenticated account as read from the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn from_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<Self, TokenError> {
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(Self {
            user_id: claims.user_id,
            role: claims.role()?,
        })
    }
}

/// Auth endpoints the session drives.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError>;
    async fn register(&self, profile: &RegisterRequest) -> Result<AuthResponse, ApiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Login failed. Please check your credentials.")]
    LoginFailed(#[source] ApiError),
    #[error("Registration failed. Please try again.")]
    RegistrationFailed(#[source] ApiError),
    #[error("received an unusable token: {0}")]
    InvalidToken(#[from] TokenError),
}

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    identity: Option<Identity>,
    discarded: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("discarded", &self.discarded)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn anonymous(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            identity: None,
            discarded: false,
        }
    }

    /// Decodes whatever token the store holds. A missing, malformed or expired
    /// token leaves the session anonymous and the store empty.
    pub fn restore(store: Arc<dyn TokenStore>) -> Self {
        Self::restore_at(store, Utc::now())
    }

    pub fn restore_at(store: Arc<dyn TokenStore>, now: DateTime<Utc>) -> Self {
        let Some(token) = store.get() else {
            return Self::anonymous(store);
        };

        let identity = decode_claims(&token).and_then(|claims| Identity::from_claims(&claims, now));
        match identity {
            Ok(identity) => Self {
                store,
                identity: Some(identity),
                discarded: false,
            },
            Err(err) => {
                debug!(error = %err, "discarding stored token");
                store.clear();
                Self {
                    discarded: true,
                    ..Self::anonymous(store)
                }
            }
        }
    }

    /// Session for a token taken from a request header or cookie.
    pub fn from_bearer(token: Option<String>) -> Self {
        let store = MemoryTokenStore::default();
        if let Some(token) = token.filter(|token| !token.trim().is_empty()) {
            store.set(token);
        }
        Self::restore(Arc::new(store))
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// A token was presented but was expired or unreadable.
    pub fn token_discarded(&self) -> bool {
        self.discarded
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.identity.map(|identity| identity.user_id)
    }

    pub fn user_role(&self) -> Option<Role> {
        self.identity.map(|identity| identity.role)
    }

    pub fn token(&self) -> Option<String> {
        self.store.get()
    }

    /// Store shared with the API client so a 401 anywhere ends the session.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }

    /// Authenticates and returns the dashboard path for the account's role.
    pub async fn login<A>(
        &mut self,
        auth: &A,
        credentials: &LoginRequest,
    ) -> Result<&'static str, SessionError>
    where
        A: AuthGateway + ?Sized,
    {
        let response = auth
            .login(credentials)
            .await
            .map_err(SessionError::LoginFailed)?;
        self.adopt(response.token)
    }

    pub async fn register<A>(
        &mut self,
        auth: &A,
        profile: &RegisterRequest,
    ) -> Result<&'static str, SessionError>
    where
        A: AuthGateway + ?Sized,
    {
        let response = auth
            .register(profile)
            .await
            .map_err(SessionError::RegistrationFailed)?;
        self.adopt(response.token)
    }

    /// Clears the token and identity; returns where to send the browser.
    pub fn logout(&mut self) -> &'static str {
        if let Some(identity) = self.identity.take() {
            info!(user_id = %identity.user_id, "session ended");
        }
        self.store.clear();
        "/"
    }

    fn adopt(&mut self, token: String) -> Result<&'static str, SessionError> {
        let claims = decode_claims(&token)?;
        let identity = Identity::from_claims(&claims, Utc::now())?;

        self.store.set(token);
        self.identity = Some(identity);
        self.discarded = false;
        info!(user_id = %identity.user_id, role = %identity.role, "session started");
        Ok(identity.role.dashboard_path())
    }
}
