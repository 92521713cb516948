use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::ApiError;
use crate::config::BackendConfig;
use crate::session::TokenStore;

/// HTTP client for the job board backend.
///
/// Every request carries `Authorization: Bearer <token>` when the token store
/// holds one. A 401 empties the store and surfaces as [`ApiError::Unauthorized`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &BackendConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = http_client(config)?;
        Ok(Self::with_http(http, &config.base_url, tokens))
    }

    /// Reuses an existing connection pool, e.g. one shared by all requests of
    /// the web service.
    pub fn with_http(http: reqwest::Client, base_url: &str, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub async fn get<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.send(Method::GET, path, |request| request).await?;
        decode(&bytes)
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let bytes = self
            .send(Method::GET, path, |request| request.query(query))
            .await?;
        decode(&bytes)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self
            .send(Method::POST, path, |request| request.json(body))
            .await?;
        decode(&bytes)
    }

    /// POST whose response body carries nothing the caller needs.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, |request| request.json(body))
            .await
            .map(drop)
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self
            .send(Method::PUT, path, |request| request.json(body))
            .await?;
        decode(&bytes)
    }

    /// Body-less PATCH, as used by the publish toggles. The response body is ignored.
    pub async fn patch(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::PATCH, path, |request| request).await?;
        Ok(())
    }

    /// DELETE; whatever the backend returns in the body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, |request| request).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<F>(&self, method: Method, path: &str, customize: F) -> Result<Vec<u8>, ApiError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }
        let request = customize(request);

        debug!(method = %method, path, "backend request");
        let response = request.send().await.map_err(|err| {
            warn!(method = %method, path, error = %err, "backend unreachable");
            ApiError::Transport(err)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!(method = %method, path, "backend rejected token; clearing session");
            self.tokens.clear();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &bytes);
            warn!(method = %method, path, status = status.as_u16(), error = %err, "backend request failed");
            return Err(err);
        }

        debug!(method = %method, path, status = status.as_u16(), "backend response");
        Ok(bytes.to_vec())
    }
}

/// Connection pool honouring the configured timeout; clone it into every
/// [`ApiClient`] built for a request.
pub fn http_client(config: &BackendConfig) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(ApiError::Transport)
}

fn decode<T>(bytes: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(ApiError::Decode)
}
