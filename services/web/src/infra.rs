use axum::http::{header, HeaderMap};
use job_board::config::BackendConfig;
use job_board::session::{Session, TOKEN_COOKIE};
use job_board::views::PageContext;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) http: reqwest::Client,
    pub(crate) backend: Arc<BackendConfig>,
}

impl AppState {
    /// Session and backend facades for one incoming request. Nothing
    /// identity-related outlives the request.
    pub(crate) fn page(&self, headers: &HeaderMap) -> (PageContext, Session) {
        let session = Session::from_bearer(request_token(headers));
        let ctx = PageContext::for_session(self.http.clone(), &self.backend, &session);
        (ctx, session)
    }
}

/// `Authorization: Bearer` wins over the `auth_token` cookie.
pub(crate) fn request_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a freshly issued token.
pub(crate) fn token_cookie(token: &str) -> String {
    format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}
