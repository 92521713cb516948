//! Role-specific page view models. Every view takes the request's [`Session`]
//! explicitly and goes through the route guard before touching the backend.

pub mod employer;
pub mod forms;
pub mod guard;
pub mod jobseeker;
pub mod resume;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::api::{describe_error, ApiClient, ApiError};
use crate::config::BackendConfig;
use crate::domain::{Application, ProfileUpdate, UserProfile, Vacancy};
use crate::services::{ApplicationService, JobBoardApi};
use crate::session::{Session, SessionError, TOKEN_COOKIE};
use crate::workflows::applications::{
    ApplicationAction, ApplicationBoard, ApplicationWorkflow, Locale, WorkflowError,
};

pub use forms::ValidationErrors;
pub use guard::{RouteGuard, LOGIN_PATH};

/// What a page needs to talk to the backend on behalf of one session.
#[derive(Debug, Clone)]
pub struct PageContext {
    api: JobBoardApi,
    locale: Locale,
}

impl PageContext {
    pub fn new(api: JobBoardApi, locale: Locale) -> Self {
        Self { api, locale }
    }

    /// Facades bound to the session's token store, so a backend 401 also
    /// signs the session out.
    pub fn for_session(http: reqwest::Client, backend: &BackendConfig, session: &Session) -> Self {
        let client = ApiClient::with_http(http, &backend.base_url, session.token_store());
        Self::new(
            JobBoardApi::new(client, backend.status_vocabulary),
            backend.locale,
        )
    }

    pub fn api(&self) -> &JobBoardApi {
        &self.api
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn workflow(&self) -> ApplicationWorkflow<ApplicationService> {
        ApplicationWorkflow::new(std::sync::Arc::new(self.api.applications()))
    }
}

/// One application as listed on a page, with the actions its viewer may take.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    #[serde(flatten)]
    pub application: Application,
    pub status_label: String,
    pub actions: Vec<ApplicationAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacancy: Option<Vacancy>,
}

impl ApplicationRow {
    pub fn new(board: &ApplicationBoard, application: &Application, locale: Locale) -> Self {
        Self {
            application: application.clone(),
            status_label: application.status.label(locale).to_string(),
            actions: board.actions_for(application),
            vacancy: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePage {
    pub profile: UserProfile,
    pub form: ProfileUpdate,
}

/// The signed-in account's profile, with the edit form pre-filled.
pub async fn profile(ctx: &PageContext, session: &Session) -> Result<ProfilePage, ViewError> {
    let identity = RouteGuard::require_any(session)?;
    let profile = ctx.api().users().profile(identity.user_id).await?;
    let form = ProfileUpdate::from_profile(&profile);
    Ok(ProfilePage { profile, form })
}

/// Saves the profile form and reloads the stored profile.
pub async fn update_profile(
    ctx: &PageContext,
    session: &Session,
    form: forms::ProfileForm,
) -> Result<ProfilePage, ViewError> {
    let identity = RouteGuard::require_any(session)?;
    let update = form.validate(identity.user_id)?;
    ctx.api().users().update_profile(&update).await?;
    tracing::info!(user_id = %identity.user_id, "profile updated");
    profile(ctx, session).await
}

/// Why a page could not be rendered.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("redirect to {0}")]
    Redirect(&'static str),
    /// The token expired or the backend refused it; the cookie is dropped too.
    #[error("session expired")]
    SessionExpired,
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Workflow(WorkflowError),
    #[error("{}", describe_error(.0))]
    Api(ApiError),
    #[error(transparent)]
    Session(SessionError),
    #[error("{0}")]
    Precondition(String),
    #[error("{0}")]
    Forbidden(String),
}

impl From<ApiError> for ViewError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Unauthorized => ViewError::SessionExpired,
            other => ViewError::Api(other),
        }
    }
}

impl From<WorkflowError> for ViewError {
    fn from(value: WorkflowError) -> Self {
        match value {
            WorkflowError::Api(api) => api.into(),
            other => ViewError::Workflow(other),
        }
    }
}

impl From<ValidationErrors> for ViewError {
    fn from(value: ValidationErrors) -> Self {
        ViewError::Validation(value)
    }
}

impl From<SessionError> for ViewError {
    fn from(value: SessionError) -> Self {
        ViewError::Session(value)
    }
}

impl ViewError {
    pub fn status(&self) -> StatusCode {
        match self {
            ViewError::Redirect(_) | ViewError::SessionExpired => StatusCode::SEE_OTHER,
            ViewError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ViewError::Workflow(err) => workflow_status(err),
            ViewError::Api(err) => api_status(err),
            ViewError::Session(SessionError::LoginFailed(_)) => StatusCode::UNAUTHORIZED,
            ViewError::Session(SessionError::RegistrationFailed(err)) => match api_status(err) {
                StatusCode::BAD_GATEWAY => StatusCode::BAD_GATEWAY,
                _ => StatusCode::BAD_REQUEST,
            },
            ViewError::Session(SessionError::InvalidToken(_)) => StatusCode::BAD_GATEWAY,
            ViewError::Precondition(_) => StatusCode::CONFLICT,
            ViewError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

fn workflow_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::ResumeRequired => StatusCode::UNPROCESSABLE_ENTITY,
        WorkflowError::WrongRole { .. }
        | WorkflowError::NotOwner(_)
        | WorkflowError::ResumeNotOwned(_) => StatusCode::FORBIDDEN,
        WorkflowError::UnknownApplication(_) => StatusCode::NOT_FOUND,
        WorkflowError::VacancyNotPublished(_)
        | WorkflowError::InvalidTransition { .. }
        | WorkflowError::UnrecognizedStatus { .. } => StatusCode::CONFLICT,
        WorkflowError::TransitionNotApplied { .. } | WorkflowError::StatisticsMismatch(_) => {
            StatusCode::BAD_GATEWAY
        }
        WorkflowError::Api(api) => api_status(api),
    }
}

/// Backend 4xx answers are mirrored; everything else is the backend's fault.
fn api_status(err: &ApiError) -> StatusCode {
    err.status()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(StatusCode::is_client_error)
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

/// `Set-Cookie` value that drops the token cookie.
pub fn expired_token_cookie() -> String {
    format!("{TOKEN_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

fn redirect(status: StatusCode, location: &'static str) -> Response {
    let mut response = (status, Json(json!({ "redirect": location }))).into_response();
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static(location));
    response
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ViewError::Redirect(location) => redirect(status, location),
            ViewError::SessionExpired => {
                let mut response = redirect(status, LOGIN_PATH);
                if let Ok(cookie) = HeaderValue::from_str(&expired_token_cookie()) {
                    response.headers_mut().insert(header::SET_COOKIE, cookie);
                }
                response
            }
            ViewError::Validation(errors) => (
                status,
                Json(json!({ "error": "validation failed", "fields": errors })),
            )
                .into_response(),
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}
