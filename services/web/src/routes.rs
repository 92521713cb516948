use crate::infra::{token_cookie, AppState};
use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use job_board::domain::{
    Application, ApplicationId, Company, Page, PageRequest, Resume, ResumeId, Vacancy, VacancyId,
};
use job_board::session::Session;
use job_board::views::employer::{self, ApplicationsPage, EmployerDashboard};
use job_board::views::forms::{
    CompanyForm, LoginForm, ProfileForm, RegisterForm, ResumeForm, VacancyForm,
};
use job_board::views::jobseeker::{self, JobSeekerDashboard};
use job_board::views::resume::ResumeView;
use job_board::views::{self, expired_token_cookie, ApplicationRow, ProfilePage, ViewError};
use serde::Deserialize;
use serde_json::json;

const LIST_PAGE_SIZE: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusQuery {
    #[serde(default)]
    pub(crate) status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    pub(crate) page: Option<u32>,
    #[serde(default)]
    pub(crate) q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    pub(crate) page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplyRequest {
    #[serde(default)]
    pub(crate) resume_id: Option<ResumeId>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/auth/login", post(login_endpoint))
        .route("/auth/register", post(register_endpoint))
        .route("/auth/logout", post(logout_endpoint))
        .route("/profile", get(profile_endpoint).post(update_profile_endpoint))
        .route("/employer/dashboard", get(employer_dashboard))
        .route("/employer/applications", get(employer_applications))
        .route("/employer/applications/:id/reject", post(reject_endpoint))
        .route(
            "/employer/vacancies",
            get(employer_vacancies).post(create_vacancy_endpoint),
        )
        .route("/employer/vacancies/new", get(vacancy_form_endpoint))
        .route(
            "/employer/vacancies/:id",
            get(employer_vacancy).delete(delete_vacancy_endpoint),
        )
        .route("/employer/vacancies/:id/publish", post(publish_endpoint))
        .route("/employer/vacancies/:id/unpublish", post(unpublish_endpoint))
        .route(
            "/employer/companies",
            get(companies_endpoint).post(create_company_endpoint),
        )
        .route("/employer/resumes/:id", get(employer_resume))
        .route("/jobseeker/dashboard", get(jobseeker_dashboard))
        .route("/jobseeker/vacancies", get(vacancy_search))
        .route("/jobseeker/vacancies/:id", get(jobseeker_vacancy))
        .route("/jobseeker/vacancies/:id/apply", post(apply_endpoint))
        .route("/jobseeker/applications", get(jobseeker_applications))
        .route(
            "/jobseeker/applications/:id/withdraw",
            post(withdraw_endpoint),
        )
        .route(
            "/jobseeker/resumes",
            get(resumes_endpoint).post(create_resume_endpoint),
        )
        .route(
            "/jobseeker/resumes/:id",
            get(jobseeker_resume)
                .put(update_resume_endpoint)
                .delete(delete_resume_endpoint),
        )
        .route("/jobseeker/resumes/:id/publish", post(publish_resume_endpoint))
        .route("/jobseeker/resumes/:id/unpublish", post(unpublish_resume_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn login_endpoint(
    Extension(state): Extension<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Response, ViewError> {
    let credentials = form.validate()?;
    let (ctx, mut session) = state.page(&HeaderMap::new());
    let landing = session.login(&ctx.api().auth(), &credentials).await?;
    Ok(signed_in(&session, landing))
}

pub(crate) async fn register_endpoint(
    Extension(state): Extension<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<Response, ViewError> {
    let profile = form.validate()?;
    let (ctx, mut session) = state.page(&HeaderMap::new());
    let landing = session.register(&ctx.api().auth(), &profile).await?;
    Ok(signed_in(&session, landing))
}

pub(crate) async fn logout_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Response {
    let (_, mut session) = state.page(&headers);
    let landing = session.logout();
    with_cookie(redirect_body(landing), &expired_token_cookie())
}

pub(crate) async fn profile_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfilePage>, ViewError> {
    let (ctx, session) = state.page(&headers);
    views::profile(&ctx, &session).await.map(Json)
}

pub(crate) async fn update_profile_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ProfilePage>, ViewError> {
    let (ctx, session) = state.page(&headers);
    views::update_profile(&ctx, &session, form).await.map(Json)
}

pub(crate) async fn employer_dashboard(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<EmployerDashboard>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::dashboard(&ctx, &session).await.map(Json)
}

pub(crate) async fn employer_applications(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ApplicationsPage>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::applications_for_query(&ctx, &session, query.status.as_deref())
        .await
        .map(Json)
}

pub(crate) async fn reject_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<ApplicationId>,
) -> Result<Json<Application>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::reject_application(&ctx, &session, id)
        .await
        .map(Json)
}

pub(crate) async fn employer_vacancies(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Vacancy>>, ViewError> {
    let (ctx, session) = state.page(&headers);
    let page = PageRequest::new(query.page.unwrap_or(0), LIST_PAGE_SIZE);
    employer::vacancies(&ctx, &session, page).await.map(Json)
}

pub(crate) async fn vacancy_form_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Company>>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::vacancy_form(&ctx, &session).await.map(Json)
}

pub(crate) async fn create_vacancy_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(form): Json<VacancyForm>,
) -> Result<Json<Vacancy>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::create_vacancy(&ctx, &session, form)
        .await
        .map(Json)
}

pub(crate) async fn employer_vacancy(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<VacancyId>,
) -> Result<Json<employer::VacancyDetail>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::vacancy_detail(&ctx, &session, id).await.map(Json)
}

pub(crate) async fn delete_vacancy_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<VacancyId>,
) -> Result<Response, ViewError> {
    let (ctx, session) = state.page(&headers);
    let next = employer::delete_vacancy(&ctx, &session, id).await?;
    Ok(redirect_body(next))
}

pub(crate) async fn publish_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<VacancyId>,
) -> Result<Json<Vacancy>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::set_published(&ctx, &session, id, true)
        .await
        .map(Json)
}

pub(crate) async fn unpublish_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<VacancyId>,
) -> Result<Json<Vacancy>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::set_published(&ctx, &session, id, false)
        .await
        .map(Json)
}

pub(crate) async fn companies_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Company>>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::companies(&ctx, &session).await.map(Json)
}

pub(crate) async fn create_company_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(form): Json<CompanyForm>,
) -> Result<Json<Company>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::create_company(&ctx, &session, form)
        .await
        .map(Json)
}

pub(crate) async fn employer_resume(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<ResumeId>,
) -> Result<Json<ResumeView>, ViewError> {
    let (ctx, session) = state.page(&headers);
    employer::resume(&ctx, &session, id).await.map(Json)
}

pub(crate) async fn jobseeker_dashboard(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<JobSeekerDashboard>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::dashboard(&ctx, &session).await.map(Json)
}

/// Public listing; no session is needed.
pub(crate) async fn vacancy_search(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Page<Vacancy>>, ViewError> {
    let (ctx, _) = state.page(&headers);
    jobseeker::vacancy_search(&ctx, query.page.unwrap_or(0), query.q.as_deref())
        .await
        .map(Json)
}

pub(crate) async fn jobseeker_vacancy(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<VacancyId>,
) -> Result<Json<jobseeker::VacancyDetail>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::vacancy_detail(&ctx, &session, id).await.map(Json)
}

pub(crate) async fn apply_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<VacancyId>,
    body: Option<Json<ApplyRequest>>,
) -> Result<Response, ViewError> {
    let resume_id = body.and_then(|Json(request)| request.resume_id);
    let (ctx, session) = state.page(&headers);
    let created = jobseeker::apply(&ctx, &session, id, resume_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "application": created, "redirect": jobseeker::APPLICATIONS_PATH })),
    )
        .into_response())
}

pub(crate) async fn jobseeker_applications(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ApplicationRow>>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::applications(&ctx, &session).await.map(Json)
}

pub(crate) async fn withdraw_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<ApplicationId>,
) -> Result<Json<Application>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::withdraw(&ctx, &session, id).await.map(Json)
}

pub(crate) async fn resumes_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Resume>>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::resumes(&ctx, &session).await.map(Json)
}

pub(crate) async fn create_resume_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(form): Json<ResumeForm>,
) -> Result<Json<ResumeView>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::create_resume(&ctx, &session, form)
        .await
        .map(Json)
}

pub(crate) async fn jobseeker_resume(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<ResumeId>,
) -> Result<Json<ResumeView>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::resume(&ctx, &session, id).await.map(Json)
}

pub(crate) async fn update_resume_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<ResumeId>,
    Json(form): Json<ResumeForm>,
) -> Result<Json<Resume>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::update_resume(&ctx, &session, id, form)
        .await
        .map(Json)
}

pub(crate) async fn publish_resume_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<ResumeId>,
) -> Result<Json<Resume>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::set_resume_published(&ctx, &session, id, true)
        .await
        .map(Json)
}

pub(crate) async fn unpublish_resume_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<ResumeId>,
) -> Result<Json<Resume>, ViewError> {
    let (ctx, session) = state.page(&headers);
    jobseeker::set_resume_published(&ctx, &session, id, false)
        .await
        .map(Json)
}

pub(crate) async fn delete_resume_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(id): Path<ResumeId>,
) -> Result<Response, ViewError> {
    let (ctx, session) = state.page(&headers);
    let next = jobseeker::delete_resume(&ctx, &session, id).await?;
    Ok(redirect_body(next))
}

fn redirect_body(location: &'static str) -> Response {
    Json(json!({ "redirect": location })).into_response()
}

fn signed_in(session: &Session, landing: &'static str) -> Response {
    let body = Json(json!({ "redirect": landing, "identity": session.identity() })).into_response();
    match session.token() {
        Some(token) => with_cookie(body, &token_cookie(&token)),
        None => body,
    }
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use job_board::config::BackendConfig;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ready: bool) -> Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            http: reqwest::Client::new(),
            backend: Arc::new(BackendConfig::default()),
        };
        router().layer(Extension(state))
    }

    fn token(role: &str, exp_offset_secs: i64) -> String {
        let claims = json!({
            "userId": 10,
            "userRole": role,
            "exp": Utc::now().timestamp() + exp_offset_secs,
        });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend"))
            .expect("token encodes")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    #[tokio::test]
    async fn health_and_readiness() {
        let response = app(false)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "initializing");
    }

    #[tokio::test]
    async fn anonymous_request_is_sent_to_login() {
        for path in ["/employer/dashboard", "/jobseeker/applications", "/jobseeker/vacancies/4"] {
            let response = app(true)
                .oneshot(Request::get(path).body(Body::empty()).expect("request"))
                .await
                .expect("responds");
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert_eq!(location(&response), Some("/auth/login"));
        }
    }

    #[tokio::test]
    async fn expired_cookie_is_sent_to_login_and_cleared() {
        let cookie = format!("auth_token={}", token("EMPLOYER", -120));
        let response = app(true)
            .oneshot(
                Request::get("/employer/applications?status=PENDING")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/auth/login"));
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn wrong_role_bearer_is_sent_to_login() {
        let response = app(true)
            .oneshot(
                Request::get("/jobseeker/dashboard")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token("EMPLOYER", 600)))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/auth/login"));
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn anonymous_status_filter_is_sent_to_login() {
        let response = app(true)
            .oneshot(
                Request::get("/employer/applications?status=ARCHIVED")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/auth/login"));
    }

    #[tokio::test]
    async fn unknown_status_filter_is_rejected() {
        let response = app(true)
            .oneshot(
                Request::get("/employer/applications?status=ARCHIVED")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token("EMPLOYER", 600)))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["fields"]["status"], "Unknown status 'ARCHIVED'");
    }

    #[tokio::test]
    async fn login_form_is_validated_before_the_backend() {
        let response = app(true)
            .oneshot(
                Request::post("/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"not-an-email","password":""}"#))
                    .expect("request"),
            )
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["fields"]["email"].is_string());
        assert!(body["fields"]["password"].is_string());
    }

    #[tokio::test]
    async fn logout_expires_the_cookie() {
        let response = app(true)
            .oneshot(Request::post("/auth/logout").body(Body::empty()).expect("request"))
            .await
            .expect("responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        assert_eq!(body_json(response).await["redirect"], "/");
    }
}
