//! Stub job board backend bound to an ephemeral port. It answers from a table
//! of canned responses and records every request it receives.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use job_board::config::BackendConfig;
use job_board::session::{MemoryTokenStore, Session, TokenStore};
use job_board::views::PageContext;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct StubState {
    routes: HashMap<(String, String), (u16, Value)>,
    requests: Vec<Recorded>,
}

pub struct StubBackend {
    pub base_url: String,
    state: Arc<Mutex<StubState>>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(StubState::default()));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("stub binds");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub serves");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.state
            .lock()
            .expect("stub mutex poisoned")
            .routes
            .insert((method.to_string(), path.to_string()), (status, body));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state
            .lock()
            .expect("stub mutex poisoned")
            .requests
            .clone()
    }

    /// `"METHOD /path"` for every request, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }

    pub fn last(&self, method: &str, path: &str) -> Option<Recorded> {
        self.requests()
            .into_iter()
            .rev()
            .find(|request| request.method == method && request.path == path)
    }

    pub fn backend(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            ..BackendConfig::default()
        }
    }

    pub fn context(&self, session: &Session) -> PageContext {
        PageContext::for_session(reqwest::Client::new(), &self.backend(), session)
    }
}

async fn handle(
    State(state): State<Arc<Mutex<StubState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.lock().expect("stub mutex poisoned");
    state.requests.push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    });

    match state.routes.get(&(method.to_string(), uri.path().to_string())) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).expect("valid stub status"),
            Json(body.clone()),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("no stub for {method} {}", uri.path()) })),
        )
            .into_response(),
    }
}

pub fn token(user_id: i64, role: &str, exp_offset_secs: i64) -> String {
    let claims = json!({
        "sub": format!("user-{user_id}"),
        "userId": user_id,
        "userRole": role,
        "exp": Utc::now().timestamp() + exp_offset_secs,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"signed-by-the-backend"),
    )
    .expect("token encodes")
}

pub fn session(user_id: i64, role: &str) -> (Session, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::with_token(token(user_id, role, 3600)));
    let session = Session::restore(Arc::clone(&store) as Arc<dyn TokenStore>);
    (session, store)
}

pub fn employer_session() -> (Session, Arc<MemoryTokenStore>) {
    session(10, "EMPLOYER")
}

pub fn candidate_session() -> (Session, Arc<MemoryTokenStore>) {
    session(20, "JOB_SEEKER")
}

pub fn vacancy(id: i64, employer_id: i64, published: bool) -> Value {
    json!({
        "id": id,
        "title": format!("Vacancy {id}"),
        "description": "Async Rust services",
        "salary": 180000.0,
        "companyId": 1,
        "companyName": "Ferris Labs",
        "employerId": employer_id,
        "isPublished": published,
    })
}

pub fn application(id: i64, vacancy_id: i64, candidate_id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "vacancyId": vacancy_id,
        "candidateId": candidate_id,
        "resumeId": 100 + id,
        "employerId": 10,
        "statusName": status,
        "createdAt": "2025-03-01T09:30:00",
    })
}

pub fn resume(id: i64, user_id: i64) -> Value {
    json!({
        "id": id,
        "userId": user_id,
        "title": format!("Resume {id}"),
        "summary": "Backend developer",
        "experienceYears": 4,
        "isPublished": true,
    })
}

pub fn page(content: Vec<Value>) -> Value {
    let total = content.len();
    json!({
        "content": content,
        "totalPages": 1,
        "totalElements": total,
        "number": 0,
        "size": 10,
    })
}
