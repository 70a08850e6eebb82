use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::AnalysisError;
use crate::handlers::{is_supported_image, AnalysisSession};
use crate::models::views::RenderModel;
use crate::services::VisionService;

pub const SESSION_HEADER: &str = "x-session-id";
const DEFAULT_SESSION: &str = "default";

type SharedSession = Arc<tokio::sync::Mutex<AnalysisSession>>;

/// Sessions by id; `order` lists ids oldest first for eviction.
#[derive(Default)]
struct SessionStore {
    sessions: HashMap<String, SharedSession>,
    order: VecDeque<String>,
}

pub struct AppState {
    pub vision: Arc<dyn VisionService>,
    max_sessions: usize,
    store: Mutex<SessionStore>,
}

impl AppState {
    pub fn new(vision: Arc<dyn VisionService>, max_sessions: usize) -> Self {
        Self {
            vision,
            max_sessions: max_sessions.max(1),
            store: Mutex::new(SessionStore::default()),
        }
    }

    fn session(&self, id: &str) -> SharedSession {
        let mut store = self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(session) = store.sessions.get(id) {
            return session.clone();
        }

        while store.sessions.len() >= self.max_sessions {
            let Some(oldest) = store.order.pop_front() else {
                break;
            };
            store.sessions.remove(&oldest);
            log::info!("🧹 Session limit {} reached, dropped session {}", self.max_sessions, oldest);
        }

        let session = SharedSession::default();
        store.sessions.insert(id.to_string(), session.clone());
        store.order.push_back(id.to_string());
        session
    }

    fn existing_session(&self, id: &str) -> Option<SharedSession> {
        let store = self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        store.sessions.get(id).cloned()
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub upload_id: String,
    pub cached: bool,
    pub model: String,
    #[serde(flatten)]
    pub outcome: ReportOutcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Complete { views: RenderModel },
    Failed { error: ErrorBody },
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    pub raw_output: Option<String>,
}

impl From<&AnalysisError> for ErrorBody {
    fn from(e: &AnalysisError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
            raw_output: e.raw_output().map(str::to_string),
        }
    }
}

pub fn status_code(e: &AnalysisError) -> StatusCode {
    match e {
        AnalysisError::EmptyResponse
        | AnalysisError::MalformedJson { .. }
        | AnalysisError::ModelNotFound { .. }
        | AnalysisError::TransportError(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::ConnectionFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        AnalysisError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn create_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/result", get(result_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

async fn read_upload(multipart: &mut Multipart) -> Result<(String, Bytes), Response> {
    let bad_request = |e: axum::extract::multipart::MultipartError| {
        log::warn!("⚠️ Invalid multipart upload: {}", e);
        message_response(StatusCode::BAD_REQUEST, format!("invalid upload: {}", e))
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(bad_request)?;
            return Ok((filename, bytes));
        }
    }

    Err(message_response(StatusCode::BAD_REQUEST, "missing 'file' field"))
}

fn report_response(session: &AnalysisSession, cached: bool, model: &str) -> Response {
    let upload_id = session
        .upload_id()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();

    let (status, outcome) = match session.render() {
        None => {
            return message_response(StatusCode::NOT_FOUND, "no analysis result for this session");
        }
        Some(Ok(views)) => (StatusCode::OK, ReportOutcome::Complete { views }),
        Some(Err(e)) => (status_code(e), ReportOutcome::Failed { error: e.into() }),
    };

    let report = AnalysisReport {
        upload_id,
        cached,
        model: model.to_string(),
        outcome,
    };
    (status, Json(report)).into_response()
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let session_id = session_id(&headers);

    let (filename, bytes) = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    if !is_supported_image(&filename) {
        log::warn!("⚠️ Rejected upload '{}' for session {}", filename, session_id);
        return message_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "only jpg, jpeg and png images are supported",
        );
    }

    log::info!("📨 Upload '{}' ({} bytes) for session {}", filename, bytes.len(), session_id);

    let handle = state.session(&session_id);
    let mut session = handle.lock().await;

    let run_analysis = session.register_upload(&filename, bytes.to_vec());
    if run_analysis {
        session.analyze(state.vision.as_ref()).await;
    }

    report_response(&session, !run_analysis, state.vision.model())
}

async fn result_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session_id = session_id(&headers);

    match state.existing_session(&session_id) {
        Some(handle) => {
            let session = handle.lock().await;
            report_response(&session, true, state.vision.model())
        }
        None => message_response(StatusCode::NOT_FOUND, "no image uploaded in this session"),
    }
}

async fn index_page() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health_check() -> &'static str {
    "OK"
}
