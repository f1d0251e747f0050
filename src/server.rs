use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::dashboard::{
    self, DashboardData, DashboardError, DashboardMetrics, ReflectionSummary, ReflectionView,
};
use crate::onboarding::{OnboardingAnswers, OnboardingError, OnboardingIngestor};
use crate::traits::StateStore;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StateStore>,
    pub ingestor: Arc<OnboardingIngestor>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Every failure renders as `{"error": "<sentence>"}`.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

const INVALID_BODY: &str = "Invalid request body.";

/// Unwrap a JSON body, turning axum's rejection into the usual error shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            warn!(status = %rejection.status(), error = %rejection.body_text(), "Rejected request body");
            Err(ApiError {
                status: StatusCode::BAD_REQUEST,
                message: INVALID_BODY.to_string(),
            })
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        let status = match &err {
            DashboardError::MissingUserId | DashboardError::Invalid(_) => StatusCode::BAD_REQUEST,
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<OnboardingError> for ApiError {
    fn from(err: OnboardingError) -> Self {
        let status = match &err {
            OnboardingError::MissingUserId => StatusCode::BAD_REQUEST,
            OnboardingError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/users/:user_id/dashboard", get(dashboard_handler))
        .route("/api/users/:user_id/onboarding", post(onboarding_handler))
        .route(
            "/api/users/:user_id/habits/:habit_id/complete",
            post(complete_habit_handler),
        )
        .route(
            "/api/users/:user_id/todos/:todo_id/complete",
            post(complete_todo_handler),
        )
        .route(
            "/api/users/:user_id/tasks/:task_id/complete",
            post(complete_task_handler),
        )
        .route(
            "/api/users/:user_id/reflections",
            get(list_reflections_handler).post(create_reflection_handler),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub data: DashboardData,
    pub metrics: DashboardMetrics,
}

async fn dashboard_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let data = dashboard::load_dashboard(state.store.as_ref(), &user_id).await?;
    let metrics = DashboardMetrics::from_data(&data);
    Ok(Json(DashboardResponse { data, metrics }))
}

async fn onboarding_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<OnboardingAnswers>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let answers = json_body(payload)?;
    let ack = state.ingestor.process(&user_id, &answers).await?;
    Ok((StatusCode::CREATED, Json(ack)))
}

async fn complete_habit_handler(
    State(state): State<AppState>,
    Path((user_id, habit_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let habit = dashboard::complete_habit(state.store.as_ref(), &user_id, &habit_id).await?;
    Ok(Json(habit))
}

async fn complete_todo_handler(
    State(state): State<AppState>,
    Path((user_id, todo_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = dashboard::complete_todo(state.store.as_ref(), &user_id, &todo_id).await?;
    Ok(Json(todo))
}

async fn complete_task_handler(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let done = dashboard::complete_task(state.store.as_ref(), &user_id, &task_id).await?;
    Ok(Json(done))
}

#[derive(Debug, Deserialize)]
pub struct NewReflection {
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReflectionsResponse {
    pub reflections: Vec<ReflectionView>,
    pub summary: ReflectionSummary,
}

async fn list_reflections_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ReflectionsResponse>, ApiError> {
    let (reflections, summary) =
        dashboard::list_reflections(state.store.as_ref(), &user_id).await?;
    Ok(Json(ReflectionsResponse {
        reflections,
        summary,
    }))
}

async fn create_reflection_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<NewReflection>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(payload)?;
    let view = dashboard::create_reflection(
        state.store.as_ref(),
        &user_id,
        &body.content,
        body.mood.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

pub async fn start_server(state: AppState, port: u16, bind_addr: &str) -> anyhow::Result<()> {
    let app = build_router(state);

    let ip: std::net::IpAddr = bind_addr
        .parse()
        .unwrap_or_else(|_| std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
    let addr = std::net::SocketAddr::new(ip, port);
    info!("API server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
