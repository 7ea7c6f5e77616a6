use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::dates::DateField;
use crate::persistence::{GroupPlanStore, PersistenceError};
use crate::plan::{PlanError, PlanRequest, RolloutEngine, RolloutPlan};
use crate::progress::{VarianceResult, compare_windows, topic_windows_from_value};

#[derive(Clone)]
pub struct AppState {
    engine: Arc<RolloutEngine>,
    store: Arc<dyn GroupPlanStore>,
}

impl AppState {
    pub fn new(engine: RolloutEngine, store: impl GroupPlanStore + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
            store: Arc::new(store),
        }
    }

    pub fn with_shared(engine: Arc<RolloutEngine>, store: Arc<dyn GroupPlanStore>) -> Self {
        Self { engine, store }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionPayload {
    topic_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProgressQuery {
    today: Option<String>,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PlanError> for ApiError {
    fn from(value: PlanError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plans", post(preview_plan))
        .route("/groups/:id/plan", get(get_group_plan).put(put_group_plan))
        .route("/groups/:id/completions", post(record_completions))
        .route("/groups/:id/progress", get(group_progress))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "rollout API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn plan_from_request(engine: &RolloutEngine, request: &PlanRequest) -> Result<RolloutPlan, ApiError> {
    Ok(engine.generate_plan(&request.group_label, request.learner_count, &request.start_date)?)
}

async fn preview_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<RolloutPlan>, ApiError> {
    let plan = plan_from_request(&state.engine, &request)?;
    Ok(Json(plan))
}

async fn put_group_plan(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<RolloutPlan>, ApiError> {
    let plan = plan_from_request(&state.engine, &request)?;
    state.store.save_plan(&group_id, &plan)?;
    Ok(Json(plan))
}

async fn get_group_plan(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<RolloutPlan>, ApiError> {
    match state.store.load_plan(&group_id)? {
        Some(plan) => Ok(Json(plan)),
        None => Err(ApiError::not_found(format!("no plan stored for group {group_id}"))),
    }
}

async fn record_completions(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(payload): Json<CompletionPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.mark_completed(&group_id, &payload.topic_ids)?;
    let completed = state.store.completed_topics(&group_id)?;
    Ok(Json(json!({ "groupId": group_id, "completed": completed })))
}

async fn group_progress(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<VarianceResult>, ApiError> {
    let today = match DateField::parse(query.today.as_deref()) {
        DateField::Valid(date) => date,
        DateField::Missing => chrono::Local::now().date_naive(),
        DateField::Unparseable(raw) => {
            return Err(ApiError::invalid(format!("today '{raw}' is not a DD/MM/YYYY date")));
        }
    };
    let Some(plan) = state.store.plan_value(&group_id)? else {
        return Err(ApiError::not_found(format!("no plan stored for group {group_id}")));
    };
    let completed = state.store.completed_topics(&group_id)?;
    let windows = topic_windows_from_value(&plan);
    Ok(Json(compare_windows(&windows, &completed, today)))
}
