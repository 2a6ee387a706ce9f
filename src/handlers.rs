use axum::extract::State;
use axum::http::header;
use axum::response::Html;
use axum::Json;
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::events::{apply_event, AnalyticsEvent};
use crate::models::{
    AnalyticsResponse, ProjectRecord, ProjectsResponse, SaveProjectsRequest, SaveProjectsResponse,
    TrackRequest, TrackResponse,
};
use crate::state::AppState;
use crate::store::{FileStore, PROJECTS_KEY, ANALYTICS_KEY};
use crate::ui::render_index;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let projects = state.projects.lock().await;
    let analytics = state.analytics.lock().await;

    // The public page renders whatever elements parse as records and skips
    // the rest; the endpoints never enforced a per-record schema.
    let records: Vec<ProjectRecord> = projects
        .iter()
        .filter_map(|value| serde_json::from_value(value.clone()).ok())
        .collect();

    Html(render_index(&records, &analytics))
}

pub async fn get_projects(State(state): State<AppState>) -> Json<ProjectsResponse> {
    let projects = state.projects.lock().await;
    Json(ProjectsResponse {
        success: true,
        projects: projects.clone(),
    })
}

/// Raw persisted project array, the static-fallback read path the public
/// site uses when the API is unreachable.
pub async fn projects_json(
    State(state): State<AppState>,
) -> ([(header::HeaderName, &'static str); 1], String) {
    let projects = state.projects.lock().await;
    let body = serde_json::to_string_pretty(&*projects).unwrap_or_else(|_| "[]".to_string());
    ([(header::CONTENT_TYPE, "application/json")], body)
}

pub async fn save_projects(
    State(state): State<AppState>,
    Json(payload): Json<SaveProjectsRequest>,
) -> Result<Json<SaveProjectsResponse>, AppError> {
    let incoming = validate_save(&state, &payload)?;

    let mut projects = state.projects.lock().await;
    let receipt = state.store.put_json(PROJECTS_KEY, &incoming).await?;
    let count = incoming.len();
    *projects = incoming;

    info!("projects saved, count={count}");

    Ok(Json(SaveProjectsResponse {
        success: true,
        message: "Projects saved".to_string(),
        count,
        url: receipt.url,
        timestamp: None,
    }))
}

/// Compatibility route for the file deployment target: identical contract,
/// but the write always goes through the backup-taking file path and the
/// response carries a timestamp instead of a URL.
pub async fn update_projects_compat(
    State(state): State<AppState>,
    Json(payload): Json<SaveProjectsRequest>,
) -> Result<Json<SaveProjectsResponse>, AppError> {
    if payload.projects.is_none() || payload.password.is_none() {
        return Err(AppError::bad_request("Missing projects or password"));
    }
    let incoming = validate_save(&state, &payload)?;

    let file_store = FileStore::new(&state.config.data_dir);
    let mut projects = state.projects.lock().await;
    let payload_bytes = serde_json::to_vec_pretty(&incoming).map_err(crate::store::StoreError::from)?;
    file_store.put(PROJECTS_KEY, &payload_bytes).await?;
    let count = incoming.len();
    *projects = incoming;

    Ok(Json(SaveProjectsResponse {
        success: true,
        message: "Projects updated successfully".to_string(),
        count,
        url: None,
        timestamp: Some(Utc::now().to_rfc3339()),
    }))
}

fn validate_save(state: &AppState, payload: &SaveProjectsRequest) -> Result<Vec<Value>, AppError> {
    if payload.password.as_deref() != Some(state.config.dashboard_password.as_str()) {
        return Err(AppError::Unauthorized);
    }

    match &payload.projects {
        Some(Value::Array(items)) => Ok(items.clone()),
        _ => Err(AppError::bad_request("projects must be an array")),
    }
}

pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    let analytics = state.analytics.lock().await;
    Json(AnalyticsResponse {
        success: true,
        analytics: analytics.clone(),
    })
}

/// Unauthenticated by design: this is public telemetry, open to anyone who
/// can reach the endpoint.
pub async fn track(
    State(state): State<AppState>,
    Json(payload): Json<TrackRequest>,
) -> Result<Json<TrackResponse>, AppError> {
    let name = payload
        .event
        .as_deref()
        .ok_or_else(|| AppError::bad_request("Event required"))?;
    let event = AnalyticsEvent::parse(name, &payload.data).map_err(AppError::Validation)?;

    let mut analytics = state.analytics.lock().await;
    apply_event(&mut analytics, &event);
    state.store.put_json(ANALYTICS_KEY, &*analytics).await?;

    Ok(Json(TrackResponse {
        success: true,
        message: "Analytics updated".to_string(),
    }))
}
