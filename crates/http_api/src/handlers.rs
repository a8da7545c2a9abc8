use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use tracing::error;

use app_api::{AppContext, ProjectPath, StatusPath, TrackRequest};
use pruner_core::Project;

use crate::{errors::HttpError, state::HttpState};

/// Runs a blocking app call off the async workers.
async fn blocking<T, F>(ctx: AppContext, call: F) -> Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce(&AppContext) -> pruner_app::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || call(&ctx))
        .await
        .map_err(|err| {
            error!(error = %err, "request task failed");
            HttpError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("request task failed: {}", err),
                None,
            )
        })?
        .map_err(HttpError::from)
}

pub async fn health() -> impl IntoResponse {
    Json(app_api::health())
}

pub async fn track(
    State(state): State<HttpState>,
    Extension(project): Extension<Project>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|err| {
        HttpError::new(
            StatusCode::BAD_REQUEST,
            format!("invalid JSON body: {}", err),
            Some("invalid_payload".to_string()),
        )
    })?;
    let req = TrackRequest { payload };
    let response = blocking(state.context, move |ctx| app_api::track(ctx, &project, req)).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

pub async fn endpoints(
    State(state): State<HttpState>,
    Extension(project): Extension<Project>,
    Path(path): Path<ProjectPath>,
) -> Result<impl IntoResponse, HttpError> {
    app_api::ensure_project_access(&project, &path.project_id)?;
    let response = blocking(state.context, move |ctx| {
        app_api::endpoints(ctx, &path.project_id)
    })
    .await?;
    Ok(Json(response))
}

pub async fn endpoints_by_status(
    State(state): State<HttpState>,
    Extension(project): Extension<Project>,
    Path(path): Path<StatusPath>,
) -> Result<impl IntoResponse, HttpError> {
    app_api::ensure_project_access(&project, &path.project_id)?;
    let response = blocking(state.context, move |ctx| {
        app_api::endpoints_by_status(ctx, &path.project_id, &path.status)
    })
    .await?;
    Ok(Json(response))
}

pub async fn endpoints_summary(
    State(state): State<HttpState>,
    Extension(project): Extension<Project>,
    Path(path): Path<ProjectPath>,
) -> Result<impl IntoResponse, HttpError> {
    app_api::ensure_project_access(&project, &path.project_id)?;
    let response = blocking(state.context, move |ctx| {
        app_api::endpoints_summary(ctx, &path.project_id)
    })
    .await?;
    Ok(Json(response))
}

pub async fn analysis(
    State(state): State<HttpState>,
    Extension(project): Extension<Project>,
    Path(path): Path<ProjectPath>,
) -> Result<impl IntoResponse, HttpError> {
    app_api::ensure_project_access(&project, &path.project_id)?;
    let response = blocking(state.context, move |ctx| {
        app_api::analysis(ctx, &path.project_id)
    })
    .await?;
    Ok(Json(response))
}

pub async fn analysis_run_now(
    State(state): State<HttpState>,
    Extension(project): Extension<Project>,
    Path(path): Path<ProjectPath>,
) -> Result<impl IntoResponse, HttpError> {
    app_api::ensure_project_access(&project, &path.project_id)?;
    let response = blocking(state.context, move |ctx| {
        app_api::analysis_run_now(ctx, &path.project_id)
    })
    .await?;
    Ok(Json(response))
}

pub async fn maintenance_run_now(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, HttpError> {
    let report = app_api::maintenance_run_now(&state.context).await?;
    Ok(Json(report))
}

pub async fn not_found() -> HttpError {
    HttpError::not_found()
}
