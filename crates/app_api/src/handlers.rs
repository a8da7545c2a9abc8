use chrono::Utc;
use tracing::info;

use pruner_app::{
    AnalysisView, AppError, EndpointList, FilteredEndpoints, MaintenanceReport, Result,
};
use pruner_core::Project;

use crate::{
    AnalysisRunResponse, AppContext, HealthResponse, SummaryResponse, TrackRequest, TrackResponse,
};

pub fn health() -> HealthResponse {
    HealthResponse {
        status: "ok",
        service: "codepruner",
    }
}

/// Resolves the presented API key to the calling project.
pub fn authenticate(ctx: &AppContext, api_key: &str) -> Result<Project> {
    ctx.app_state.services.projects.resolve_api_key(api_key)
}

/// Project-scoped routes only serve the caller's own project.
pub fn ensure_project_access(project: &Project, project_id: &str) -> Result<()> {
    if project.id != project_id {
        return Err(AppError::Forbidden(
            "API key does not grant access to this project".to_string(),
        ));
    }
    Ok(())
}

/// Admits the payload and queues it for writing. The response reports what
/// was queued, not what was stored.
pub fn track(ctx: &AppContext, project: &Project, req: TrackRequest) -> Result<TrackResponse> {
    let outcome = ctx
        .app_state
        .services
        .ingest
        .admit(&project.id, &req.payload, Utc::now())?;
    let count = outcome.admitted.len();
    ctx.writer.dispatch(&project.id, outcome.admitted);
    Ok(TrackResponse {
        success: true,
        message: format!("Accepted {} log(s)", count),
        count,
    })
}

pub fn endpoints(ctx: &AppContext, project_id: &str) -> Result<EndpointList> {
    ctx.app_state.services.status.list(project_id)
}

pub fn endpoints_by_status(
    ctx: &AppContext,
    project_id: &str,
    status: &str,
) -> Result<FilteredEndpoints> {
    ctx.app_state.services.status.by_status(project_id, status)
}

pub fn endpoints_summary(ctx: &AppContext, project_id: &str) -> Result<SummaryResponse> {
    let summary = ctx.app_state.services.status.summary(project_id)?;
    Ok(SummaryResponse {
        project_id: project_id.to_string(),
        summary,
    })
}

pub fn analysis(ctx: &AppContext, project_id: &str) -> Result<AnalysisView> {
    ctx.app_state.services.status.analysis_view(project_id)
}

/// Synchronous single-project aggregation. Unlike batch runs, failure is
/// returned to the caller.
pub fn analysis_run_now(ctx: &AppContext, project_id: &str) -> Result<AnalysisRunResponse> {
    let analyzed = ctx
        .app_state
        .services
        .maintenance
        .analyze_project(project_id, Utc::now())?;
    info!(project_id, analyzed, "manual analysis complete");
    Ok(AnalysisRunResponse {
        success: true,
        message: "Analysis complete".to_string(),
        analyzed,
    })
}

pub async fn maintenance_run_now(ctx: &AppContext) -> Result<MaintenanceReport> {
    ctx.scheduler.run_now().await
}
