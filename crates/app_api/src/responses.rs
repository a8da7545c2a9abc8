use serde::Serialize;

use pruner_core::StatusSummary;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Serialize)]
pub struct TrackResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub project_id: String,
    #[serde(flatten)]
    pub summary: StatusSummary,
}

#[derive(Serialize)]
pub struct AnalysisRunResponse {
    pub success: bool,
    pub message: String,
    pub analyzed: usize,
}
