use serde::Serialize;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};
use pruner_core::{EndpointState, EndpointStatus, StatusCounts, StatusSummary};
use pruner_db::Db;

#[derive(Debug, Clone, Serialize)]
pub struct EndpointList {
    pub project_id: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub endpoints: Vec<EndpointStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilteredEndpoints {
    pub project_id: String,
    pub status: EndpointState,
    pub count: usize,
    pub endpoints: Vec<EndpointStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub last_analyzed_at: Option<String>,
}

/// Older combined view: counts plus endpoints, busiest first.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    pub project_id: String,
    pub summary: AnalysisSummary,
    pub endpoints: Vec<EndpointStatus>,
}

#[derive(Clone)]
pub struct StatusService {
    config: SharedConfig,
}

impl StatusService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn list(&self, project_id: &str) -> Result<EndpointList> {
        let endpoints = self.db()?.list_endpoint_statuses(project_id, None)?;
        Ok(EndpointList {
            project_id: project_id.to_string(),
            counts: StatusCounts::from_statuses(&endpoints),
            endpoints,
        })
    }

    pub fn by_status(&self, project_id: &str, status: &str) -> Result<FilteredEndpoints> {
        let state = EndpointState::parse(status).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "invalid status '{}', expected one of dead, risky, active",
                status
            ))
        })?;
        let endpoints = self.db()?.list_endpoint_statuses(project_id, Some(state))?;
        Ok(FilteredEndpoints {
            project_id: project_id.to_string(),
            status: state,
            count: endpoints.len(),
            endpoints,
        })
    }

    pub fn summary(&self, project_id: &str) -> Result<StatusSummary> {
        let endpoints = self.db()?.list_endpoint_statuses(project_id, None)?;
        Ok(StatusSummary::from_statuses(&endpoints))
    }

    pub fn analysis_view(&self, project_id: &str) -> Result<AnalysisView> {
        let mut endpoints = self.db()?.list_endpoint_statuses(project_id, None)?;
        endpoints.sort_by(|a, b| b.call_count.cmp(&a.call_count));
        let last_analyzed_at = endpoints
            .iter()
            .map(|endpoint| endpoint.analyzed_at.clone())
            .max();
        Ok(AnalysisView {
            project_id: project_id.to_string(),
            summary: AnalysisSummary {
                counts: StatusCounts::from_statuses(&endpoints),
                last_analyzed_at,
            },
            endpoints,
        })
    }
}
