mod ingest;
mod maintenance;
mod plans;
mod projects;
mod status;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::{AppError, Result};
use pruner_db::Db;

pub use ingest::IngestService;
pub use maintenance::{
    AnalysisReport, MaintenanceReport, MaintenanceService, SweepReport, TenantFailure,
};
pub use plans::{DbPlanLookup, PlanLookup};
pub use projects::{CreatedProject, ProjectsService, generate_api_key, hash_api_key};
pub use status::{AnalysisSummary, AnalysisView, EndpointList, FilteredEndpoints, StatusService};

type SharedConfig = Arc<AppConfig>;
type SharedPlans = Arc<dyn PlanLookup>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub ingest: IngestService,
    pub maintenance: MaintenanceService,
    pub projects: ProjectsService,
    pub status: StatusService,
}

impl AppServices {
    pub fn new(config: &AppConfig, plans: SharedPlans) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            ingest: IngestService::new(shared.clone(), plans.clone()),
            maintenance: MaintenanceService::new(shared.clone(), plans),
            projects: ProjectsService::new(shared.clone()),
            status: StatusService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}

fn missing_project(project_id: &str) -> AppError {
    AppError::NotFound(format!("project {} not found", project_id))
}
