pub mod app;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::{IngestSettings, MaintenanceSchedule};
pub use error::{ApiError, AppError, Result};
pub use scheduler::{MaintenanceScheduler, next_run_after};
pub use services::{
    AnalysisReport, AnalysisSummary, AnalysisView, AppServices, CreatedProject, DbPlanLookup,
    EndpointList, FilteredEndpoints, MaintenanceReport, PlanLookup, SweepReport, TenantFailure,
};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::time::{lookback_start, retention_cutoff};
