use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::error::Result;
use crate::services::{SharedConfig, SharedPlans, missing_project, open_db};
use crate::util::time::{lookback_start, retention_cutoff};
use pruner_core::{EndpointStatus, StatusCounts, format_ts};
use pruner_db::Db;

/// One project's isolated failure inside a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantFailure {
    pub project_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub projects: usize,
    pub deleted: usize,
    pub failures: Vec<TenantFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub projects: usize,
    pub analyzed: usize,
    pub failures: Vec<TenantFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    pub started_at: String,
    pub finished_at: String,
    pub sweep: SweepReport,
    pub analysis: AnalysisReport,
}

/// Retention sweep and status aggregation.
#[derive(Clone)]
pub struct MaintenanceService {
    config: SharedConfig,
    plans: SharedPlans,
}

impl MaintenanceService {
    pub(super) fn new(config: SharedConfig, plans: SharedPlans) -> Self {
        Self { config, plans }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Deletes the project's events older than its plan's retention.
    pub fn sweep_project(&self, project_id: &str, now: DateTime<Utc>) -> Result<usize> {
        let limits = self
            .plans
            .limits(project_id)?
            .ok_or_else(|| missing_project(project_id))?;
        let cutoff = retention_cutoff(now, limits.retention_days);
        let deleted = self.db()?.delete_events_before(project_id, &cutoff)?;
        if deleted > 0 {
            info!(project_id, deleted, cutoff = %cutoff, "expired usage events removed");
        }
        Ok(deleted)
    }

    pub fn sweep_all(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let projects = self.db()?.list_active_projects()?;
        let mut report = SweepReport {
            projects: projects.len(),
            ..SweepReport::default()
        };
        for project in projects {
            match self.sweep_project(&project.id, now) {
                Ok(deleted) => report.deleted += deleted,
                Err(err) => {
                    error!(project_id = %project.id, error = %err, "retention sweep failed");
                    report.failures.push(TenantFailure {
                        project_id: project.id,
                        message: err.to_string(),
                    });
                }
            }
        }
        info!(
            projects = report.projects,
            deleted = report.deleted,
            failures = report.failures.len(),
            "retention sweep finished"
        );
        Ok(report)
    }

    /// Recomputes and swaps the project's endpoint statuses from the lookback
    /// window. Returns the number of endpoints written.
    pub fn analyze_project(&self, project_id: &str, now: DateTime<Utc>) -> Result<usize> {
        let mut db = self.db()?;
        let since = lookback_start(now);
        let analyzed_at = format_ts(now);
        let statuses: Vec<EndpointStatus> = db
            .endpoint_usage_since(project_id, &since)?
            .into_iter()
            .map(|usage| EndpointStatus::from_usage(usage, &analyzed_at))
            .collect();
        let written = db.replace_endpoint_statuses(project_id, &statuses)?;
        let counts = StatusCounts::from_statuses(&statuses);
        info!(
            project_id,
            analyzed = written,
            dead = counts.dead,
            risky = counts.risky,
            active = counts.active,
            "endpoint statuses refreshed"
        );
        Ok(written)
    }

    pub fn analyze_all(&self, now: DateTime<Utc>) -> Result<AnalysisReport> {
        let projects = self.db()?.list_active_projects()?;
        let mut report = AnalysisReport {
            projects: projects.len(),
            ..AnalysisReport::default()
        };
        for project in projects {
            match self.analyze_project(&project.id, now) {
                Ok(analyzed) => report.analyzed += analyzed,
                Err(err) => {
                    error!(project_id = %project.id, error = %err, "endpoint analysis failed");
                    report.failures.push(TenantFailure {
                        project_id: project.id,
                        message: err.to_string(),
                    });
                }
            }
        }
        info!(
            projects = report.projects,
            analyzed = report.analyzed,
            failures = report.failures.len(),
            "endpoint analysis finished"
        );
        Ok(report)
    }

    /// Sweep then aggregate, across every active project.
    pub fn run_cycle(&self, now: DateTime<Utc>) -> Result<MaintenanceReport> {
        let started_at = format_ts(now);
        info!(started_at = %started_at, "maintenance cycle started");
        let sweep = self.sweep_all(now)?;
        let analysis = self.analyze_all(now)?;
        let finished_at = format_ts(Utc::now().max(now));
        info!(
            deleted = sweep.deleted,
            analyzed = analysis.analyzed,
            failures = sweep.failures.len() + analysis.failures.len(),
            "maintenance cycle finished"
        );
        Ok(MaintenanceReport {
            started_at,
            finished_at,
            sweep,
            analysis,
        })
    }
}
