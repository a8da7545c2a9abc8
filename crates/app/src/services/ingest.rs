use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::services::{SharedConfig, SharedPlans, missing_project, open_db};
use ingest::AdmissionOutcome;

#[derive(Clone)]
pub struct IngestService {
    config: SharedConfig,
    plans: SharedPlans,
}

impl IngestService {
    pub(super) fn new(config: SharedConfig, plans: SharedPlans) -> Self {
        Self { config, plans }
    }

    /// Validates a tracking payload and applies the plan's route limit.
    /// Returns the events cleared for persistence; writing them is the
    /// caller's job.
    pub fn admit(
        &self,
        project_id: &str,
        payload: &Value,
        now: DateTime<Utc>,
    ) -> Result<AdmissionOutcome> {
        let events = ingest::parse_tracking_payload(payload, now)?;
        let limits = self
            .plans
            .limits(project_id)?
            .ok_or_else(|| missing_project(project_id))?;

        let existing = match limits.max_distinct_routes {
            Some(_) => open_db(&self.config)?.distinct_routes(project_id)?,
            None => Vec::new(),
        };
        let outcome = ingest::apply_route_limit(events, &existing, &limits);

        if outcome.dropped_events > 0 {
            warn!(
                project_id,
                dropped_events = outcome.dropped_events,
                dropped_routes = ?outcome.dropped_routes,
                existing_routes = existing.len(),
                max_routes = ?limits.max_distinct_routes,
                "route limit reached, dropping events for new routes"
            );
        }
        debug!(project_id, admitted = outcome.admitted.len(), "payload admitted");
        Ok(outcome)
    }
}
