use std::path::PathBuf;

use crate::error::Result;
use pruner_core::PlanLimits;
use pruner_db::Db;

/// Source of a project's current plan limits. Consulted on every admission
/// and every sweep, so plan changes apply on the next call.
pub trait PlanLookup: Send + Sync + 'static {
    /// `None` when the project is unknown.
    fn limits(&self, project_id: &str) -> Result<Option<PlanLimits>>;
}

/// Reads limits from the `project` table.
#[derive(Clone, Debug)]
pub struct DbPlanLookup {
    db_path: PathBuf,
}

impl DbPlanLookup {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

impl PlanLookup for DbPlanLookup {
    fn limits(&self, project_id: &str) -> Result<Option<PlanLimits>> {
        let db = Db::open(&self.db_path)?;
        Ok(db.plan_limits(project_id)?)
    }
}
