use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::services::{AppServices, DbPlanLookup, PlanLookup};
use pruner_db::Db;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
}

/// Application state shared by the HTTP server, the scheduler and the CLI.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        let plans = Arc::new(DbPlanLookup::new(db_path.clone()));
        Self::with_plan_lookup(db_path, plans)
    }

    /// Builds the state around an external plan collaborator.
    pub fn with_plan_lookup(db_path: PathBuf, plans: Arc<dyn PlanLookup>) -> Self {
        let config = AppConfig { db_path };
        let services = AppServices::new(&config, plans);
        Self { config, services }
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
