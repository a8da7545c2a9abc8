use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, missing_project, open_db};
use pruner_core::{Plan, Project};
use pruner_db::Db;

const API_KEY_PREFIX: &str = "cp_";
const PROJECT_ID_PREFIX: &str = "prj_";

/// A freshly created project. The plaintext key is only available here.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedProject {
    pub project: Project,
    pub api_key: String,
}

#[derive(Clone)]
pub struct ProjectsService {
    config: SharedConfig,
}

impl ProjectsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn create(&self, name: &str, plan: Plan) -> Result<CreatedProject> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput(
                "project name must not be empty".to_string(),
            ));
        }
        let db = self.db()?;
        let id = format!("{}{}", PROJECT_ID_PREFIX, random_hex(8));
        let api_key = generate_api_key();
        let project = db.create_project(&id, name, plan, &hash_api_key(&api_key))?;
        info!(project_id = %project.id, plan = %plan, "project created");
        Ok(CreatedProject { project, api_key })
    }

    pub fn get(&self, project_id: &str) -> Result<Project> {
        self.db()?
            .get_project(project_id)?
            .ok_or_else(|| missing_project(project_id))
    }

    pub fn list_active(&self) -> Result<Vec<Project>> {
        Ok(self.db()?.list_active_projects()?)
    }

    /// Maps a presented API key to its active project.
    pub fn resolve_api_key(&self, api_key: &str) -> Result<Project> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AppError::Unauthorized("missing API key".to_string()));
        }
        self.db()?
            .find_active_project_by_key_hash(&hash_api_key(api_key))?
            .ok_or_else(|| AppError::Unauthorized("invalid API key".to_string()))
    }

    pub fn set_plan(&self, project_id: &str, plan: Plan) -> Result<Project> {
        let db = self.db()?;
        if !db.set_project_plan(project_id, plan)? {
            return Err(missing_project(project_id));
        }
        info!(project_id, plan = %plan, "project plan changed");
        db.get_project(project_id)?
            .ok_or_else(|| missing_project(project_id))
    }

    pub fn set_active(&self, project_id: &str, active: bool) -> Result<()> {
        if !self.db()?.set_project_active(project_id, active)? {
            return Err(missing_project(project_id));
        }
        info!(project_id, active, "project activation changed");
        Ok(())
    }
}

pub fn generate_api_key() -> String {
    format!("{}{}", API_KEY_PREFIX, random_hex(32))
}

/// SHA-256 of the key, hex encoded. Only this form is stored.
pub fn hash_api_key(api_key: &str) -> String {
    format!("{:x}", Sha256::digest(api_key.as_bytes()))
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}
