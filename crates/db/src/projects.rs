use chrono::Utc;
use pruner_core::{Plan, PlanLimits, Project};
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{plan_from_str, row_to_project};

impl Db {
    pub fn create_project(
        &self,
        id: &str,
        name: &str,
        plan: Plan,
        api_key_hash: &str,
    ) -> Result<Project> {
        let now = pruner_core::format_ts(Utc::now());
        self.conn.execute(
            r#"
            INSERT INTO project (id, name, plan, api_key_hash, active, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            "#,
            params![id, name, plan.as_str(), api_key_hash, now],
        )?;
        self.get_project(id)?
            .ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, plan, active, created_at
                FROM project
                WHERE id = ?1
                "#,
                params![id],
                row_to_project,
            )
            .optional()
            .map_err(DbError::from)
    }

    /// Resolves an API key hash to its project; inactive projects never match.
    pub fn find_active_project_by_key_hash(&self, api_key_hash: &str) -> Result<Option<Project>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, plan, active, created_at
                FROM project
                WHERE api_key_hash = ?1 AND active = 1
                "#,
                params![api_key_hash],
                row_to_project,
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn list_active_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, plan, active, created_at
            FROM project
            WHERE active = 1
            ORDER BY created_at ASC, id ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], row_to_project)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn set_project_plan(&self, id: &str, plan: Plan) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE project SET plan = ?1 WHERE id = ?2",
            params![plan.as_str(), id],
        )?;
        Ok(updated > 0)
    }

    pub fn set_project_active(&self, id: &str, active: bool) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE project SET active = ?1 WHERE id = ?2",
            params![active as i64, id],
        )?;
        Ok(updated > 0)
    }

    /// Current plan limits for a project, read straight from the table.
    pub fn plan_limits(&self, id: &str) -> Result<Option<PlanLimits>> {
        let plan: Option<String> = self
            .conn
            .query_row(
                "SELECT plan FROM project WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match plan {
            Some(raw) => Ok(Some(plan_from_str(&raw)?.limits())),
            None => Ok(None),
        }
    }
}
