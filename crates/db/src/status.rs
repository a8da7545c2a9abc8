use pruner_core::{EndpointState, EndpointStatus, EndpointUsage};
use rusqlite::params;

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{method_at, row_to_endpoint_status};

const STATUS_COLUMNS: &str =
    "SELECT method, route, status, call_count, last_called_at, analyzed_at FROM endpoint_status";

impl Db {
    /// Groups the project's events at or after `since` by (method, route).
    pub fn endpoint_usage_since(
        &self,
        project_id: &str,
        since: &str,
    ) -> Result<Vec<EndpointUsage>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT method, route, COUNT(*) AS call_count, MAX(ts) AS last_called_at
            FROM usage_event
            WHERE project_id = ?1 AND ts >= ?2
            GROUP BY method, route
            ORDER BY call_count DESC, method ASC, route ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![project_id, since], |row| {
                Ok(EndpointUsage {
                    method: method_at(row, 0)?,
                    route: row.get(1)?,
                    call_count: row.get::<_, i64>(2)?.max(0) as u64,
                    last_called_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Swaps the project's whole status set in one transaction.
    pub fn replace_endpoint_statuses(
        &mut self,
        project_id: &str,
        statuses: &[EndpointStatus],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM endpoint_status WHERE project_id = ?1",
            params![project_id],
        )?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO endpoint_status (
                  project_id, method, route, status, call_count, last_called_at, analyzed_at
                ) VALUES (
                  ?1, ?2, ?3, ?4, ?5, ?6, ?7
                )
                "#,
            )?;
            for status in statuses {
                inserted += stmt.execute(params![
                    project_id,
                    status.method.as_str(),
                    status.route,
                    status.status.as_str(),
                    status.call_count as i64,
                    status.last_called_at,
                    status.analyzed_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Without a filter: dead, risky, active, then call count descending.
    /// With a filter: call count descending only.
    pub fn list_endpoint_statuses(
        &self,
        project_id: &str,
        filter: Option<EndpointState>,
    ) -> Result<Vec<EndpointStatus>> {
        let rows = match filter {
            Some(state) => {
                let sql = format!(
                    "{} WHERE project_id = ?1 AND status = ?2 \
                     ORDER BY call_count DESC, method ASC, route ASC",
                    STATUS_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![project_id, state.as_str()], row_to_endpoint_status)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let sql = format!(
                    "{} WHERE project_id = ?1 \
                     ORDER BY CASE status WHEN 'dead' THEN 0 WHEN 'risky' THEN 1 ELSE 2 END ASC, \
                     call_count DESC, method ASC, route ASC",
                    STATUS_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![project_id], row_to_endpoint_status)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    pub fn count_endpoint_statuses(&self, project_id: &str) -> Result<u64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM endpoint_status WHERE project_id = ?1",
                params![project_id],
                |row| row.get::<_, i64>(0),
            )
            .map(|value| value.max(0) as u64)
            .map_err(DbError::from)
    }
}
