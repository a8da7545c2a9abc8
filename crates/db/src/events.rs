use pruner_core::NewUsageEvent;
use rusqlite::params;

use crate::Db;
use crate::error::{DbError, Result};

impl Db {
    pub fn insert_usage_events(
        &mut self,
        project_id: &str,
        events: &[NewUsageEvent],
    ) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO usage_event (
                  project_id, method, route, status_code, ts, latency_ms
                ) VALUES (
                  ?1, ?2, ?3, ?4, ?5, ?6
                )
                "#,
            )?;
            for event in events {
                inserted += stmt.execute(params![
                    project_id,
                    event.method.as_str(),
                    event.route,
                    event.status_code as i64,
                    event.ts,
                    event.latency_ms,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Every route ever stored for the project, in first-seen order.
    pub fn distinct_routes(&self, project_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT route
            FROM usage_event
            WHERE project_id = ?1
            GROUP BY route
            ORDER BY MIN(id) ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![project_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    pub fn count_usage_events(&self, project_id: &str) -> Result<u64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM usage_event WHERE project_id = ?1",
                params![project_id],
                |row| row.get::<_, i64>(0),
            )
            .map(|value| value.max(0) as u64)
            .map_err(DbError::from)
    }

    /// Deletes events strictly older than `cutoff` (canonical timestamp).
    pub fn delete_events_before(&self, project_id: &str, cutoff: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM usage_event WHERE project_id = ?1 AND ts < ?2",
            params![project_id, cutoff],
        )?;
        Ok(deleted)
    }
}
