use pruner_core::{EndpointState, EndpointStatus, HttpMethod, Plan, Project};
use rusqlite::Row;
use rusqlite::types::Type;

use crate::error::DbError;

fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

pub(crate) fn method_at(row: &Row<'_>, index: usize) -> Result<HttpMethod, rusqlite::Error> {
    let raw: String = row.get(index)?;
    raw.parse::<HttpMethod>()
        .map_err(|err| conversion_error(index, err))
}

fn state_at(row: &Row<'_>, index: usize) -> Result<EndpointState, rusqlite::Error> {
    let raw: String = row.get(index)?;
    raw.parse::<EndpointState>()
        .map_err(|err| conversion_error(index, err))
}

pub(crate) fn plan_from_str(raw: &str) -> Result<Plan, DbError> {
    Plan::parse(raw).ok_or_else(|| DbError::InvalidData(format!("unknown plan '{}'", raw)))
}

fn plan_at(row: &Row<'_>, index: usize) -> Result<Plan, rusqlite::Error> {
    let raw: String = row.get(index)?;
    plan_from_str(&raw).map_err(|err| conversion_error(index, err))
}

pub(crate) fn row_to_project(row: &Row<'_>) -> Result<Project, rusqlite::Error> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        plan: plan_at(row, 2)?,
        active: row.get::<_, i64>(3)? != 0,
        created_at: row.get(4)?,
    })
}

pub(crate) fn row_to_endpoint_status(row: &Row<'_>) -> Result<EndpointStatus, rusqlite::Error> {
    Ok(EndpointStatus {
        method: method_at(row, 0)?,
        route: row.get(1)?,
        status: state_at(row, 2)?,
        call_count: row.get::<_, i64>(3)?.max(0) as u64,
        last_called_at: row.get(4)?,
        analyzed_at: row.get(5)?,
    })
}
