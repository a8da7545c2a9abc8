#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use pruner_app::{AppPaths, AppState, ensure_app_data_dir};
use pruner_core::{HttpMethod, NewUsageEvent, Plan, Project, format_ts};
use tempfile::TempDir;

pub struct TestApp {
    pub _dir: TempDir,
    pub state: AppState,
}

pub fn setup_app() -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let paths = AppPaths::new(dir.path().to_path_buf());
    ensure_app_data_dir(&paths).expect("data dir");
    let state = AppState::new(paths.db_path);
    state.setup_db().expect("setup db");
    TestApp { _dir: dir, state }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 2, 0, 0).unwrap()
}

pub fn days_ago(now: DateTime<Utc>, days: i64) -> String {
    format_ts(now - Duration::days(days))
}

pub fn add_project(app: &TestApp, id: &str, plan: Plan) -> Project {
    app.state
        .open_db()
        .expect("open db")
        .create_project(id, &format!("{} project", id), plan, &format!("hash-{}", id))
        .expect("create project")
}

pub fn event(method: HttpMethod, route: &str, ts: &str) -> NewUsageEvent {
    NewUsageEvent {
        method,
        route: route.to_string(),
        status_code: 200,
        ts: ts.to_string(),
        latency_ms: 3.0,
    }
}

pub fn repeat_event(method: HttpMethod, route: &str, ts: &str, count: usize) -> Vec<NewUsageEvent> {
    (0..count).map(|_| event(method, route, ts)).collect()
}

pub fn insert_events(app: &TestApp, project_id: &str, events: &[NewUsageEvent]) {
    app.state
        .open_db()
        .expect("open db")
        .insert_usage_events(project_id, events)
        .expect("insert events");
}

/// Writes a row that bypasses validation, for exercising failure paths.
pub fn insert_raw_event(app: &TestApp, project_id: &str, method: &str, route: &str, ts: &str) {
    let conn = rusqlite::Connection::open(&app.state.config.db_path).expect("raw connection");
    conn.execute(
        "INSERT INTO usage_event (project_id, method, route, status_code, ts, latency_ms) \
         VALUES (?1, ?2, ?3, 200, ?4, 0)",
        rusqlite::params![project_id, method, route, ts],
    )
    .expect("raw insert");
}
