#![allow(dead_code)]

use std::path::PathBuf;

use pruner_core::{HttpMethod, NewUsageEvent, Plan, Project};
use pruner_db::Db;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn setup_project(db: &Db, id: &str, plan: Plan) -> Project {
    db.create_project(id, &format!("{} project", id), plan, &format!("hash-{}", id))
        .expect("create project")
}

pub fn make_event(method: HttpMethod, route: &str, ts: &str) -> NewUsageEvent {
    NewUsageEvent {
        method,
        route: route.to_string(),
        status_code: 200,
        ts: ts.to_string(),
        latency_ms: 12.5,
    }
}

pub fn insert_events(db: &mut Db, project_id: &str, events: Vec<NewUsageEvent>) {
    db.insert_usage_events(project_id, &events)
        .expect("insert events");
}
