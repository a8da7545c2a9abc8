mod support;

use chrono::Duration;
use pruner_core::{EndpointState, HttpMethod, Plan, format_ts};

use support::{
    add_project, days_ago, event, fixed_now, insert_events, insert_raw_event, repeat_event,
    setup_app,
};

#[test]
fn classifies_at_the_call_threshold() {
    let app = setup_app();
    add_project(&app, "p1", Plan::Free);
    let now = fixed_now();
    let ts = days_ago(now, 1);
    insert_events(&app, "p1", &repeat_event(HttpMethod::Get, "/four", &ts, 4));
    insert_events(&app, "p1", &repeat_event(HttpMethod::Get, "/five", &ts, 5));

    let analyzed = app
        .state
        .services
        .maintenance
        .analyze_project("p1", now)
        .expect("analyze");
    assert_eq!(analyzed, 2);

    let list = app.state.services.status.list("p1").expect("list");
    let by_route = |route: &str| {
        list.endpoints
            .iter()
            .find(|endpoint| endpoint.route == route)
            .expect("endpoint")
            .clone()
    };
    assert_eq!(by_route("/four").status, EndpointState::Risky);
    assert_eq!(by_route("/five").status, EndpointState::Active);
    assert_eq!(by_route("/five").last_called_at.as_deref(), Some(ts.as_str()));
    assert_eq!(by_route("/five").analyzed_at, format_ts(now));
}

#[test]
fn groups_by_method_and_route() {
    let app = setup_app();
    add_project(&app, "p1", Plan::Free);
    let now = fixed_now();
    let ts = days_ago(now, 2);
    insert_events(
        &app,
        "p1",
        &[
            event(HttpMethod::Get, "/users", &ts),
            event(HttpMethod::Post, "/users", &ts),
            event(HttpMethod::Get, "/users", &ts),
        ],
    );
    let analyzed = app
        .state
        .services
        .maintenance
        .analyze_project("p1", now)
        .expect("analyze");
    assert_eq!(analyzed, 2);
}

#[test]
fn lookback_window_ignores_older_events() {
    let app = setup_app();
    add_project(&app, "p1", Plan::Pro);
    let now = fixed_now();
    insert_events(&app, "p1", &[event(HttpMethod::Get, "/old", &days_ago(now, 61))]);
    insert_events(&app, "p1", &[event(HttpMethod::Get, "/recent", &days_ago(now, 59))]);

    app.state
        .services
        .maintenance
        .analyze_project("p1", now)
        .expect("analyze");
    let list = app.state.services.status.list("p1").expect("list");
    let routes: Vec<_> = list.endpoints.iter().map(|e| e.route.as_str()).collect();
    assert_eq!(routes, vec!["/recent"]);
}

#[test]
fn repeated_analysis_is_stable() {
    let app = setup_app();
    add_project(&app, "p1", Plan::Free);
    let now = fixed_now();
    insert_events(&app, "p1", &repeat_event(HttpMethod::Get, "/a", &days_ago(now, 3), 7));
    insert_events(&app, "p1", &repeat_event(HttpMethod::Delete, "/b", &days_ago(now, 4), 2));

    let maintenance = &app.state.services.maintenance;
    maintenance.analyze_project("p1", now).expect("first");
    let first = app.state.services.status.list("p1").expect("list").endpoints;
    let later = now + Duration::hours(1);
    maintenance.analyze_project("p1", later).expect("second");
    let second = app.state.services.status.list("p1").expect("list").endpoints;

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.method, b.method);
        assert_eq!(a.route, b.route);
        assert_eq!(a.status, b.status);
        assert_eq!(a.call_count, b.call_count);
        assert_eq!(a.last_called_at, b.last_called_at);
        assert!(b.analyzed_at > a.analyzed_at);
    }
    assert!(second.iter().all(|e| e.analyzed_at == format_ts(later)));
}

#[test]
fn empty_window_clears_previous_statuses() {
    let app = setup_app();
    add_project(&app, "p1", Plan::Pro);
    let now = fixed_now();
    insert_events(&app, "p1", &[event(HttpMethod::Get, "/a", &days_ago(now, 1))]);
    let maintenance = &app.state.services.maintenance;
    maintenance.analyze_project("p1", now).expect("first");
    assert_eq!(app.state.services.status.list("p1").expect("list").counts.total, 1);

    let analyzed = maintenance
        .analyze_project("p1", now + Duration::days(90))
        .expect("second");
    assert_eq!(analyzed, 0);
    assert!(app.state.services.status.list("p1").expect("list").endpoints.is_empty());
}

#[test]
fn sweep_keeps_the_cutoff_instant() {
    let app = setup_app();
    add_project(&app, "p1", Plan::Free);
    let now = fixed_now();
    let cutoff = now - Duration::days(30);
    insert_events(
        &app,
        "p1",
        &[
            event(HttpMethod::Get, "/edge", &format_ts(cutoff)),
            event(HttpMethod::Get, "/old", &format_ts(cutoff - Duration::milliseconds(1))),
            event(HttpMethod::Get, "/new", &days_ago(now, 1)),
        ],
    );

    let deleted = app
        .state
        .services
        .maintenance
        .sweep_project("p1", now)
        .expect("sweep");
    assert_eq!(deleted, 1);
    let db = app.state.open_db().expect("db");
    assert_eq!(db.count_usage_events("p1").expect("count"), 2);
    assert_eq!(
        db.distinct_routes("p1").expect("routes"),
        vec!["/edge".to_string(), "/new".to_string()]
    );
}

#[test]
fn retention_follows_the_current_plan() {
    let app = setup_app();
    add_project(&app, "free", Plan::Free);
    add_project(&app, "pro", Plan::Pro);
    let now = fixed_now();
    let old = days_ago(now, 45);
    insert_events(&app, "free", &[event(HttpMethod::Get, "/a", &old)]);
    insert_events(&app, "pro", &[event(HttpMethod::Get, "/a", &old)]);

    let report = app.state.services.maintenance.sweep_all(now).expect("sweep");
    assert_eq!(report.projects, 2);
    assert_eq!(report.deleted, 1);
    assert!(report.failures.is_empty());

    insert_events(&app, "free", &[event(HttpMethod::Get, "/a", &old)]);
    app.state
        .services
        .projects
        .set_plan("free", Plan::Pro)
        .expect("upgrade");
    let deleted = app
        .state
        .services
        .maintenance
        .sweep_project("free", now)
        .expect("sweep");
    assert_eq!(deleted, 0);
}

#[test]
fn one_failing_project_does_not_stop_the_others() {
    let app = setup_app();
    add_project(&app, "broken", Plan::Free);
    add_project(&app, "healthy", Plan::Free);
    let now = fixed_now();
    insert_raw_event(&app, "broken", "BREW", "/pot", &days_ago(now, 1));
    insert_events(
        &app,
        "healthy",
        &repeat_event(HttpMethod::Get, "/ok", &days_ago(now, 1), 5),
    );

    let report = app
        .state
        .services
        .maintenance
        .analyze_all(now)
        .expect("analysis");
    assert_eq!(report.projects, 2);
    assert_eq!(report.analyzed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].project_id, "broken");

    let healthy = app.state.services.status.list("healthy").expect("list");
    assert_eq!(healthy.counts.active, 1);
    assert!(app.state.services.status.list("broken").expect("list").endpoints.is_empty());

    let single = app.state.services.maintenance.analyze_project("broken", now);
    assert!(single.is_err());
}

#[test]
fn cycle_sweeps_before_aggregating() {
    let app = setup_app();
    add_project(&app, "p1", Plan::Free);
    let now = fixed_now();
    insert_events(&app, "p1", &repeat_event(HttpMethod::Get, "/expired", &days_ago(now, 45), 6));
    insert_events(&app, "p1", &repeat_event(HttpMethod::Get, "/live", &days_ago(now, 1), 2));

    let report = app
        .state
        .services
        .maintenance
        .run_cycle(now)
        .expect("cycle");
    assert_eq!(report.sweep.deleted, 6);
    assert_eq!(report.analysis.analyzed, 1);
    assert_eq!(report.started_at, format_ts(now));
    assert!(report.finished_at >= report.started_at);

    let list = app.state.services.status.list("p1").expect("list");
    assert_eq!(list.endpoints.len(), 1);
    assert_eq!(list.endpoints[0].route, "/live");
    assert_eq!(list.endpoints[0].status, EndpointState::Risky);
}

#[test]
fn inactive_projects_are_skipped() {
    let app = setup_app();
    add_project(&app, "p1", Plan::Free);
    add_project(&app, "p2", Plan::Free);
    let now = fixed_now();
    insert_events(&app, "p2", &[event(HttpMethod::Get, "/a", &days_ago(now, 40))]);
    app.state
        .services
        .projects
        .set_active("p2", false)
        .expect("deactivate");

    let report = app.state.services.maintenance.run_cycle(now).expect("cycle");
    assert_eq!(report.sweep.projects, 1);
    assert_eq!(report.sweep.deleted, 0);
    assert_eq!(report.analysis.projects, 1);
}
