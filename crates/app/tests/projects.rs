mod support;

use pruner_app::AppError;
use pruner_core::Plan;

use support::setup_app;

#[test]
fn created_keys_resolve_to_their_project() {
    let app = setup_app();
    let projects = &app.state.services.projects;
    let created = projects.create("Checkout API", Plan::Free).expect("create");
    assert!(created.project.id.starts_with("prj_"));
    assert!(created.api_key.starts_with("cp_"));
    assert_eq!(created.project.plan, Plan::Free);

    let resolved = projects.resolve_api_key(&created.api_key).expect("resolve");
    assert_eq!(resolved.id, created.project.id);

    let err = projects.resolve_api_key("cp_nope").expect_err("unknown key");
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[test]
fn deactivated_projects_cannot_authenticate() {
    let app = setup_app();
    let projects = &app.state.services.projects;
    let created = projects.create("Legacy", Plan::Pro).expect("create");
    projects
        .set_active(&created.project.id, false)
        .expect("deactivate");
    assert!(matches!(
        projects.resolve_api_key(&created.api_key),
        Err(AppError::Unauthorized(_))
    ));
    assert!(projects.list_active().expect("list").is_empty());
}

#[test]
fn rejects_blank_names_and_unknown_ids() {
    let app = setup_app();
    let projects = &app.state.services.projects;
    assert!(matches!(
        projects.create("   ", Plan::Free),
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        projects.set_plan("prj_missing", Plan::Pro),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(projects.get("prj_missing"), Err(AppError::NotFound(_))));
}
