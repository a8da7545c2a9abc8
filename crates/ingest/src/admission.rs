use std::collections::HashSet;

use pruner_core::{NewUsageEvent, PlanLimits};

use crate::types::AdmissionOutcome;

/// Enforces the plan's distinct-route ceiling on an incoming batch.
///
/// Events for routes the project already tracks always pass. New routes are
/// admitted in first-appearance order until the remaining slots run out;
/// every event for a rejected route is dropped.
pub fn apply_route_limit(
    events: Vec<NewUsageEvent>,
    existing_routes: &[String],
    limits: &PlanLimits,
) -> AdmissionOutcome {
    let Some(max_routes) = limits.max_distinct_routes else {
        return AdmissionOutcome {
            admitted: events,
            ..AdmissionOutcome::default()
        };
    };

    let existing: HashSet<&str> = existing_routes.iter().map(String::as_str).collect();
    let mut slots = max_routes.saturating_sub(existing.len());
    let mut accepted_new: HashSet<String> = HashSet::new();
    let mut rejected: Vec<String> = Vec::new();

    let mut outcome = AdmissionOutcome::default();
    for event in events {
        let route = event.route.as_str();
        if existing.contains(route) || accepted_new.contains(route) {
            outcome.admitted.push(event);
            continue;
        }
        let already_rejected = rejected.iter().any(|r| r == route);
        if !already_rejected && slots > 0 {
            slots -= 1;
            accepted_new.insert(route.to_string());
            outcome.admitted.push(event);
            continue;
        }
        if !already_rejected {
            rejected.push(route.to_string());
        }
        outcome.dropped_events += 1;
    }
    outcome.dropped_routes = rejected;
    outcome
}
