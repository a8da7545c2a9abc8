use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Events with fewer calls than this inside the lookback window are risky.
pub const ACTIVE_CALL_THRESHOLD: u64 = 5;
/// Days of history the aggregator scans, independent of plan retention.
pub const LOOKBACK_DAYS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is not trimmed.
    pub fn parse(value: &str) -> Option<Self> {
        let upper = value.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == upper)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownValue(value.to_string()))
    }
}

/// Lifecycle state of an endpoint. Declaration order is the list order of
/// the default status view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointState {
    Dead,
    Risky,
    Active,
}

impl EndpointState {
    pub const ALL: [EndpointState; 3] = [
        EndpointState::Dead,
        EndpointState::Risky,
        EndpointState::Active,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointState::Dead => "dead",
            EndpointState::Risky => "risky",
            EndpointState::Active => "active",
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            EndpointState::Dead => 0,
            EndpointState::Risky => 1,
            EndpointState::Active => 2,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let lower = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|state| state.as_str() == lower)
    }
}

impl fmt::Display for EndpointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointState {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownValue(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue(pub String);

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownValue {}

pub fn classify(call_count: u64) -> EndpointState {
    if call_count == 0 {
        EndpointState::Dead
    } else if call_count < ACTIVE_CALL_THRESHOLD {
        EndpointState::Risky
    } else {
        EndpointState::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Plan::Free),
            "pro" => Some(Plan::Pro),
            _ => None,
        }
    }

    pub fn limits(&self) -> PlanLimits {
        match self {
            Plan::Free => PlanLimits {
                retention_days: 30,
                max_distinct_routes: Some(50),
            },
            Plan::Pro => PlanLimits {
                retention_days: 90,
                max_distinct_routes: None,
            },
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plan parameters the pipeline depends on. `None` routes means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub retention_days: i64,
    pub max_distinct_routes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub plan: Plan,
    pub active: bool,
    pub created_at: String,
}

/// An admitted event waiting to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUsageEvent {
    pub method: HttpMethod,
    pub route: String,
    pub status_code: u16,
    pub ts: String,
    pub latency_ms: f64,
}

/// Per (method, route) result of scanning the lookback window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointUsage {
    pub method: HttpMethod,
    pub route: String,
    pub call_count: u64,
    pub last_called_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStatus {
    pub method: HttpMethod,
    pub route: String,
    pub status: EndpointState,
    pub call_count: u64,
    pub last_called_at: Option<String>,
    pub analyzed_at: String,
}

impl EndpointStatus {
    pub fn from_usage(usage: EndpointUsage, analyzed_at: &str) -> Self {
        Self {
            status: classify(usage.call_count),
            method: usage.method,
            route: usage.route,
            call_count: usage.call_count,
            last_called_at: usage.last_called_at,
            analyzed_at: analyzed_at.to_string(),
        }
    }
}

/// Default dashboard order: dead, risky, active; busiest first within a state.
pub fn sort_by_priority(statuses: &mut [EndpointStatus]) {
    statuses.sort_by(|a, b| {
        a.status
            .priority()
            .cmp(&b.status.priority())
            .then_with(|| b.call_count.cmp(&a.call_count))
    });
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: u64,
    pub dead: u64,
    pub risky: u64,
    pub active: u64,
}

impl StatusCounts {
    pub fn from_statuses(statuses: &[EndpointStatus]) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            counts.total += 1;
            match status.status {
                EndpointState::Dead => counts.dead += 1,
                EndpointState::Risky => counts.risky += 1,
                EndpointState::Active => counts.active += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: u64,
    pub dead: u64,
    pub risky: u64,
    pub active: u64,
    pub dead_percentage: f64,
    pub risky_percentage: f64,
    pub active_percentage: f64,
    pub last_analyzed_at: Option<String>,
}

impl StatusSummary {
    pub fn from_statuses(statuses: &[EndpointStatus]) -> Self {
        let counts = StatusCounts::from_statuses(statuses);
        let last_analyzed_at = statuses
            .iter()
            .map(|status| status.analyzed_at.as_str())
            .max()
            .map(str::to_string);
        Self {
            total: counts.total,
            dead: counts.dead,
            risky: counts.risky,
            active: counts.active,
            dead_percentage: percentage(counts.dead, counts.total),
            risky_percentage: percentage(counts.risky, counts.total),
            active_percentage: percentage(counts.active, counts.total),
            last_analyzed_at,
        }
    }
}

/// Share of `part` in `total`, rounded to two decimals; zero when empty.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = (part as f64 / total as f64) * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Canonical stored form: UTC, millisecond precision, `Z` suffix. Lexical
/// order of these strings matches chronological order.
pub fn format_ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
