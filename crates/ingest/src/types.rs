use serde::Serialize;

/// Why a tracking payload was rejected. `index` and `field` point at the
/// first offending item when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub index: Option<usize>,
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn payload(message: impl Into<String>) -> Self {
        Self {
            index: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn item(index: usize, field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "Item {}: {}", index, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of the plan-aware route cardinality check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdmissionOutcome {
    pub admitted: Vec<pruner_core::NewUsageEvent>,
    pub dropped_events: usize,
    pub dropped_routes: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("db error: {0}")]
    Db(#[from] pruner_db::DbError),
    #[error("invalid payload: {0}")]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
