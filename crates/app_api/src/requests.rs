use serde::Deserialize;
use serde_json::Value;

/// Raw tracking body; validated by the ingest service.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct TrackRequest {
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
pub struct ProjectPath {
    pub project_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusPath {
    pub project_id: String,
    pub status: String,
}
