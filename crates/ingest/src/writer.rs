use std::path::PathBuf;
use std::sync::Arc;

use pruner_core::NewUsageEvent;
use pruner_db::Db;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::types::Result;

/// Admitted events for one project, queued for persistence.
#[derive(Debug, Clone)]
pub struct WriteBatch {
    pub project_id: String,
    pub events: Vec<NewUsageEvent>,
}

/// Blocking persistence target for admitted events.
pub trait EventSink: Send + Sync + 'static {
    fn write(&self, project_id: &str, events: &[NewUsageEvent]) -> Result<usize>;
}

/// Writes batches through a fresh SQLite connection per batch.
#[derive(Debug, Clone)]
pub struct DbEventSink {
    db_path: PathBuf,
}

impl DbEventSink {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

impl EventSink for DbEventSink {
    fn write(&self, project_id: &str, events: &[NewUsageEvent]) -> Result<usize> {
        let mut db = Db::open(&self.db_path)?;
        Ok(db.insert_usage_events(project_id, events)?)
    }
}

/// Fire-and-forget handle to the background writer. Cloning is cheap; the
/// worker exits once every handle is dropped and the queue drains.
#[derive(Clone)]
pub struct EventWriter {
    tx: mpsc::Sender<WriteBatch>,
}

impl EventWriter {
    pub fn spawn(sink: Arc<dyn EventSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_writer(sink, rx));
        (Self { tx }, handle)
    }

    /// Queues a batch without waiting. Returns `false` when the batch was
    /// dropped because the queue is full or the worker has stopped.
    pub fn dispatch(&self, project_id: &str, events: Vec<NewUsageEvent>) -> bool {
        if events.is_empty() {
            return true;
        }
        let count = events.len();
        let batch = WriteBatch {
            project_id: project_id.to_string(),
            events,
        };
        match self.tx.try_send(batch) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(project_id, count, "write queue full, dropping batch");
                false
            }
            Err(TrySendError::Closed(_)) => {
                error!(project_id, count, "event writer stopped, dropping batch");
                false
            }
        }
    }
}

async fn run_writer(sink: Arc<dyn EventSink>, mut rx: mpsc::Receiver<WriteBatch>) {
    while let Some(batch) = rx.recv().await {
        let sink = sink.clone();
        let project_id = batch.project_id.clone();
        let result =
            tokio::task::spawn_blocking(move || sink.write(&batch.project_id, &batch.events)).await;
        match result {
            Ok(Ok(written)) => debug!(project_id = %project_id, written, "usage events stored"),
            Ok(Err(err)) => {
                error!(project_id = %project_id, error = %err, "failed to store usage events")
            }
            Err(err) => error!(project_id = %project_id, error = %err, "event writer task failed"),
        }
    }
    debug!("event writer queue closed");
}
