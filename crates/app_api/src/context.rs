use std::sync::Arc;

use ingest::{DbEventSink, EventWriter};
use pruner_app::{AppState, MaintenanceSchedule, MaintenanceScheduler};
use tokio::task::JoinHandle;

/// Everything a transport needs to serve requests.
#[derive(Clone)]
pub struct AppContext {
    pub app_state: AppState,
    pub writer: EventWriter,
    pub scheduler: MaintenanceScheduler,
}

impl AppContext {
    /// Spawns the event writer against the state's database. Must be called
    /// inside a tokio runtime. The handle completes once every clone of the
    /// context is dropped and the queue has drained.
    pub fn start(
        app_state: AppState,
        schedule: MaintenanceSchedule,
        queue_capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let sink = Arc::new(DbEventSink::new(app_state.config.db_path.clone()));
        let (writer, writer_handle) = EventWriter::spawn(sink, queue_capacity);
        let scheduler =
            MaintenanceScheduler::new(app_state.services.maintenance.clone(), schedule);
        let context = Self {
            app_state,
            writer,
            scheduler,
        };
        (context, writer_handle)
    }
}
