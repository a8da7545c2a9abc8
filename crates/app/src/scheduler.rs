use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::MaintenanceSchedule;
use crate::error::{AppError, Result};
use crate::services::{MaintenanceReport, MaintenanceService};
use pruner_core::format_ts;

/// Runs the daily maintenance cycle and the on-demand trigger. At most one
/// cycle runs at a time; a second request while one is in flight is refused.
#[derive(Clone)]
pub struct MaintenanceScheduler {
    maintenance: MaintenanceService,
    schedule: MaintenanceSchedule,
    running: Arc<Mutex<()>>,
}

impl MaintenanceScheduler {
    pub fn new(maintenance: MaintenanceService, schedule: MaintenanceSchedule) -> Self {
        Self {
            maintenance,
            schedule,
            running: Arc::new(Mutex::new(())),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Runs one sweep + aggregate cycle immediately. The lock travels with the
    /// blocking task and outlives a dropped caller.
    pub async fn run_now(&self) -> Result<MaintenanceReport> {
        let guard = self
            .running
            .clone()
            .try_lock_owned()
            .map_err(|_| AppError::Busy("maintenance cycle already running".to_string()))?;
        let maintenance = self.maintenance.clone();
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            maintenance.run_cycle(Utc::now())
        })
        .await
        .map_err(|err| AppError::Message(format!("maintenance task failed: {}", err)))?
    }

    /// Starts the daily loop on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run_daily().await })
    }

    async fn run_daily(self) {
        loop {
            let now = Utc::now();
            let next = match next_run_after(now, &self.schedule) {
                Ok(next) => next,
                Err(err) => {
                    error!(error = %err, "maintenance scheduler stopped");
                    return;
                }
            };
            info!(next_run = %format_ts(next), "next maintenance cycle scheduled");
            let wait = (next - now).to_std().unwrap_or(StdDuration::ZERO);
            tokio::time::sleep(wait).await;

            match self.run_now().await {
                Ok(report) => info!(
                    deleted = report.sweep.deleted,
                    analyzed = report.analysis.analyzed,
                    "scheduled maintenance complete"
                ),
                Err(AppError::Busy(_)) => {
                    warn!("previous maintenance cycle still running, skipping this one")
                }
                Err(err) => error!(error = %err, "scheduled maintenance cycle failed"),
            }
        }
    }
}

/// Next occurrence of the configured UTC time strictly after `now`.
pub fn next_run_after(
    now: DateTime<Utc>,
    schedule: &MaintenanceSchedule,
) -> Result<DateTime<Utc>> {
    schedule.validate().map_err(AppError::InvalidInput)?;
    let today = now
        .date_naive()
        .and_hms_opt(schedule.hour, schedule.minute, 0)
        .ok_or_else(|| AppError::InvalidInput("invalid maintenance time".to_string()))?;
    let candidate = Utc.from_utc_datetime(&today);
    if candidate > now {
        Ok(candidate)
    } else {
        Ok(candidate + Duration::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppPaths, AppState, PlanLookup, ensure_app_data_dir};
    use pruner_core::{Plan, PlanLimits};

    fn schedule(hour: u32, minute: u32) -> MaintenanceSchedule {
        MaintenanceSchedule {
            hour,
            minute,
            enabled: true,
        }
    }

    #[test]
    fn next_run_is_later_today_or_tomorrow() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 1, 30, 0).unwrap();
        assert_eq!(
            next_run_after(now, &schedule(2, 0)).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 1, 2, 0, 0).unwrap()
        );
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 2, 0, 0).unwrap();
        assert_eq!(
            next_run_after(now, &schedule(2, 0)).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 2, 2, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_out_of_range_time() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert!(next_run_after(now, &schedule(24, 0)).is_err());
        assert!(next_run_after(now, &schedule(3, 60)).is_err());
    }

    #[tokio::test]
    async fn refuses_overlapping_runs() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::new(temp_dir.path().to_path_buf());
        ensure_app_data_dir(&paths).expect("data dir");
        let state = AppState::new(paths.db_path);
        state.setup_db().expect("setup db");

        let scheduler =
            MaintenanceScheduler::new(state.services.maintenance.clone(), schedule(2, 0));
        let guard = scheduler.running.clone().try_lock_owned().expect("lock");
        assert!(scheduler.is_running());
        assert!(matches!(scheduler.run_now().await, Err(AppError::Busy(_))));
        drop(guard);

        let report = scheduler.run_now().await.expect("cycle");
        assert_eq!(report.sweep.projects, 0);
        assert!(!scheduler.is_running());
    }

    /// Blocks the sweep inside the plan lookup until the test releases it.
    struct GatedPlans {
        entered: std::sync::Mutex<std::sync::mpsc::Sender<()>>,
        release: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl PlanLookup for GatedPlans {
        fn limits(&self, _project_id: &str) -> Result<Option<PlanLimits>> {
            let _ = self.entered.lock().expect("entered").send(());
            let _ = self.release.lock().expect("release").recv();
            Ok(Some(Plan::Pro.limits()))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dropped_run_keeps_the_lock_until_the_cycle_ends() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::new(temp_dir.path().to_path_buf());
        ensure_app_data_dir(&paths).expect("data dir");
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let plans = Arc::new(GatedPlans {
            entered: std::sync::Mutex::new(entered_tx),
            release: std::sync::Mutex::new(release_rx),
        });
        let state = AppState::with_plan_lookup(paths.db_path.clone(), plans);
        state.setup_db().expect("setup db");
        state
            .services
            .projects
            .create("Shop", Plan::Pro)
            .expect("project");

        let scheduler =
            MaintenanceScheduler::new(state.services.maintenance.clone(), schedule(2, 0));
        let caller = scheduler.clone();
        let request = tokio::spawn(async move { caller.run_now().await });
        tokio::task::spawn_blocking(move || entered_rx.recv())
            .await
            .expect("join")
            .expect("sweep started");

        request.abort();
        assert!(request.await.is_err());
        assert!(scheduler.is_running());
        assert!(matches!(scheduler.run_now().await, Err(AppError::Busy(_))));

        drop(release_tx);
        let mut released = false;
        for _ in 0..500 {
            if !scheduler.is_running() {
                released = true;
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        assert!(released);
    }
}
