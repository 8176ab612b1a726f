//! Periodic background jobs
//!
//! Each job gets its own loop: run, wait one interval, run again. A job therefore never
//! overlaps itself, while different jobs run concurrently. [`Scheduler::stop`] lets a
//! running job finish before its loop exits.

mod jobs;

pub use jobs::{FleetSyncJob, PriceRefreshJob};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::error::CoreResult;
use crate::services::{ServiceContext, SyncService};

/// A unit of periodic work.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Pause between the end of one run and the start of the next.
    fn interval(&self) -> Duration;

    /// One run. An error is logged and the job runs again at its next tick.
    async fn run(&self) -> CoreResult<()>;
}

/// Intervals of the built-in jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobIntervals {
    pub price_refresh: Duration,
    pub fleet_sync: Duration,
}

impl Default for JobIntervals {
    fn default() -> Self {
        Self {
            price_refresh: Duration::from_secs(3600),
            fleet_sync: Duration::from_secs(86_400),
        }
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

/// Owns the job loops between [`start`](Self::start) and [`stop`](Self::stop).
pub struct Scheduler {
    jobs: Vec<Arc<dyn ScheduledJob>>,
    running: Mutex<Option<Running>>,
}

impl Scheduler {
    /// A scheduler with no jobs; add them with [`with_job`](Self::with_job).
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            running: Mutex::new(None),
        }
    }

    /// Hourly price refresh and daily fleet sync.
    #[must_use]
    pub fn with_default_jobs(ctx: &Arc<ServiceContext>, intervals: JobIntervals) -> Self {
        Self::new()
            .with_job(Arc::new(PriceRefreshJob::new(
                Arc::clone(&ctx.price_service),
                intervals.price_refresh,
            )))
            .with_job(Arc::new(FleetSyncJob::new(
                SyncService::new(Arc::clone(ctx)),
                intervals.fleet_sync,
            )))
    }

    #[must_use]
    pub fn with_job(mut self, job: Arc<dyn ScheduledJob>) -> Self {
        self.jobs.push(job);
        self
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|job| job.name()).collect()
    }

    /// Launch one loop per job. Calling it again while running does nothing.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if running.is_some() {
            log::debug!("Scheduler already running");
            return;
        }

        let (shutdown, receiver) = watch::channel(false);
        let handles = self
            .jobs
            .iter()
            .map(|job| tokio::spawn(run_loop(Arc::clone(job), receiver.clone())))
            .collect();

        log::info!("Scheduler started with {} jobs", self.jobs.len());
        *running = Some(Running { shutdown, handles });
    }

    /// Signal every loop to stop and wait until all of them have exited.
    pub async fn stop(&self) {
        let Some(Running { shutdown, handles }) = self.running.lock().await.take() else {
            return;
        };

        // Receivers are gone only if every loop already exited.
        let _ = shutdown.send(true);
        for handle in handles {
            if let Err(e) = handle.await {
                log::error!("Job loop terminated abnormally: {e}");
            }
        }
        log::info!("Scheduler stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_loop(job: Arc<dyn ScheduledJob>, mut shutdown: watch::Receiver<bool>) {
    let name = job.name();
    log::info!("Job '{name}' scheduled every {}s", job.interval().as_secs());

    loop {
        if *shutdown.borrow() {
            break;
        }

        log::debug!("Job '{name}' running");
        match job.run().await {
            Ok(()) => log::debug!("Job '{name}' finished"),
            Err(e) => e.log(&format!("Job '{name}' failed")),
        }

        tokio::select! {
            () = tokio::time::sleep(job.interval()) => {}
            _ = shutdown.changed() => break,
        }
    }

    log::info!("Job '{name}' stopped");
}
