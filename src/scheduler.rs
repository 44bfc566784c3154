//! Periodic tasks driving the monitor.
//!
//! [`Scheduler::spawn`] starts one task per cadence plus a one-shot initial
//! load. All timing goes through `tokio::time`, so tests can pause the
//! runtime clock and advance it deterministically.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::MonitorConfig;
use crate::service::MonitorService;

/// Task periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Period of the generation task.
    pub generate_every: Duration,
    /// Period of the metrics task.
    pub metrics_every: Duration,
    /// Period of the system log task.
    pub log_every: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            generate_every: Duration::from_secs(3),
            metrics_every: Duration::from_secs(2),
            log_every: Duration::from_secs(2),
        }
    }
}

impl From<&MonitorConfig> for Schedule {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            generate_every: config.generate_interval(),
            metrics_every: config.metrics_interval(),
            log_every: config.log_interval(),
        }
    }
}

/// Owns the service handle and schedule until spawned.
#[derive(Debug)]
pub struct Scheduler {
    service: Arc<MonitorService>,
    schedule: Schedule,
}

impl Scheduler {
    /// Creates a scheduler for `service`.
    #[must_use]
    pub fn new(service: Arc<MonitorService>, schedule: Schedule) -> Self {
        Self { service, schedule }
    }

    /// Starts the initial load and the three periodic tasks.
    ///
    /// Each periodic task first fires one full period after this call.
    #[must_use]
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let Self { service, schedule } = self;

        let initial = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service.load_initial().await;
            })
        };

        let generate = spawn_periodic(
            "generate",
            schedule.generate_every,
            Arc::clone(&service),
            shutdown_rx.clone(),
            |service| async move {
                service.generate_tick().await;
            },
        );

        let metrics = spawn_periodic(
            "metrics",
            schedule.metrics_every,
            Arc::clone(&service),
            shutdown_rx.clone(),
            |service| async move {
                service.recompute_metrics().await;
            },
        );

        let logs = spawn_periodic(
            "logs",
            schedule.log_every,
            service,
            shutdown_rx,
            |service| async move {
                service.emit_log_entry().await;
            },
        );

        tracing::info!(
            generate_ms = schedule.generate_every.as_millis() as u64,
            metrics_ms = schedule.metrics_every.as_millis() as u64,
            logs_ms = schedule.log_every.as_millis() as u64,
            "scheduler started"
        );

        SchedulerHandle {
            shutdown: shutdown_tx,
            tasks: vec![initial, generate, metrics, logs],
        }
    }
}

/// Handle to the running tasks.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Signals every task to stop and waits for them to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(err) = task.await {
                tracing::warn!(%err, "scheduled task ended abnormally");
            }
        }
        tracing::info!("scheduler stopped");
    }
}

/// Runs `task` every `period` until `shutdown` flips to `true` or its
/// sender is dropped.
fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    service: Arc<MonitorService>,
    mut shutdown: watch::Receiver<bool>,
    task: F,
) -> JoinHandle<()>
where
    F: Fn(Arc<MonitorService>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => task(Arc::clone(&service)).await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(task = name, "scheduled task stopped");
    })
}
