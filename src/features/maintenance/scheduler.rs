//! Background retention schedulers.
//!
//! Each job runs on its own fixed interval, once immediately at startup and
//! then every period. Late ticks fire back to back instead of being dropped.
//! All loops stop when the shared cancellation token fires.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::features::audit::AuditRetentionWorker;
use crate::features::file_requests::RequestReaper;
use crate::features::files::FileRetentionWorker;
use crate::shared::constants::AUDIT_SCAN_INTERVAL;

/// Workers driven by the schedulers
pub struct RetentionJobs {
    pub file_retention: Arc<FileRetentionWorker>,
    pub request_reaper: Arc<RequestReaper>,
    pub audit_retention: Arc<AuditRetentionWorker>,
    /// File-expiry scan period; the request reaper shares it
    pub cleanup_interval: Duration,
}

/// Spawn every scheduler. The handles finish after `shutdown` is cancelled.
pub fn spawn_all(jobs: RetentionJobs, shutdown: CancellationToken) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(3);

    tracing::info!(
        "Starting cleanup service (interval: {:?}, trash retention: {} days)",
        jobs.cleanup_interval,
        jobs.file_retention.trash_retention_days()
    );

    {
        let worker = Arc::clone(&jobs.file_retention);
        handles.push(tokio::spawn(run_every(
            "file-retention",
            jobs.cleanup_interval,
            shutdown.clone(),
            move || {
                let worker = Arc::clone(&worker);
                async move {
                    worker.tick().await;
                }
            },
        )));
    }

    {
        let reaper = Arc::clone(&jobs.request_reaper);
        handles.push(tokio::spawn(run_every(
            "request-reaper",
            jobs.cleanup_interval,
            shutdown.clone(),
            move || {
                let reaper = Arc::clone(&reaper);
                async move {
                    reaper.tick().await;
                }
            },
        )));
    }

    tracing::info!(
        "Starting audit log cleanup (retention: {} days, max size: {} bytes)",
        jobs.audit_retention.retention_days(),
        jobs.audit_retention.max_size_bytes()
    );

    {
        let worker = Arc::clone(&jobs.audit_retention);
        handles.push(tokio::spawn(run_every(
            "audit-retention",
            AUDIT_SCAN_INTERVAL,
            shutdown,
            move || {
                let worker = Arc::clone(&worker);
                async move {
                    worker.tick().await;
                }
            },
        )));
    }

    handles
}

/// Run `job` every `period` until `shutdown` is cancelled. A tick that is
/// already running finishes before the loop checks for cancellation again.
pub async fn run_every<F, Fut>(
    name: &'static str,
    period: Duration,
    shutdown: CancellationToken,
    mut job: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Scheduler {} stopped", name);
                break;
            }
            _ = ticker.tick() => {
                tracing::debug!("Scheduler {} tick", name);
                job().await;
            }
        }
    }
}
