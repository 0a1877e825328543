use std::time::Duration;

use dataknow_logging::{dk_debug, dk_warn};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::{AnalysisService, EngineEvent, EventSink, JobHandle, RemoteStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 150,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Finished(RemoteStatus),
    Failed,
    Exhausted { attempts: u32 },
}

/// Queries the job status once per interval until it reaches a terminal status.
///
/// Each query is awaited before the next interval starts, so a slow answer delays the
/// schedule instead of overlapping it. Ends on a terminal status, on the first
/// transport error, or after `max_attempts` queries.
pub async fn poll_job(
    service: &dyn AnalysisService,
    job: &JobHandle,
    settings: PollSettings,
    sink: &dyn EventSink,
) -> PollOutcome {
    let mut ticker = interval_at(Instant::now() + settings.interval, settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut attempts = 0;
    while attempts < settings.max_attempts {
        ticker.tick().await;
        attempts += 1;
        match service.job_status(job).await {
            Ok(report) => {
                let status = report.status;
                dk_debug!("Job {} poll #{} -> {:?}", job, attempts, status);
                sink.emit(EngineEvent::JobStatus {
                    job: job.clone(),
                    report,
                });
                if status.is_terminal() {
                    return PollOutcome::Finished(status);
                }
            }
            Err(error) => {
                dk_warn!("Job {} poll #{} failed: {}", job, attempts, error);
                sink.emit(EngineEvent::PollingFailed {
                    job: job.clone(),
                    error,
                });
                return PollOutcome::Failed;
            }
        }
    }

    sink.emit(EngineEvent::PollingExhausted {
        job: job.clone(),
        attempts,
    });
    PollOutcome::Exhausted { attempts }
}
