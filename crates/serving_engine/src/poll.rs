use std::time::Duration;

use serving_core::{Generation, Job, ResourceId};
use serving_logging::{serving_debug, serving_warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, PollFetchError, ServingApi};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running poll timer. Stopping (or dropping) it cancels the
/// timer; ticks already queued are discarded downstream by generation.
#[derive(Debug)]
pub struct PollTimerHandle {
    generation: Generation,
    token: CancellationToken,
}

impl PollTimerHandle {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for PollTimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawns a recurring timer that emits `PollTick` every `interval`. The
/// first tick fires one interval after the start.
pub fn spawn_poll_timer(
    generation: Generation,
    interval: Duration,
    events: UnboundedSender<EngineEvent>,
) -> PollTimerHandle {
    let interval = interval.max(MIN_POLL_INTERVAL);
    let token = CancellationToken::new();
    let cancelled = token.clone();

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => break,
                _ = ticker.tick() => {
                    if events.send(EngineEvent::PollTick { generation }).is_err() {
                        break;
                    }
                }
            }
        }
        serving_debug!("Poll timer generation {} exited", generation);
    });

    PollTimerHandle { generation, token }
}

pub async fn fetch_job(api: &dyn ServingApi, job_id: &ResourceId) -> Result<Job, PollFetchError> {
    api.get_job(job_id).await.map_err(|err| {
        serving_warn!("Status fetch for job {} failed: {}", job_id, err);
        PollFetchError(err)
    })
}
