use serving_logging::serving_debug;

use crate::{Generation, Job, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollerState {
    #[default]
    Idle,
    Polling,
    Stopped,
}

/// What a timer tick should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickDecision {
    /// Tick from a stale generation or a poller that is not polling.
    Discard,
    /// No job or a terminal job: cancel the timer, no fetch on this tick.
    Stop,
    /// The previous fetch of this generation has not settled yet.
    SkipInFlight,
    Fetch(ResourceId),
}

/// Polling bookkeeping for the current job. The timer itself lives in the
/// engine; this decides what each tick means.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobPoller {
    generation: Generation,
    state: PollerState,
    job_id: Option<ResourceId>,
    in_flight: bool,
}

impl JobPoller {
    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_polling(&self) -> bool {
        self.state == PollerState::Polling
    }

    /// Starts polling `job_id` under a fresh generation. Returns the
    /// generation that was still polling, if any, so its timer can be
    /// cancelled before the new one starts.
    pub fn start(&mut self, job_id: ResourceId) -> (Option<Generation>, Generation) {
        let previous = self.stop();
        self.generation += 1;
        self.state = PollerState::Polling;
        self.job_id = Some(job_id);
        self.in_flight = false;
        serving_debug!(
            "Poller generation {} started for job {:?}",
            self.generation,
            self.job_id
        );
        (previous, self.generation)
    }

    /// Stops the current poller. Returns its generation if it was polling.
    pub fn stop(&mut self) -> Option<Generation> {
        if self.state != PollerState::Polling {
            return None;
        }
        self.state = PollerState::Stopped;
        self.in_flight = false;
        serving_debug!("Poller generation {} stopped", self.generation);
        Some(self.generation)
    }

    /// Evaluates the stop condition first, then whether to fetch.
    pub fn on_tick(&mut self, generation: Generation, job: Option<&Job>) -> TickDecision {
        if generation != self.generation || self.state != PollerState::Polling {
            return TickDecision::Discard;
        }
        let job_id = match (job, &self.job_id) {
            (Some(job), Some(job_id)) if !job.is_terminal() => job_id.clone(),
            _ => {
                self.stop();
                return TickDecision::Stop;
            }
        };
        if self.in_flight {
            return TickDecision::SkipInFlight;
        }
        self.in_flight = true;
        // Always the launched id; snapshots may spell it differently.
        TickDecision::Fetch(job_id)
    }

    /// Whether a fetch result still belongs to the live poller.
    pub fn accepts(&self, generation: Generation, job_id: &ResourceId) -> bool {
        self.state == PollerState::Polling
            && generation == self.generation
            && self.job_id.as_ref() == Some(job_id)
    }

    /// Marks the in-flight fetch of `generation` as settled.
    pub fn fetch_settled(&mut self, generation: Generation) {
        if generation == self.generation {
            self.in_flight = false;
        }
    }
}
