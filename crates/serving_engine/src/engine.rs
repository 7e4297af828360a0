use std::sync::Arc;
use std::time::Duration;

use serving_core::{ArgumentInfo, Generation, ResourceId, StagedValue};
use serving_logging::serving_debug;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::poll::{self, spawn_poll_timer, PollTimerHandle};
use crate::{launch, result, upload, EngineEvent, ServingApi};

/// Runs network calls as spawned tasks and reports completions as
/// `EngineEvent`s. Owns at most one poll timer at a time.
pub struct EngineHandle {
    api: Arc<dyn ServingApi>,
    poll_interval: Duration,
    event_tx: UnboundedSender<EngineEvent>,
    event_rx: UnboundedReceiver<EngineEvent>,
    poll_timer: Option<PollTimerHandle>,
}

impl EngineHandle {
    /// Must be called from within a tokio runtime.
    pub fn new(api: Arc<dyn ServingApi>, poll_interval: Duration) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            api,
            poll_interval,
            event_tx,
            event_rx,
            poll_timer: None,
        }
    }

    pub fn load_models(&self) {
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = api.list_models().await;
            let _ = event_tx.send(EngineEvent::ModelsLoaded(result));
        });
    }

    pub fn upload(&self, values: Vec<StagedValue>) {
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = upload::upload(api.as_ref(), &values).await;
            let _ = event_tx.send(EngineEvent::UploadCompleted(result));
        });
    }

    pub fn launch(&self, model_id: ResourceId, argument_infos: Vec<ArgumentInfo>) {
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = launch::launch(api.as_ref(), &model_id, &argument_infos).await;
            let _ = event_tx.send(EngineEvent::JobLaunched(result));
        });
    }

    /// Cancels any running timer before starting the new one.
    pub fn start_polling(&mut self, generation: Generation) {
        if let Some(previous) = self.poll_timer.take() {
            serving_debug!(
                "Cancelling poll timer generation {} before starting {}",
                previous.generation(),
                generation
            );
            previous.stop();
        }
        self.poll_timer = Some(spawn_poll_timer(
            generation,
            self.poll_interval,
            self.event_tx.clone(),
        ));
    }

    pub fn stop_polling(&mut self, generation: Generation) {
        let matches = self
            .poll_timer
            .as_ref()
            .is_some_and(|timer| timer.generation() == generation);
        if matches {
            if let Some(timer) = self.poll_timer.take() {
                timer.stop();
            }
        }
    }

    pub fn active_poll_generation(&self) -> Option<Generation> {
        self.poll_timer
            .as_ref()
            .filter(|timer| !timer.is_stopped())
            .map(PollTimerHandle::generation)
    }

    pub fn fetch_job(&self, generation: Generation, job_id: ResourceId) {
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = poll::fetch_job(api.as_ref(), &job_id).await;
            let _ = event_tx.send(EngineEvent::JobPolled {
                generation,
                job_id,
                result,
            });
        });
    }

    pub fn fetch_result(&self, path: String) {
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = result::fetch_result(api.as_ref(), &path).await;
            let _ = event_tx.send(EngineEvent::ResultFetched { path, result });
        });
    }

    /// Waits for the next completion. Never yields `None` while the handle
    /// is alive, since it holds a sender itself.
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.event_rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}
