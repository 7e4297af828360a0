use std::fmt;

use bytes::Bytes;
use serving_logging::{serving_debug, serving_info, serving_warn};

use crate::poller::{JobPoller, TickDecision};
use crate::results::{ResultCache, ResultLookup};
use crate::staging::{InputStaging, StageOutcome};
use crate::view_model::{SessionViewModel, StagedRowView};
use crate::{ArgumentInfo, Effect, Generation, Job, Model, ResourceId};

/// Errors surfaced to the user. Poll failures never land here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    ModelLookup(String),
    Upload(String),
    Launch(String),
    ResultFetch(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::ModelLookup(message) => write!(f, "model lookup failed: {message}"),
            SessionError::Upload(message) => write!(f, "upload failed: {message}"),
            SessionError::Launch(message) => write!(f, "job creation failed: {message}"),
            SessionError::ResultFetch(message) => write!(f, "result fetch failed: {message}"),
        }
    }
}

/// Everything the client knows about the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    model_name: String,
    model: Option<Model>,
    staging: InputStaging,
    argument_infos: Vec<ArgumentInfo>,
    upload_in_flight: bool,
    job: Option<Job>,
    poller: JobPoller,
    results: ResultCache,
    result: Option<String>,
    last_error: Option<SessionError>,
    dirty: bool,
}

impl SessionState {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            model: None,
            staging: InputStaging::new(),
            argument_infos: Vec::new(),
            upload_in_flight: false,
            job: None,
            poller: JobPoller::default(),
            results: ResultCache::default(),
            result: None,
            last_error: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> SessionViewModel {
        SessionViewModel {
            model_name: self.model_name.clone(),
            model: self.model.clone(),
            staged: self
                .staging
                .values()
                .iter()
                .enumerate()
                .map(|(index, value)| StagedRowView {
                    index,
                    kind: value.kind(),
                    label: value.label().to_string(),
                })
                .collect(),
            argument_infos: self.argument_infos.clone(),
            uploading: self.upload_in_flight,
            job: self.job.clone(),
            poller: self.poller.state(),
            result: self.result.clone(),
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn poller_generation(&self) -> Generation {
        self.poller.generation()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_error(&mut self, error: SessionError) {
        serving_warn!("{}", error);
        self.last_error = Some(error);
        self.mark_dirty();
    }

    fn clear_error_if(&mut self, pred: impl Fn(&SessionError) -> bool) {
        if self.last_error.as_ref().is_some_and(pred) {
            self.last_error = None;
            self.mark_dirty();
        }
    }

    pub(crate) fn select_model(&mut self, models: Vec<Model>) {
        match models.into_iter().find(|model| model.name == self.model_name) {
            Some(model) => {
                serving_info!("Using model {} (id {})", model.name, model.id);
                self.model = Some(model);
                self.clear_error_if(|err| matches!(err, SessionError::ModelLookup(_)));
                self.mark_dirty();
            }
            None => {
                let message = format!("no model named {:?}", self.model_name);
                self.set_error(SessionError::ModelLookup(message));
            }
        }
    }

    pub(crate) fn stage_file(&mut self, payload: Bytes, name: String) {
        if let StageOutcome::Staged(len) = self.staging.stage_file(payload, name) {
            serving_debug!("Staged file; {} value(s) staged", len);
            self.mark_dirty();
        }
    }

    pub(crate) fn stage_text(&mut self, text: String) {
        if let StageOutcome::Staged(len) = self.staging.stage_text(text) {
            serving_debug!("Staged text; {} value(s) staged", len);
            self.mark_dirty();
        }
    }

    pub(crate) fn upload_request(&mut self) -> Option<Effect> {
        if self.upload_in_flight {
            serving_debug!("Upload already in flight; ignoring request");
            return None;
        }
        if self.staging.is_empty() {
            serving_info!("Nothing staged; upload skipped");
            return None;
        }
        self.upload_in_flight = true;
        self.mark_dirty();
        Some(Effect::Upload {
            values: self.staging.values().to_vec(),
        })
    }

    /// Success replaces the argument list; failure leaves staged values and
    /// previous descriptors untouched.
    pub(crate) fn apply_upload(&mut self, result: Result<Vec<ArgumentInfo>, String>) {
        self.upload_in_flight = false;
        self.mark_dirty();
        match result {
            Ok(argument_infos) => {
                serving_info!("Upload produced {} argument(s)", argument_infos.len());
                self.argument_infos = argument_infos;
                self.clear_error_if(|err| matches!(err, SessionError::Upload(_)));
            }
            Err(message) => self.set_error(SessionError::Upload(message)),
        }
    }

    /// Silent no-op without a model or without argument descriptors.
    pub(crate) fn launch_request(&self) -> Option<Effect> {
        let Some(model) = self.model.as_ref() else {
            serving_debug!("No model selected; launch skipped");
            return None;
        };
        if self.argument_infos.is_empty() {
            serving_debug!("No argument descriptors; launch skipped");
            return None;
        }
        Some(Effect::Launch {
            model_id: model.id.clone(),
            argument_infos: self.argument_infos.clone(),
        })
    }

    pub(crate) fn start_job(&mut self, job: Job) -> Vec<Effect> {
        serving_info!("Job {} created with status {}", job.id, job.status);
        let (previous, generation) = self.poller.start(job.id.clone());
        self.job = Some(job);
        self.result = None;
        self.clear_error_if(|err| matches!(err, SessionError::Launch(_)));
        self.mark_dirty();

        let mut effects = Vec::with_capacity(3);
        if let Some(previous) = previous {
            effects.push(Effect::StopPolling {
                generation: previous,
            });
        }
        effects.push(Effect::StartPolling { generation });
        effects.extend(self.request_result());
        effects
    }

    pub(crate) fn poll_tick(&mut self, generation: Generation) -> Vec<Effect> {
        match self.poller.on_tick(generation, self.job.as_ref()) {
            TickDecision::Discard => {
                serving_debug!("Discarding tick from poller generation {}", generation);
                Vec::new()
            }
            TickDecision::Stop => {
                serving_info!("Polling stopped (generation {})", generation);
                self.mark_dirty();
                vec![Effect::StopPolling { generation }]
            }
            TickDecision::SkipInFlight => {
                serving_debug!("Previous poll still in flight; skipping tick");
                Vec::new()
            }
            TickDecision::Fetch(job_id) => vec![Effect::FetchJob { generation, job_id }],
        }
    }

    pub(crate) fn apply_poll(
        &mut self,
        generation: Generation,
        job_id: &ResourceId,
        result: Result<Job, String>,
    ) -> Vec<Effect> {
        // Settles even when the result is rejected below.
        self.poller.fetch_settled(generation);
        if !self.poller.accepts(generation, job_id) {
            serving_debug!(
                "Discarding poll result for job {} from generation {}",
                job_id,
                generation
            );
            return Vec::new();
        }

        let job = match result {
            Ok(job) => job,
            Err(message) => {
                serving_warn!("Polling job {} failed: {}", job_id, message);
                return Vec::new();
            }
        };
        if self.job.as_ref().is_some_and(Job::is_terminal) {
            serving_debug!("Job {} already terminal; ignoring snapshot", job_id);
            return Vec::new();
        }

        serving_debug!("Job {} status {}", job.id, job.status);
        self.job = Some(job);
        self.mark_dirty();
        self.request_result().into_iter().collect()
    }

    fn request_result(&mut self) -> Option<Effect> {
        let path = self.job.as_ref()?.result_ref()?.to_string();
        match self.results.request(&path) {
            ResultLookup::Cached(text) => {
                if self.result.as_ref() != Some(&text) {
                    self.result = Some(text);
                    self.mark_dirty();
                }
                None
            }
            ResultLookup::Fetch => Some(Effect::FetchResult { path }),
            ResultLookup::Pending | ResultLookup::Failed => None,
        }
    }

    pub(crate) fn apply_result(&mut self, path: String, result: Result<String, String>) {
        match result {
            Ok(text) => {
                serving_info!("Fetched result {} ({} bytes)", path, text.len());
                if self.is_current_result(&path) {
                    self.result = Some(text.clone());
                    self.clear_error_if(|err| matches!(err, SessionError::ResultFetch(_)));
                    self.mark_dirty();
                }
                self.results.complete(&path, text);
            }
            Err(message) => {
                self.results.fail(&path);
                if self.is_current_result(&path) {
                    self.set_error(SessionError::ResultFetch(message));
                } else {
                    serving_warn!("Stale result {} failed: {}", path, message);
                }
            }
        }
    }

    fn is_current_result(&self, path: &str) -> bool {
        self.job
            .as_ref()
            .and_then(Job::result_ref)
            .is_some_and(|current| current == path)
    }

    pub(crate) fn retry_result(&mut self) -> Option<Effect> {
        let path = self.job.as_ref()?.result_ref()?.to_string();
        if self.results.retry(&path) {
            Some(Effect::FetchResult { path })
        } else {
            None
        }
    }

    pub(crate) fn stop_polling(&mut self) -> Option<Generation> {
        let stopped = self.poller.stop();
        if stopped.is_some() {
            self.mark_dirty();
        }
        stopped
    }
}
