use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serving_core::{
    update, Generation, Job, JobStatus, Msg, SessionError, SessionState, SessionViewModel,
};
use serving_engine::{EngineHandle, ServingApi};
use serving_logging::{serving_debug, serving_info, serving_warn};

use crate::render::{changed_lines, render};

/// How a `run` ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The job completed. `result` is `None` when it reported no result path.
    Completed { job: Job, result: Option<String> },
    JobFailed(Job),
    Aborted(SessionError),
    /// Every input was empty text, so there was nothing to upload.
    NothingStaged,
    Interrupted,
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Completed { .. } => 0,
            RunOutcome::JobFailed(_) => 2,
            RunOutcome::Aborted(_) | RunOutcome::NothingStaged => 1,
            RunOutcome::Interrupted => 130,
        }
    }
}

/// What the autopilot wants next.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Wait,
    Send(Msg),
    Finish(RunOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitModel,
    AwaitUpload,
    AwaitJob,
    Watching,
}

/// Plays the user's part in the session: once the model resolves it
/// clicks Upload, once arguments arrive it clicks Run, then it waits for
/// the job and its result to settle.
#[derive(Debug)]
pub struct Autopilot {
    phase: Phase,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            phase: Phase::AwaitModel,
        }
    }
}

impl Autopilot {
    pub fn advance(&mut self, view: &SessionViewModel) -> Step {
        match self.phase {
            Phase::AwaitModel => {
                if view.model.is_some() {
                    self.phase = Phase::AwaitUpload;
                    return Step::Send(Msg::UploadRequested);
                }
                abort_on(view, |err| matches!(err, SessionError::ModelLookup(_)))
            }
            Phase::AwaitUpload => {
                if view.uploading {
                    return Step::Wait;
                }
                if !view.argument_infos.is_empty() {
                    self.phase = Phase::AwaitJob;
                    return Step::Send(Msg::LaunchRequested);
                }
                if view.staged.is_empty() {
                    return Step::Finish(RunOutcome::NothingStaged);
                }
                abort_on(view, |err| matches!(err, SessionError::Upload(_)))
            }
            Phase::AwaitJob => {
                if view.job.is_some() {
                    self.phase = Phase::Watching;
                    return self.advance(view);
                }
                abort_on(view, |err| matches!(err, SessionError::Launch(_)))
            }
            Phase::Watching => watch(view),
        }
    }
}

fn abort_on(view: &SessionViewModel, pred: impl Fn(&SessionError) -> bool) -> Step {
    match &view.last_error {
        Some(err) if pred(err) => Step::Finish(RunOutcome::Aborted(err.clone())),
        _ => Step::Wait,
    }
}

fn watch(view: &SessionViewModel) -> Step {
    let Some(job) = view.job.as_ref().filter(|_| view.job_settled()) else {
        return Step::Wait;
    };
    if job.status == JobStatus::Failed {
        return Step::Finish(RunOutcome::JobFailed(job.clone()));
    }
    if job.result_ref().is_none() {
        return Step::Finish(RunOutcome::Completed {
            job: job.clone(),
            result: None,
        });
    }
    if let Some(result) = &view.result {
        return Step::Finish(RunOutcome::Completed {
            job: job.clone(),
            result: Some(result.clone()),
        });
    }
    abort_on(view, |err| matches!(err, SessionError::ResultFetch(_)))
}

/// Owns the session state and the engine, and prints status changes to
/// stderr as they happen.
pub struct App {
    state: SessionState,
    engine: EngineHandle,
    rendered: Vec<String>,
    echo: bool,
}

impl App {
    /// Must be called from within a tokio runtime.
    pub fn new(api: Arc<dyn ServingApi>, model_name: &str, poll_interval: Duration) -> Self {
        Self {
            state: SessionState::new(model_name),
            engine: EngineHandle::new(api, poll_interval),
            rendered: Vec::new(),
            echo: true,
        }
    }

    /// Disables status output.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn view(&self) -> SessionViewModel {
        self.state.view()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::replace(&mut self.state, SessionState::new(String::new()));
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.engine.execute(effects);

        if was_dirty {
            self.enqueue_render();
        }
    }

    fn enqueue_render(&mut self) {
        let lines = render(&self.state.view());
        if self.echo {
            for line in changed_lines(&self.rendered, &lines) {
                eprintln!("{line}");
            }
        }
        self.rendered = lines;
    }

    /// Stages `inputs`, then drives the session until it settles or
    /// `interrupt` resolves.
    pub async fn run(
        &mut self,
        inputs: Vec<Msg>,
        interrupt: impl Future<Output = ()>,
    ) -> RunOutcome {
        let mut interrupt = std::pin::pin!(interrupt);
        for msg in inputs {
            self.dispatch(msg);
        }
        self.dispatch(Msg::Started);

        let mut autopilot = Autopilot::default();
        loop {
            match autopilot.advance(&self.state.view()) {
                Step::Send(msg) => {
                    serving_debug!("Autopilot sends {:?}", msg);
                    self.dispatch(msg);
                    continue;
                }
                Step::Finish(outcome) => {
                    serving_info!("Run finished: {:?}", outcome);
                    return outcome;
                }
                Step::Wait => {}
            }

            tokio::select! {
                event = self.engine.recv() => match event {
                    Some(event) => self.dispatch(event.into_msg()),
                    None => {
                        serving_warn!("Engine event channel closed");
                        return RunOutcome::Interrupted;
                    }
                },
                _ = &mut interrupt => {
                    serving_info!("Interrupted, stopping");
                    self.dispatch(Msg::StopRequested);
                    return RunOutcome::Interrupted;
                }
            }
        }
    }

    pub fn active_poll_generation(&self) -> Option<Generation> {
        self.engine.active_poll_generation()
    }
}
