use serving_logging::serving_debug;

use crate::{Effect, Msg, SessionError, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => vec![Effect::LoadModels],
        Msg::ModelsLoaded(models) => {
            state.select_model(models);
            Vec::new()
        }
        Msg::ModelsLoadFailed(message) => {
            state.set_error(SessionError::ModelLookup(message));
            Vec::new()
        }
        Msg::FileStaged { name, payload } => {
            state.stage_file(payload, name);
            Vec::new()
        }
        Msg::TextStaged(text) => {
            state.stage_text(text);
            Vec::new()
        }
        Msg::UploadRequested => state.upload_request().into_iter().collect(),
        Msg::UploadCompleted(result) => {
            state.apply_upload(result);
            Vec::new()
        }
        Msg::LaunchRequested => state.launch_request().into_iter().collect(),
        Msg::JobLaunched(Ok(job)) => state.start_job(job),
        Msg::JobLaunched(Err(message)) => {
            // A failed launch leaves any running poller alone.
            state.set_error(SessionError::Launch(message));
            Vec::new()
        }
        Msg::PollTick { generation } => state.poll_tick(generation),
        Msg::JobPolled {
            generation,
            job_id,
            result,
        } => state.apply_poll(generation, &job_id, result),
        Msg::ResultFetched { path, result } => {
            state.apply_result(path, result);
            Vec::new()
        }
        Msg::ResultRetryRequested => state.retry_result().into_iter().collect(),
        Msg::StopRequested => match state.stop_polling() {
            Some(generation) => vec![Effect::StopPolling { generation }],
            None => {
                serving_debug!("Stop requested with no active poller");
                Vec::new()
            }
        },
    };

    (state, effects)
}
