use serving_core::{Effect, Msg};
use serving_logging::serving_debug;

use crate::{EngineEvent, EngineHandle};

impl EngineHandle {
    /// Executes effects produced by `serving_core::update`, in order.
    pub fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            serving_debug!("Executing {}", effect_name(&effect));
            match effect {
                Effect::LoadModels => self.load_models(),
                Effect::Upload { values } => self.upload(values),
                Effect::Launch {
                    model_id,
                    argument_infos,
                } => self.launch(model_id, argument_infos),
                Effect::StartPolling { generation } => self.start_polling(generation),
                Effect::StopPolling { generation } => self.stop_polling(generation),
                Effect::FetchJob { generation, job_id } => self.fetch_job(generation, job_id),
                Effect::FetchResult { path } => self.fetch_result(path),
            }
        }
    }
}

fn effect_name(effect: &Effect) -> &'static str {
    match effect {
        Effect::LoadModels => "LoadModels",
        Effect::Upload { .. } => "Upload",
        Effect::Launch { .. } => "Launch",
        Effect::StartPolling { .. } => "StartPolling",
        Effect::StopPolling { .. } => "StopPolling",
        Effect::FetchJob { .. } => "FetchJob",
        Effect::FetchResult { .. } => "FetchResult",
    }
}

impl EngineEvent {
    /// Converts a completion into the message the state machine expects.
    /// Errors travel as their underlying API error text.
    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::ModelsLoaded(Ok(models)) => Msg::ModelsLoaded(models),
            EngineEvent::ModelsLoaded(Err(err)) => Msg::ModelsLoadFailed(err.to_string()),
            EngineEvent::UploadCompleted(result) => {
                Msg::UploadCompleted(result.map_err(|err| err.0.to_string()))
            }
            EngineEvent::JobLaunched(result) => {
                Msg::JobLaunched(result.map_err(|err| err.0.to_string()))
            }
            EngineEvent::PollTick { generation } => Msg::PollTick { generation },
            EngineEvent::JobPolled {
                generation,
                job_id,
                result,
            } => Msg::JobPolled {
                generation,
                job_id,
                result: result.map_err(|err| err.0.to_string()),
            },
            EngineEvent::ResultFetched { path, result } => Msg::ResultFetched {
                path,
                result: result.map_err(|err| err.0.to_string()),
            },
        }
    }
}
