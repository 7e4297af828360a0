use crate::{ArgumentInfo, Generation, ResourceId, StagedValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadModels,
    Upload {
        values: Vec<StagedValue>,
    },
    Launch {
        model_id: ResourceId,
        argument_infos: Vec<ArgumentInfo>,
    },
    /// Start the recurring poll timer. Any older timer has already been
    /// stopped by a preceding `StopPolling`.
    StartPolling { generation: Generation },
    StopPolling { generation: Generation },
    FetchJob {
        generation: Generation,
        job_id: ResourceId,
    },
    FetchResult { path: String },
}
