//! Serving client core: pure job lifecycle state machine and view-model helpers.
mod effect;
mod msg;
mod poller;
mod results;
mod staging;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use poller::{JobPoller, PollerState, TickDecision};
pub use results::{ResultCache, ResultLookup};
pub use staging::{InputStaging, StageOutcome};
pub use state::{SessionError, SessionState};
pub use types::{
    ArgumentInfo, ArgumentType, Generation, Job, JobStatus, Model, Progress, ResourceId,
    StagedValue,
};
pub use update::update;
pub use view_model::{SessionViewModel, StagedRowView};
