//! Serving client engine: REST calls and effect execution.
mod api;
mod engine;
mod launch;
mod poll;
mod result;
mod runner;
mod types;
mod upload;

pub use api::{ClientSettings, JobCreate, ReqwestApi, ServingApi, UploadResponse, UPLOAD_FIELD};
pub use engine::EngineHandle;
pub use launch::launch;
pub use poll::{fetch_job, spawn_poll_timer, PollTimerHandle};
pub use result::fetch_result;
pub use types::{
    ApiError, EngineEvent, FailureKind, LaunchError, PollFetchError, ResultFetchError,
    UploadError,
};
pub use upload::upload;
