use std::fmt;

use serving_core::{ArgumentInfo, Generation, Job, Model, ResourceId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body was not the JSON shape the endpoint promises.
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("upload failed: {0}")]
pub struct UploadError(#[from] pub ApiError);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("job creation failed: {0}")]
pub struct LaunchError(#[from] pub ApiError);

/// Non-fatal; the poll loop logs it and tries again on the next tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("job status fetch failed: {0}")]
pub struct PollFetchError(#[from] pub ApiError);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("result fetch failed: {0}")]
pub struct ResultFetchError(#[from] pub ApiError);

/// Completion notices sent from engine tasks back to the dispatch loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ModelsLoaded(Result<Vec<Model>, ApiError>),
    UploadCompleted(Result<Vec<ArgumentInfo>, UploadError>),
    JobLaunched(Result<Job, LaunchError>),
    PollTick {
        generation: Generation,
    },
    JobPolled {
        generation: Generation,
        job_id: ResourceId,
        result: Result<Job, PollFetchError>,
    },
    ResultFetched {
        path: String,
        result: Result<String, ResultFetchError>,
    },
}
