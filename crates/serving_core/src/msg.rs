use bytes::Bytes;

use crate::{ArgumentInfo, Generation, Job, Model, ResourceId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Session opened; requests the model listing.
    Started,
    /// Model listing arrived.
    ModelsLoaded(Vec<Model>),
    /// Model listing failed.
    ModelsLoadFailed(String),
    /// User picked a file.
    FileStaged { name: String, payload: Bytes },
    /// User pushed a text value.
    TextStaged(String),
    /// User clicked Upload.
    UploadRequested,
    /// Upload finished; carries the new argument descriptors or the failure.
    UploadCompleted(Result<Vec<ArgumentInfo>, String>),
    /// User clicked Run.
    LaunchRequested,
    /// Job creation finished.
    JobLaunched(Result<Job, String>),
    /// Poll timer fired for `generation`.
    PollTick { generation: Generation },
    /// A job status fetch settled.
    JobPolled {
        generation: Generation,
        job_id: ResourceId,
        result: Result<Job, String>,
    },
    /// A result fetch settled.
    ResultFetched {
        path: String,
        result: Result<String, String>,
    },
    /// User asked to retry a failed result fetch.
    ResultRetryRequested,
    /// User stopped watching the job.
    StopRequested,
}
