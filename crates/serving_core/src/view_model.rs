use crate::{ArgumentInfo, ArgumentType, Job, Model, PollerState, SessionError};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionViewModel {
    pub model_name: String,
    pub model: Option<Model>,
    pub staged: Vec<StagedRowView>,
    pub argument_infos: Vec<ArgumentInfo>,
    pub uploading: bool,
    pub job: Option<Job>,
    pub poller: PollerState,
    pub result: Option<String>,
    pub last_error: Option<SessionError>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedRowView {
    pub index: usize,
    pub kind: ArgumentType,
    pub label: String,
}

impl SessionViewModel {
    /// True once a held job is terminal and polling has stopped.
    pub fn job_settled(&self) -> bool {
        self.job.as_ref().is_some_and(Job::is_terminal) && self.poller != PollerState::Polling
    }
}
