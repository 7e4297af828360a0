use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Poller instance number; bumped on every poller start.
pub type Generation = u64;

/// Server-side identifier. The backend may use integers or strings; the
/// original representation is kept so it round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{id}"),
            ResourceId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Str(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Str(id)
    }
}

/// A value the user added locally, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedValue {
    File { name: String, payload: Bytes },
    Text(String),
}

impl StagedValue {
    pub fn kind(&self) -> ArgumentType {
        match self {
            StagedValue::File { .. } => ArgumentType::File,
            StagedValue::Text(_) => ArgumentType::Text,
        }
    }

    /// File name for files, the literal for text.
    pub fn label(&self) -> &str {
        match self {
            StagedValue::File { name, .. } => name,
            StagedValue::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    File,
    Text,
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentType::File => write!(f, "file"),
            ArgumentType::Text => write!(f, "text"),
        }
    }
}

/// Server-recognized reference to an uploaded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentInfo {
    pub index: u32,
    #[serde(rename = "type")]
    pub kind: ArgumentType,
    /// Object path for files, the literal for text.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Preprocessing,
    Preprocessed,
    Inferencing,
    Inferenced,
    Postprocessing,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::Preprocessing => "preprocessing",
            JobStatus::Preprocessed => "preprocessed",
            JobStatus::Inferencing => "inferencing",
            JobStatus::Inferenced => "inferenced",
            JobStatus::Postprocessing => "postprocessing",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Job progress as reported by the server: a fraction or free-form text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Progress {
    Fraction(f64),
    Text(String),
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Fraction(value) => write!(f, "{value}"),
            Progress::Text(text) => f.write_str(text),
        }
    }
}

/// Full job snapshot. Each poll replaces the held value wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: ResourceId,
    pub status: JobStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub progress: Option<Progress>,
    #[serde(default)]
    pub result_path: Option<String>,
    #[serde(default)]
    pub failed_log: Option<String>,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The result reference, if present and non-empty.
    pub fn result_ref(&self) -> Option<&str> {
        self.result_path.as_deref().filter(|path| !path.is_empty())
    }
}
