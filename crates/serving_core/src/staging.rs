use bytes::Bytes;
use serving_logging::serving_debug;

use crate::StagedValue;

/// Ordered, append-only list of values waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputStaging {
    values: Vec<StagedValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The value was appended; carries the new list length.
    Staged(usize),
    /// Empty text is ignored.
    IgnoredEmptyText,
}

impl InputStaging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_file(&mut self, payload: impl Into<Bytes>, name: impl Into<String>) -> StageOutcome {
        self.values.push(StagedValue::File {
            name: name.into(),
            payload: payload.into(),
        });
        StageOutcome::Staged(self.values.len())
    }

    pub fn stage_text(&mut self, text: impl Into<String>) -> StageOutcome {
        let text = text.into();
        if text.is_empty() {
            serving_debug!("Text empty; nothing staged");
            return StageOutcome::IgnoredEmptyText;
        }
        self.values.push(StagedValue::Text(text));
        StageOutcome::Staged(self.values.len())
    }

    pub fn values(&self) -> &[StagedValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
