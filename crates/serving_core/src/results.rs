use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResultEntry {
    InFlight,
    Ready(String),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultLookup {
    Cached(String),
    /// A fetch for this path is already running.
    Pending,
    /// The last attempt failed; only an explicit retry fetches again.
    Failed,
    /// Caller must fetch now; the path is marked in flight.
    Fetch,
}

/// Result payloads keyed by `result_path`, fetched at most once each.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultCache {
    entries: HashMap<String, ResultEntry>,
}

impl ResultCache {
    pub fn request(&mut self, path: &str) -> ResultLookup {
        match self.entries.get(path) {
            Some(ResultEntry::Ready(text)) => ResultLookup::Cached(text.clone()),
            Some(ResultEntry::InFlight) => ResultLookup::Pending,
            Some(ResultEntry::Failed) => ResultLookup::Failed,
            None => {
                self.entries.insert(path.to_string(), ResultEntry::InFlight);
                ResultLookup::Fetch
            }
        }
    }

    /// Re-arms a failed path. Returns true when a fetch should be issued.
    pub fn retry(&mut self, path: &str) -> bool {
        match self.entries.get_mut(path) {
            Some(entry) if *entry == ResultEntry::Failed => {
                *entry = ResultEntry::InFlight;
                true
            }
            _ => false,
        }
    }

    pub fn complete(&mut self, path: &str, text: String) {
        self.entries.insert(path.to_string(), ResultEntry::Ready(text));
    }

    pub fn fail(&mut self, path: &str) {
        if let Some(entry) = self.entries.get_mut(path) {
            if *entry == ResultEntry::InFlight {
                *entry = ResultEntry::Failed;
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        match self.entries.get(path) {
            Some(ResultEntry::Ready(text)) => Some(text),
            _ => None,
        }
    }
}
