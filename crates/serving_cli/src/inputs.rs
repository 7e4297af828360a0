use std::path::{Path, PathBuf};

use anyhow::Context;
use bytes::Bytes;
use serving_core::{Msg, ResourceId};

/// One positional `run` argument after prefix handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputArg {
    File(PathBuf),
    Text(String),
}

/// `@path` stages a file, `@@rest` stages the literal `@rest`, anything
/// else is text.
pub fn parse_input(raw: &str) -> InputArg {
    match raw.strip_prefix('@') {
        Some(rest) if rest.starts_with('@') => InputArg::Text(rest.to_string()),
        Some(path) => InputArg::File(PathBuf::from(path)),
        None => InputArg::Text(raw.to_string()),
    }
}

/// Reads every input into the staging message it produces, preserving order.
pub async fn load_inputs(raw: &[String]) -> anyhow::Result<Vec<Msg>> {
    let mut messages = Vec::with_capacity(raw.len());
    for input in raw {
        let msg = match parse_input(input) {
            InputArg::Text(text) => Msg::TextStaged(text),
            InputArg::File(path) => {
                let payload = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("failed to read input file {}", path.display()))?;
                Msg::FileStaged {
                    name: file_name(&path),
                    payload: Bytes::from(payload),
                }
            }
        };
        messages.push(msg);
    }
    Ok(messages)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Numeric ids are sent as integers, anything else as a string.
pub fn parse_resource_id(raw: &str) -> ResourceId {
    raw.parse::<i64>()
        .map(ResourceId::Int)
        .unwrap_or_else(|_| ResourceId::Str(raw.to_string()))
}
