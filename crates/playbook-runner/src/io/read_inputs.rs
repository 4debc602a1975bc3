use crate::run::RunnerError;
use playbook_core::Value;
use playbook_sdk::{parse_playbook_with_format, DocumentFormat, PlaybookDocument};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Alert values may be strings, lists of strings, or plain JSON scalars.
#[derive(Deserialize)]
#[serde(untagged)]
enum AlertValue {
    Value(Value),
    Number(serde_json::Number),
    Bool(bool),
}

impl From<AlertValue> for Value {
    fn from(value: AlertValue) -> Self {
        match value {
            AlertValue::Value(value) => value,
            AlertValue::Number(number) => Value::Scalar(number.to_string()),
            AlertValue::Bool(flag) => Value::Scalar(flag.to_string()),
        }
    }
}

/// Reads the seed values for `@alert:` references from a JSON object.
pub fn read_alert_data(path: &Path) -> Result<BTreeMap<String, Value>, RunnerError> {
    let text = read_text(path)?;
    let raw = serde_json::from_str::<BTreeMap<String, AlertValue>>(text.as_str())
        .map_err(|error| RunnerError::AlertDataParse(error.to_string()))?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, Value::from(value)))
        .collect())
}

pub fn read_playbook_document(path: &Path) -> Result<PlaybookDocument, RunnerError> {
    let text = read_text(path)?;
    let format = DocumentFormat::from_extension(path.extension().and_then(|ext| ext.to_str()));
    parse_playbook_with_format(text.as_str(), format).map_err(RunnerError::PlaybookParse)
}

pub fn write_result_file(path: &Path, content: &str) -> Result<(), RunnerError> {
    let write_error = |source| RunnerError::WriteFile {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, content).map_err(write_error)
}

fn read_text(path: &Path) -> Result<String, RunnerError> {
    fs::read_to_string(path).map_err(|source| RunnerError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "read_inputs_test.rs"]
mod tests;
