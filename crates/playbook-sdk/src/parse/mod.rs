use crate::documents::PlaybookDocument;
use playbook_core::{FieldPath, StructuredIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Auto,
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Picks a format from a file extension, falling back to `Auto`.
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some("json") => Self::Json,
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Auto,
        }
    }
}

pub fn parse_playbook(input: &str) -> Result<PlaybookDocument, Vec<StructuredIssue>> {
    parse_playbook_with_format(input, DocumentFormat::Auto)
}

pub fn parse_playbook_with_format(
    input: &str,
    format: DocumentFormat,
) -> Result<PlaybookDocument, Vec<StructuredIssue>> {
    let format = match format {
        DocumentFormat::Auto if looks_like_json(input) => DocumentFormat::Json,
        DocumentFormat::Auto => DocumentFormat::Yaml,
        other => other,
    };

    match format {
        DocumentFormat::Json => serde_json::from_str::<PlaybookDocument>(input)
            .map_err(|err| vec![parse_issue(format!("json parse failed: {err}"), "json.parse_error")]),
        _ => serde_yaml::from_str::<PlaybookDocument>(input)
            .map_err(|err| vec![parse_issue(format!("yaml parse failed: {err}"), "yaml.parse_error")]),
    }
}

fn looks_like_json(input: &str) -> bool {
    let trimmed = input.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

fn parse_issue(message: String, reference: &str) -> StructuredIssue {
    StructuredIssue::error("parse_error", FieldPath::root(), message, reference)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
