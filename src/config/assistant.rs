use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug)]
pub enum SpecError {
    MissingModel,
    UnknownTool(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::MissingModel => write!(f, "Assistant definition is missing a model"),
            SpecError::UnknownTool(name) => write!(f, "Unknown assistant tool '{}'", name),
            SpecError::IoError(e) => write!(f, "Assistant definition IO error: {}", e),
            SpecError::JsonError(e) => write!(f, "Assistant definition JSON parsing error: {}", e),
        }
    }
}

impl Error for SpecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SpecError::IoError(e) => Some(e),
            SpecError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SpecError {
    fn from(err: std::io::Error) -> Self {
        SpecError::IoError(err)
    }
}

impl From<serde_json::Error> for SpecError {
    fn from(err: serde_json::Error) -> Self {
        SpecError::JsonError(err)
    }
}

/// Capabilities the remote service can enable on an assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantTool {
    CodeInterpreter,
    Retrieval,
}

impl AssistantTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistantTool::CodeInterpreter => "code_interpreter",
            AssistantTool::Retrieval => "retrieval",
        }
    }
}

impl FromStr for AssistantTool {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "code_interpreter" => Ok(AssistantTool::CodeInterpreter),
            "retrieval" => Ok(AssistantTool::Retrieval),
            _ => Err(SpecError::UnknownTool(s.to_string())),
        }
    }
}

/// Local definition of an assistant persona, sent to the remote service
/// when creating one. Loadable from a JSON file via `load_spec_from_file`
/// or assembled from CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSpec {
    pub model: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<AssistantTool>,
    #[serde(default)]
    pub file_ids: Vec<String>,
}

impl AssistantSpec {
    fn validate(&self) -> Result<(), SpecError> {
        if self.model.trim().is_empty() {
            return Err(SpecError::MissingModel);
        }
        Ok(())
    }
}

pub fn load_spec_from_str(json_str: &str) -> Result<AssistantSpec, SpecError> {
    let spec: AssistantSpec = serde_json::from_str(json_str)?;
    spec.validate()?;
    Ok(spec)
}

pub fn load_spec_from_file(path: &Path) -> Result<AssistantSpec, SpecError> {
    let json_str = fs::read_to_string(path)?;
    load_spec_from_str(&json_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_full_definition() {
        let spec = load_spec_from_str(
            r#"{
                "model": "gpt-4o",
                "name": "Paper reader",
                "instructions": "Answer questions about the uploaded paper.",
                "tools": ["retrieval"],
                "file_ids": ["file-abc123"]
            }"#,
        )
        .unwrap();
        assert_eq!(spec.model, "gpt-4o");
        assert_eq!(spec.name.as_deref(), Some("Paper reader"));
        assert_eq!(spec.tools, vec![AssistantTool::Retrieval]);
        assert_eq!(spec.file_ids, vec!["file-abc123".to_string()]);
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let spec = load_spec_from_str(r#"{"model": "gpt-4o"}"#).unwrap();
        assert!(spec.name.is_none());
        assert!(spec.instructions.is_none());
        assert!(spec.tools.is_empty());
        assert!(spec.file_ids.is_empty());
    }

    #[test]
    fn blank_model_is_rejected() {
        let err = load_spec_from_str(r#"{"model": "  "}"#).unwrap_err();
        assert!(matches!(err, SpecError::MissingModel));
    }

    #[test]
    fn unknown_tool_name_is_rejected() {
        let err = "web_browsing".parse::<AssistantTool>().unwrap_err();
        assert!(matches!(err, SpecError::UnknownTool(name) if name == "web_browsing"));
    }
}
