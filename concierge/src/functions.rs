//! Function schema for the booking action group.
//!
//! The schema lists the functions the agent may call on the action handler. It is read from a
//! required YAML file and passed to the provisioning request unchanged, except that the shape is
//! checked locally (typed deserialization plus [`FunctionSchema::validate`]) so a bad file fails
//! here, with its path, rather than later at the provisioning API.
//!
//! Accepted file shapes: a mapping with a `functions` list, or the bare list itself.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{require_document, Document, LoadError};

/// Parameter types understood by the managed agent service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
}

/// One parameter of a callable function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDetail {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Whether the agent asks the user before invoking the function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequireConfirmation {
    Enabled,
    Disabled,
}

/// One callable function exposed to the agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterDetail>,
    #[serde(
        default,
        alias = "require_confirmation",
        skip_serializing_if = "Option::is_none"
    )]
    pub require_confirmation: Option<RequireConfirmation>,
}

impl FunctionDefinition {
    /// Names of parameters marked `required`, in key order.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// The action-group function schema, serialized as `{"functions": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub functions: Vec<FunctionDefinition>,
}

impl FunctionSchema {
    /// Looks up a function by name.
    pub fn function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Checks what typed deserialization cannot: at least one function, non-empty and unique
    /// function names, non-empty parameter names.
    pub fn validate(&self) -> Result<(), String> {
        if self.functions.is_empty() {
            return Err("schema declares no functions".to_string());
        }
        let mut seen = HashSet::new();
        for (i, f) in self.functions.iter().enumerate() {
            if f.name.trim().is_empty() {
                return Err(format!("function #{} has an empty name", i));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(format!("duplicate function name `{}`", f.name));
            }
            if f.parameters.keys().any(|k| k.trim().is_empty()) {
                return Err(format!("function `{}` has an empty parameter name", f.name));
            }
        }
        Ok(())
    }
}

/// Deserializes each entry on its own so a shape error names the function it belongs to.
fn parse_functions(doc: Document) -> Result<FunctionSchema, String> {
    let entries = match doc {
        Document::Sequence(entries) => entries,
        Document::Mapping(mut map) => match map.remove("functions") {
            Some(Document::Sequence(entries)) => entries,
            Some(_) => return Err("`functions` must be a list".to_string()),
            None => return Err("expected a `functions` list".to_string()),
        },
        _ => return Err("expected a `functions` list or a list of functions".to_string()),
    };
    let functions = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let label = match entry.get("name").and_then(Document::as_str) {
                Some(name) => format!("function #{} `{}`", i, name),
                None => format!("function #{}", i),
            };
            serde_yaml::from_value(entry).map_err(|e| format!("{}: {}", label, e))
        })
        .collect::<Result<Vec<FunctionDefinition>, String>>()?;
    Ok(FunctionSchema { functions })
}

/// Loads the function schema at `path`. The file is required.
pub fn load_functions_schema(path: &Path) -> Result<FunctionSchema, LoadError> {
    let doc = require_document(path)?;
    let schema = parse_functions(doc)
        .and_then(|schema| schema.validate().map(|()| schema))
        .map_err(|message| LoadError::Invalid {
            path: path.display().to_string(),
            message,
        })?;
    tracing::debug!(path = %path.display(), functions = schema.functions.len(), "loaded function schema");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKING_FUNCTIONS: &str = r#"
functions:
  - name: create_booking
    description: Create a new table reservation.
    parameters:
      date:
        type: string
        description: Reservation date (YYYY-MM-DD).
        required: true
      num_guests:
        type: integer
        description: Number of guests.
        required: true
      name:
        type: string
        required: false
  - name: delete_booking
    description: Cancel an existing reservation.
    require_confirmation: ENABLED
    parameters:
      booking_id:
        type: string
        required: true
"#;

    fn write(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("functions.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_wrapped_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = load_functions_schema(&write(dir.path(), BOOKING_FUNCTIONS)).unwrap();
        assert_eq!(schema.functions.len(), 2);
        let create = schema.function("create_booking").unwrap();
        assert_eq!(create.required_parameters(), vec!["date", "num_guests"]);
        assert_eq!(create.parameters["num_guests"].kind, ParameterType::Integer);
        let delete = schema.function("delete_booking").unwrap();
        assert_eq!(delete.require_confirmation, Some(RequireConfirmation::Enabled));
    }

    #[test]
    fn loads_bare_list() {
        let dir = tempfile::tempdir().unwrap();
        let body = "- name: get_booking_details\n  parameters:\n    booking_id: {type: string, required: true}\n";
        let schema = load_functions_schema(&write(dir.path(), body)).unwrap();
        assert_eq!(schema.functions[0].name, "get_booking_details");
    }

    #[test]
    fn serializes_in_request_shape() {
        let dir = tempfile::tempdir().unwrap();
        let schema = load_functions_schema(&write(dir.path(), BOOKING_FUNCTIONS)).unwrap();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["functions"][0]["parameters"]["date"]["type"], "string");
        assert_eq!(json["functions"][1]["requireConfirmation"], "ENABLED");
        assert!(json["functions"][0].get("requireConfirmation").is_none());
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("functions.yaml");
        let err = load_functions_schema(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingRequired { .. }));
        assert!(err.to_string().contains("functions.yaml"));
    }

    #[test]
    fn unknown_parameter_type_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let body = "functions:\n  - name: f\n    parameters:\n      x: {type: date}\n";
        let err = load_functions_schema(&write(dir.path(), body)).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { .. }));
    }

    #[test]
    fn bad_parameter_type_names_function_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let body = "functions:\n  - name: create_booking\n    parameters:\n      date: {type: date, required: true}\n";
        let err = load_functions_schema(&write(dir.path(), body)).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { .. }));
        let msg = err.to_string();
        assert!(msg.contains("function #0 `create_booking`"), "{}", msg);
        assert!(msg.contains("date"), "{}", msg);
        assert!(msg.contains("unknown variant"), "{}", msg);
    }

    #[test]
    fn nameless_function_is_reported_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let body = "- name: get_booking_details\n- description: no name\n";
        let err = load_functions_schema(&write(dir.path(), body)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("function #1"), "{}", msg);
        assert!(msg.contains("name"), "{}", msg);
    }

    #[test]
    fn mapping_without_functions_key_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_functions_schema(&write(dir.path(), "tools: []\n")).unwrap_err();
        assert!(err.to_string().contains("`functions`"));
    }

    #[test]
    fn duplicate_names_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let body = "functions:\n  - name: f\n  - name: f\n";
        let err = load_functions_schema(&write(dir.path(), body)).unwrap_err();
        assert!(err.to_string().contains("duplicate function name `f`"));
    }

    #[test]
    fn empty_schema_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_functions_schema(&write(dir.path(), "functions: []\n")).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { .. }));
    }
}
