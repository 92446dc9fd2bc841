use crate::constants;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Structural problem in the document: wrong type, missing or unexpected key,
    /// invalid enum value, URI, version string or `$ref` fragment.
    #[error("Invalid document at '{path}': {message}")]
    Parse { path: String, message: String },
    /// A `$ref` could not be resolved and resolution cannot continue.
    #[error("Cannot resolve reference '{uri}': {reason}")]
    Reference { uri: String, reason: String },
    /// The location exists but addressing into it is not supported.
    #[error("Unsupported lookup at '{pointer}': {reason}")]
    Unsupported { pointer: String, reason: String },
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// JSON representation of an error for structured output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub error_type: String,
    pub message: String,
    pub context: Option<String>,
}

impl Error {
    /// Creates a structural parse error at the given JSON Pointer location.
    pub fn parse_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a reference-resolution fault for the given target URI.
    pub fn reference_error(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reference {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for structural parse errors.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Returns true for the "cannot look there yet" addressing gap.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Convert error to JSON representation for structured output
    #[must_use]
    pub fn to_json(&self) -> JsonError {
        let (error_type, message, context) = match self {
            Self::Config(msg) => ("Configuration", msg.clone(), None),
            Self::Io(io_err) => {
                let context = match io_err.kind() {
                    std::io::ErrorKind::NotFound => {
                        Some(constants::ERR_FILE_NOT_FOUND)
                    }
                    std::io::ErrorKind::PermissionDenied => {
                        Some(constants::ERR_PERMISSION)
                    }
                    _ => None,
                };
                ("FileSystem", io_err.to_string(), context.map(str::to_string))
            }
            Self::Network(req_err) => {
                let context = if req_err.is_connect() {
                    Some(constants::ERR_CONNECTION)
                } else if req_err.is_timeout() {
                    Some(constants::ERR_TIMEOUT)
                } else {
                    None
                };
                ("Network", req_err.to_string(), context.map(str::to_string))
            }
            Self::Yaml(yaml_err) => (
                "YAMLParsing",
                yaml_err.to_string(),
                Some(constants::ERR_YAML_SYNTAX.to_string()),
            ),
            Self::Json(json_err) => (
                "JSONParsing",
                json_err.to_string(),
                Some(constants::ERR_JSON_SYNTAX.to_string()),
            ),
            Self::Toml(toml_err) => (
                "TOMLParsing",
                toml_err.to_string(),
                Some(constants::ERR_TOML_SYNTAX.to_string()),
            ),
            Self::Parse { path, message } => (
                "Structure",
                format!("{message} (at '{path}')"),
                Some(constants::ERR_OPENAPI_FORMAT.to_string()),
            ),
            Self::Reference { uri, reason } => (
                "Reference",
                format!("{uri}: {reason}"),
                Some(constants::ERR_REFERENCE.to_string()),
            ),
            Self::Unsupported { pointer, reason } => {
                ("Unsupported", format!("{pointer}: {reason}"), None)
            }
            Self::Schema(msg) => ("Schema", msg.clone(), None),
        };

        JsonError {
            error_type: error_type.to_string(),
            message,
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_path() {
        let err = Error::parse_error("/info/title", "expected a string");
        assert!(err.is_parse());
        assert_eq!(
            err.to_string(),
            "Invalid document at '/info/title': expected a string"
        );
    }

    #[test]
    fn unsupported_is_distinguishable() {
        let err = Error::unsupported("/components/schemas/a/properties", "inside a schema");
        assert!(err.is_unsupported());
        assert!(!err.is_parse());
        assert_eq!(err.to_json().error_type, "Unsupported");
    }

    #[test]
    fn reference_error_json_names_uri() {
        let err = Error::reference_error("http://localhost/x.json#/a", "fetching is disabled");
        let json = err.to_json();
        assert_eq!(json.error_type, "Reference");
        assert!(json.message.contains("http://localhost/x.json#/a"));
    }

    #[test]
    fn io_not_found_has_hint() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        let json = err.to_json();
        assert_eq!(json.error_type, "FileSystem");
        assert_eq!(json.message, "gone");
        assert!(json.context.is_some());
    }
}
