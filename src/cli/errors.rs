//! Error display for the CLI: a heading, the detail, and an optional hint.

use crate::constants;
use crate::error::Error;
use std::io::ErrorKind;

/// Writes `error` to stderr, as structured JSON when `json_format` is set.
pub fn print_error_with_json(error: &Error, json_format: bool) {
    if json_format {
        if let Ok(json_output) = serde_json::to_string_pretty(&error.to_json()) {
            eprintln!("{json_output}");
            return;
        }
    }
    print_error(error);
}

/// Writes a human-readable rendering of `error` to stderr.
pub fn print_error(error: &Error) {
    let (heading, hint) = heading_and_hint(error);
    let detail = detail(error);
    match hint {
        Some(hint) => eprintln!("{heading}\n{detail}\n\nHint: {hint}"),
        None => eprintln!("{heading}\n{detail}"),
    }
}

fn heading_and_hint(error: &Error) -> (&'static str, Option<&'static str>) {
    match error {
        Error::Io(e) => match e.kind() {
            ErrorKind::NotFound => ("File Not Found", Some(constants::ERR_FILE_NOT_FOUND)),
            ErrorKind::PermissionDenied => ("Permission Denied", Some(constants::ERR_PERMISSION)),
            _ => ("File System Error", None),
        },
        Error::Network(e) if e.is_connect() => ("Connection Error", Some(constants::ERR_CONNECTION)),
        Error::Network(e) if e.is_timeout() => ("Timeout Error", Some(constants::ERR_TIMEOUT)),
        Error::Network(_) => ("Network Error", None),
        Error::Yaml(_) => ("YAML Parsing Error", Some(constants::ERR_YAML_SYNTAX)),
        Error::Json(_) => ("JSON Parsing Error", Some(constants::ERR_JSON_SYNTAX)),
        Error::Toml(_) => ("TOML Parsing Error", Some(constants::ERR_TOML_SYNTAX)),
        Error::Parse { .. } => ("Invalid Document", Some(constants::ERR_OPENAPI_FORMAT)),
        Error::Reference { .. } => ("Reference Error", Some(constants::ERR_REFERENCE)),
        Error::Unsupported { .. } => ("Unsupported Lookup", None),
        Error::Schema(_) => ("Schema Error", None),
        Error::Config(_) => ("Configuration Error", None),
    }
}

fn detail(error: &Error) -> String {
    match error {
        Error::Io(e) => e.to_string(),
        Error::Network(e) => e.to_string(),
        Error::Yaml(e) => e.to_string(),
        Error::Json(e) => e.to_string(),
        Error::Toml(e) => e.to_string(),
        Error::Parse { path, message } => format!("{message} (at '{path}')"),
        Error::Reference { uri, reason } => format!("{uri}: {reason}"),
        Error::Unsupported { pointer, reason } => format!("{pointer}: {reason}"),
        Error::Schema(msg) | Error::Config(msg) => msg.clone(),
    }
}
