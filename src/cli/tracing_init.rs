//! Tracing/logging initialization for the CLI.
//!
//! Level comes from `-v` flags, else `APERTURE_OAS_LOG` (any `EnvFilter`
//! directive, e.g. `aperture_oas::resolver=debug`), else `warn`. Output is
//! text or JSON per `APERTURE_OAS_LOG_FORMAT` and goes to stderr unless
//! `APERTURE_OAS_LOG_FILE` names a file to append to.

use crate::constants::{ENV_LOG, ENV_LOG_FILE, ENV_LOG_FORMAT};
use std::fs::{File, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

/// Log writer: the configured file, or stderr.
struct LogWriter {
    file: Option<Mutex<File>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogWriter {
    type Writer = Box<dyn std::io::Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        self.file
            .as_ref()
            .and_then(|mutex| mutex.lock().ok())
            .and_then(|file| file.try_clone().ok())
            .map_or_else(
                || Box::new(std::io::stderr()) as Self::Writer,
                |cloned| Box::new(cloned) as Self::Writer,
            )
    }
}

fn directive(verbosity: u8, from_env: Option<String>) -> String {
    match verbosity {
        0 => from_env.unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn log_format(raw: Option<&str>) -> Result<LogFormat, String> {
    match raw.map(str::to_lowercase).as_deref() {
        None | Some("text") => Ok(LogFormat::Text),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(other.to_string()),
    }
}

fn log_writer(path: Option<String>) -> LogWriter {
    let Some(path) = path else {
        return LogWriter { file: None };
    };
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => LogWriter {
            file: Some(Mutex::new(file)),
        },
        Err(e) => {
            // Tracing is not yet initialized; eprintln! is the only output channel available.
            eprintln!("Warning: Could not open log file '{path}': {e}. Using stderr.");
            LogWriter { file: None }
        }
    }
}

/// Initialize tracing-subscriber for document loading and resolution logs.
pub fn init_tracing(verbosity: u8) {
    let directive = directive(verbosity, std::env::var(ENV_LOG).ok());
    let env_filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let format_var = std::env::var(ENV_LOG_FORMAT).ok();
    let format = log_format(format_var.as_deref()).unwrap_or_else(|other| {
        eprintln!(
            "Warning: Unrecognized {ENV_LOG_FORMAT} '{other}'. Valid values: 'json', 'text'. Using 'text'."
        );
        LogFormat::Text
    });
    let writer = log_writer(std::env::var(ENV_LOG_FILE).ok());

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_span_list(false)
                .with_target(true)
                .with_line_number(true)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .init();
        }
        LogFormat::Text => {
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_environment() {
        assert_eq!(directive(0, None), "warn");
        assert_eq!(
            directive(0, Some("aperture_oas::resolver=debug".to_string())),
            "aperture_oas::resolver=debug"
        );
        assert_eq!(directive(1, Some("error".to_string())), "debug");
        assert_eq!(directive(3, None), "trace");
    }

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(log_format(None), Ok(LogFormat::Text));
        assert_eq!(log_format(Some("JSON")), Ok(LogFormat::Json));
        assert_eq!(log_format(Some("xml")), Err("xml".to_string()));
    }
}
