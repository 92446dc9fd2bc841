use crate::cli::OutputFormat;
use crate::error::Error;
use crate::fs::{FileSystem, OsFileSystem};
use crate::lookup::Node;
use crate::model::{Document, Schema};
use crate::pointer::JsonPointer;
use crate::resolver::{InitializeReport, ResolveOptions, SchemaRegistry};
use crate::spec::{load_document, parse_content, to_yaml_string};
use serde_json::Value;
use std::path::Path;

fn render(value: &Value, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => to_yaml_string(value),
    }
}

async fn load_initialized(
    path: &Path,
    options: &ResolveOptions,
) -> Result<(Document, SchemaRegistry, InitializeReport), Error> {
    let mut document = load_document(&OsFileSystem, path)?;
    let mut registry = SchemaRegistry::new();
    let report = document.initialize(&mut registry, options).await?;
    Ok((document, registry, report))
}

pub fn roundtrip(path: &Path, format: OutputFormat) -> Result<String, Error> {
    let document = load_document(&OsFileSystem, path)?;
    match format {
        OutputFormat::Json => document.to_json_string(),
        OutputFormat::Yaml => document.to_yaml_string(),
    }
}

pub async fn resolve(path: &Path, options: &ResolveOptions, strict: bool) -> Result<String, Error> {
    let (_, _, report) = load_initialized(path, options).await?;
    if strict {
        if let Some(first) = report.unresolved.first() {
            return Err(Error::reference_error(
                first.target.clone(),
                format!(
                    "unresolved at '{}': {} ({} unresolved in total)",
                    first.location,
                    first.reason,
                    report.unresolved.len()
                ),
            ));
        }
    }
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Prints the node at `pointer`, or `null` when nothing is there.
pub async fn find(
    path: &Path,
    pointer: &str,
    format: OutputFormat,
    options: &ResolveOptions,
) -> Result<String, Error> {
    let pointer = JsonPointer::parse(pointer)?;
    let (document, _, _) = load_initialized(path, options).await?;
    let found = document.find::<Node>(&pointer)?;
    render(&found.map_or(Value::Null, |node| node.to_value()), format)
}

pub async fn validate(
    path: &Path,
    pointer: &str,
    instance: &Path,
    options: &ResolveOptions,
) -> Result<String, Error> {
    let pointer = JsonPointer::parse(pointer)?;
    let (document, registry, _) = load_initialized(path, options).await?;
    let Some(schema) = document.find::<Schema>(&pointer)? else {
        return Err(Error::Schema(format!("no schema at '{pointer}'")));
    };
    let validator = schema.validator(&registry)?;
    let instance = parse_content(&OsFileSystem.read_to_string(instance)?)?;
    let errors: Vec<String> = validator
        .iter_errors(&instance)
        .map(|e| e.to_string())
        .collect();
    if errors.is_empty() {
        Ok("valid".to_string())
    } else {
        Err(Error::Schema(format!("instance is invalid: {}", errors.join("; "))))
    }
}
