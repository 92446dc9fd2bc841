//! Centralized string constants for aperture-oas
//!
//! This module contains commonly used string literals to:
//! - Reduce string duplication
//! - Keep OpenAPI key spellings in one place
//! - Ensure consistency across the codebase

// Accepted `openapi` version strings
pub const SUPPORTED_VERSIONS: &[&str] = &["3.0.0", "3.0.1", "3.0.2", "3.0.3", "3.1.0"];

// Synthetic base URI prefix for documents loaded without one
pub const DEFAULT_BASE_URI_PREFIX: &str = "https://aperture.invalid/openapi/";

// Reference keys
pub const KEY_REF: &str = "$ref";
pub const KEY_SUMMARY: &str = "summary";
pub const KEY_DESCRIPTION: &str = "description";
pub const KEY_SCHEMA_ID: &str = "$id";

// Vendor extension prefix
pub const EXTENSION_PREFIX: &str = "x-";

// Path item operation keys, in OpenAPI declaration order
pub const HTTP_METHOD_GET: &str = "get";
pub const HTTP_METHOD_PUT: &str = "put";
pub const HTTP_METHOD_POST: &str = "post";
pub const HTTP_METHOD_DELETE: &str = "delete";
pub const HTTP_METHOD_OPTIONS: &str = "options";
pub const HTTP_METHOD_HEAD: &str = "head";
pub const HTTP_METHOD_PATCH: &str = "patch";
pub const HTTP_METHOD_TRACE: &str = "trace";

// Parameter Locations
pub const PARAM_LOCATION_PATH: &str = "path";
pub const PARAM_LOCATION_QUERY: &str = "query";
pub const PARAM_LOCATION_HEADER: &str = "header";
pub const PARAM_LOCATION_COOKIE: &str = "cookie";

// Top-level document keys
pub const FIELD_PATHS: &str = "paths";
pub const FIELD_WEBHOOKS: &str = "webhooks";
pub const FIELD_COMPONENTS: &str = "components";

// OpenAPI Component Names
pub const COMPONENT_SCHEMAS: &str = "schemas";
pub const COMPONENT_RESPONSES: &str = "responses";
pub const COMPONENT_PARAMETERS: &str = "parameters";
pub const COMPONENT_EXAMPLES: &str = "examples";
pub const COMPONENT_REQUEST_BODIES: &str = "requestBodies";
pub const COMPONENT_HEADERS: &str = "headers";
pub const COMPONENT_SECURITY_SCHEMES: &str = "securitySchemes";
pub const COMPONENT_LINKS: &str = "links";
pub const COMPONENT_CALLBACKS: &str = "callbacks";
pub const COMPONENT_PATH_ITEMS: &str = "pathItems";

// Environment Variables
pub const ENV_CONFIG: &str = "APERTURE_OAS_CONFIG";
pub const ENV_LOG: &str = "APERTURE_OAS_LOG";
pub const ENV_LOG_FORMAT: &str = "APERTURE_OAS_LOG_FORMAT";
pub const ENV_LOG_FILE: &str = "APERTURE_OAS_LOG_FILE";

// Error Context Messages
pub const ERR_FILE_NOT_FOUND: &str = "Check that the file path is correct and the file exists.";
pub const ERR_PERMISSION: &str = "Check file permissions or run with appropriate privileges.";
pub const ERR_CONNECTION: &str = "Check that the referenced document host is reachable.";
pub const ERR_TIMEOUT: &str = "The document host may be slow. Raise fetch_timeout_secs or retry.";
pub const ERR_YAML_SYNTAX: &str = "Check that your OpenAPI document is valid YAML syntax.";
pub const ERR_JSON_SYNTAX: &str = "Check that your OpenAPI document is valid JSON syntax.";
pub const ERR_TOML_SYNTAX: &str = "Check that your configuration file is valid TOML syntax.";
pub const ERR_OPENAPI_FORMAT: &str =
    "Check that the document follows the OpenAPI 3.0/3.1 object shapes.";
pub const ERR_REFERENCE: &str =
    "Check the $ref target, or pass --no-remote only for self-contained documents.";

/// Check if a key is a vendor extension (`x-` prefixed)
#[must_use]
pub fn is_extension_key(key: &str) -> bool {
    key.starts_with(EXTENSION_PREFIX)
}

/// Check if a version string is one of the accepted OpenAPI versions
#[must_use]
pub fn is_supported_version(version: &str) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}
