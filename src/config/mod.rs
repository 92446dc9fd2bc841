//! Resolver configuration: a small TOML file with optional overrides.

pub mod manager;
pub mod models;

pub use manager::{parse_config, validate, ConfigManager};
pub use models::ResolverConfig;
