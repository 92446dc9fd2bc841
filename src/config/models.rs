use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolver settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Follow `$ref`s into other documents.
    #[serde(default = "default_allow_remote")]
    pub allow_remote: bool,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_max_reference_depth")]
    pub max_reference_depth: usize,
    /// Serve every referenced document from this directory instead of
    /// fetching it, keeping only the URI path.
    #[serde(default)]
    pub fetch_root: Option<PathBuf>,
}

const fn default_allow_remote() -> bool {
    true
}

const fn default_fetch_timeout_secs() -> u64 {
    30
}

const fn default_max_concurrency() -> usize {
    crate::resolver::DEFAULT_MAX_CONCURRENCY
}

const fn default_max_reference_depth() -> usize {
    crate::resolver::DEFAULT_MAX_REFERENCE_DEPTH
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            allow_remote: default_allow_remote(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            max_reference_depth: default_max_reference_depth(),
            fetch_root: None,
        }
    }
}
