use crate::config::models::ResolverConfig;
use crate::constants::ENV_CONFIG;
use crate::error::Error;
use crate::fetch::{Fetch, FsFetcher, HttpFetcher, SchemeFetcher};
use crate::fs::{FileSystem, OsFileSystem};
use crate::resolver::ResolveOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Longest accepted fetch timeout (1 hour).
const MAX_FETCH_TIMEOUT_SECS: u64 = 3600;

/// Loads and applies [`ResolverConfig`].
pub struct ConfigManager<F: FileSystem> {
    fs: F,
}

impl Default for ConfigManager<OsFileSystem> {
    fn default() -> Self {
        Self { fs: OsFileSystem }
    }
}

impl<F: FileSystem> ConfigManager<F> {
    pub const fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    /// Loads the configuration from `path`, else from the file named by
    /// `APERTURE_OAS_CONFIG`, else the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a named file cannot be read, does not parse, or
    /// holds out-of-range values.
    pub fn load(&self, path: Option<&Path>) -> Result<ResolverConfig, Error> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));
        let Some(path) = path else {
            return Ok(ResolverConfig::default());
        };
        debug!(target: "aperture_oas::config", path = %path.display(), "loading configuration");
        if !self.fs.is_file(&path) {
            return Err(Error::Config(format!(
                "configuration file '{}' does not exist",
                path.display()
            )));
        }
        let content = self.fs.read_to_string(&path)?;
        let config = parse_config(&content)?;
        Ok(config)
    }
}

/// Parses and validates TOML configuration text.
///
/// # Errors
///
/// Returns an error if the text does not parse or a value is out of range.
pub fn parse_config(content: &str) -> Result<ResolverConfig, Error> {
    let config: ResolverConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// # Errors
///
/// Returns [`Error::Config`] naming the first out-of-range value.
pub fn validate(config: &ResolverConfig) -> Result<(), Error> {
    if !(1..=MAX_FETCH_TIMEOUT_SECS).contains(&config.fetch_timeout_secs) {
        return Err(Error::Config(format!(
            "fetch_timeout_secs must be between 1 and {MAX_FETCH_TIMEOUT_SECS}, got {}",
            config.fetch_timeout_secs
        )));
    }
    if config.max_concurrency == 0 {
        return Err(Error::Config("max_concurrency must be at least 1".to_string()));
    }
    Ok(())
}

impl ResolverConfig {
    /// Builds resolver options: a rooted file fetcher when `fetch_root` is set,
    /// otherwise local files plus HTTP(S), and no fetcher at all when remote
    /// resolution is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn to_resolve_options(&self) -> Result<ResolveOptions, Error> {
        let fetcher: Option<Arc<dyn Fetch>> = if !self.allow_remote {
            None
        } else if let Some(root) = &self.fetch_root {
            Some(Arc::new(FsFetcher::rooted(OsFileSystem, root.clone())))
        } else {
            let http = HttpFetcher::new(Duration::from_secs(self.fetch_timeout_secs))?;
            Some(Arc::new(SchemeFetcher::new(
                Arc::new(FsFetcher::local()),
                Arc::new(http),
            )))
        };
        Ok(ResolveOptions {
            fetcher,
            max_concurrency: self.max_concurrency,
            max_reference_depth: self.max_reference_depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;

    struct MemoryFs(HashMap<PathBuf, String>);

    impl FileSystem for MemoryFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
        }

        fn is_file(&self, path: &Path) -> bool {
            self.0.contains_key(path)
        }

        fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
            Ok(path.to_path_buf())
        }
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let config = parse_config("allow_remote = false\nmax_concurrency = 2\n").unwrap();
        assert!(!config.allow_remote);
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.max_reference_depth, 10);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            parse_config("fetch_timeout_secs = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_config("max_concurrency = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(parse_config("retries = 3"), Err(Error::Toml(_))));
    }

    #[test]
    fn loads_from_explicit_path() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("/etc/aperture-oas/config.toml"),
            "fetch_root = \"/srv/specs\"\n".to_string(),
        );
        let manager = ConfigManager::with_fs(MemoryFs(files));
        let config = manager
            .load(Some(Path::new("/etc/aperture-oas/config.toml")))
            .unwrap();
        assert_eq!(config.fetch_root, Some(PathBuf::from("/srv/specs")));
        assert!(manager.load(Some(Path::new("/missing.toml"))).is_err());
    }

    #[test]
    fn disabling_remote_drops_the_fetcher() {
        let config = ResolverConfig {
            allow_remote: false,
            ..ResolverConfig::default()
        };
        let options = config.to_resolve_options().unwrap();
        assert!(options.fetcher.is_none());
        assert_eq!(options.max_concurrency, 8);
    }
}
