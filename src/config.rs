//! Optional `config.toml` in the data directory.
//!
//! ```toml
//! max_installations = 2
//! log_level = "warn"
//! default_installation = "production"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// How many installations may coexist.
    pub max_installations: usize,
    /// Fallback tracing filter when `PT_LOG` is unset.
    pub log_level: String,
    /// Installation used when a command is given `-` as the installation.
    pub default_installation: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_installations: 2,
            log_level: "warn".to_string(),
            default_installation: None,
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load `path`; a missing file yields defaults, a malformed one is reported and
    /// replaced by defaults.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Config::default(),
        };
        match Config::parse(&text) {
            Ok(config) => config,
            Err(e) => {
                // Logging is not initialised yet when the config is first read.
                eprintln!("Ignoring malformed config {}: {e}", path.display());
                Config::default()
            }
        }
    }

    /// Substitute the configured default for the `-` placeholder.
    pub fn installation<'a>(&'a self, arg: &'a str) -> &'a str {
        match (arg, &self.default_installation) {
            ("-", Some(default)) => default.as_str(),
            ("-", None) => {
                warn!("'-' given but no default_installation is configured");
                arg
            }
            _ => arg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse("max_installations = 3\n").unwrap();
        assert_eq!(config.max_installations, 3);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.default_installation, None);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::parse("max_instalations = 3\n").is_err());
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load(&dir.path().join("config.toml")), Config::default());
        let path = dir.path().join("bad.toml");
        fs::write(&path, "max_installations = \"two\"").unwrap();
        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn test_default_installation_placeholder() {
        let config = Config { default_installation: Some("production".into()), ..Config::default() };
        assert_eq!(config.installation("-"), "production");
        assert_eq!(config.installation("staging"), "staging");
        assert_eq!(Config::default().installation("-"), "-");
    }
}
