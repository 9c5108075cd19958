//! Configuration management
//!
//! Loaded from a YAML file; every field has a default so an absent file or a
//! partial one both work.

use super::pulp_cli::PulpCli;
use super::store::StoreCommands;
use crate::executor::{DEFAULT_TOOL_PATH, ShellConfig};
use crate::pipeline::{Policy, Validate, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

static RESOURCE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("static pattern"));

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid YAML for [`Config`]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The values are inconsistent
    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Throwaway configuration provisioned by the smoke test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeTestConfig {
    /// Name of the remote and repository
    pub name: String,
    /// Download policy of the remote
    pub policy: Policy,
    /// Packages the remote includes
    pub packages: Vec<String>,
}

impl Default for SmokeTestConfig {
    fn default() -> Self {
        Self {
            name: "manual_test".to_string(),
            policy: Policy::Immediate,
            packages: vec!["ctc".to_string()],
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level
    pub log_level: String,
    /// Echo captured command output
    pub verbose: bool,
    /// Shell command lines are handed to
    pub shell: String,
    /// Directory prepended to `PATH`
    pub tool_path: PathBuf,
    /// Tool command lines
    pub cli: PulpCli,
    /// Prefix of provisioned resource names
    pub name_prefix: String,
    /// Store clearing commands
    pub store: StoreCommands,
    /// Packages to provision per policy
    pub policies: BTreeMap<Policy, Vec<String>>,
    /// Smoke test settings
    pub smoke_test: SmokeTestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            verbose: true,
            shell: "bash".to_string(),
            tool_path: PathBuf::from(DEFAULT_TOOL_PATH),
            cli: PulpCli::default(),
            name_prefix: "pypi".to_string(),
            store: StoreCommands::default(),
            policies: BTreeMap::from([(Policy::Immediate, vec!["ctc".to_string()])]),
            smoke_test: SmokeTestConfig::default(),
        }
    }
}

impl Config {
    /// Parses and validates YAML
    ///
    /// # Errors
    ///
    /// `Parse` for malformed YAML, `Invalid` for values that fail validation.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, or the defaults when no path is given
    ///
    /// # Errors
    ///
    /// See [`Config::from_yaml_str`]; `Io` if the file cannot be read.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Name of the resources provisioned for `policy`
    #[must_use]
    pub fn resource_name(&self, policy: Policy) -> String {
        format!("{}_{policy}", self.name_prefix)
    }

    /// Shell settings for the runner
    #[must_use]
    pub fn shell_config(&self) -> ShellConfig {
        ShellConfig {
            shell: self.shell.clone(),
            tool_path: self.tool_path.clone(),
        }
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !RESOURCE_NAME.is_match(name) {
        return Err(ValidationError::InvalidNameChars {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn validate_packages(policy: Policy, packages: &[String]) -> Result<(), ValidationError> {
    if packages.is_empty() || packages.iter().any(|package| package.trim().is_empty()) {
        return Err(ValidationError::EmptyPackages {
            policy: policy.to_string(),
        });
    }
    Ok(())
}

impl Validate for Config {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        validate_name(&self.name_prefix)?;
        validate_name(&self.smoke_test.name)?;

        std::env::join_paths([&self.tool_path]).map_err(|_| ValidationError::InvalidToolPath {
            path: self.tool_path.display().to_string(),
        })?;

        url::Url::parse(&self.cli.remote_url).map_err(|e| ValidationError::InvalidRemoteUrl {
            url: self.cli.remote_url.clone(),
            reason: e.to_string(),
        })?;

        for (policy, packages) in &self.policies {
            validate_packages(*policy, packages)?;
        }
        validate_packages(self.smoke_test.policy, &self.smoke_test.packages)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.log_level, "info");
        assert!(config.verbose);
        assert_eq!(config.tool_path, PathBuf::from("/opt/pulp/bin"));
        assert_eq!(config.cli.plugin, "python");
        assert_eq!(
            config.policies.get(&Policy::Immediate),
            Some(&vec!["ctc".to_string()])
        );
        assert_eq!(config.smoke_test.name, "manual_test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resource_name_uses_policy() {
        let config = Config::default();
        assert_eq!(config.resource_name(Policy::OnDemand), "pypi_on_demand");
        assert_eq!(config.resource_name(Policy::Immediate), "pypi_immediate");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml_str(
            r"
verbose: false
cli:
  list_limit: 50
policies:
  on_demand: [scipy, pyyaml]
  streamed: [pyxdg, requests]
",
        )
        .unwrap();

        assert!(!config.verbose);
        assert_eq!(config.cli.list_limit, Some(50));
        assert_eq!(config.cli.binary, "pulp");
        assert_eq!(config.name_prefix, "pypi");
        assert_eq!(
            config.policies.keys().copied().collect::<Vec<_>>(),
            vec![Policy::OnDemand, Policy::Streamed]
        );
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = Config::from_yaml_str("policies:\n  lazy: [ctc]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_name_prefix_rejected() {
        let err = Config::from_yaml_str("name_prefix: 'py pi'\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::InvalidNameChars { .. })
        ));
    }

    #[test]
    fn test_empty_packages_rejected() {
        let err = Config::from_yaml_str("policies:\n  streamed: []\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::EmptyPackages { .. })
        ));
    }

    #[test]
    fn test_blank_package_entry_rejected() {
        let err = Config::from_yaml_str("policies:\n  immediate: [ctc, '']\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::EmptyPackages { ref policy }) if policy == "immediate"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_path_with_separator_rejected() {
        let err = Config::from_yaml_str("tool_path: '/opt/pulp/bin:/tmp'\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::InvalidToolPath { .. })
        ));
    }

    #[test]
    fn test_bad_remote_url_rejected() {
        let err = Config::from_yaml_str("cli:\n  remote_url: not a url\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::InvalidRemoteUrl { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name_prefix: mirror\ntool_path: /usr/local/bin").unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.name_prefix, "mirror");
        assert_eq!(config.shell_config().tool_path, PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/pulp-provision.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
