//! Layered configuration: defaults, then a TOML file, then `VIDSTRIP_*` environment
//! variables. Command-line overrides are applied last by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::batch::BatchConfig;
use crate::engine::RemuxOptions;
use crate::error::{RemuxError, RemuxResult};
use crate::utils::logging::LogConfig;

/// Configuration file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "vidstrip.toml";

pub const ENV_KEEP: &str = "VIDSTRIP_KEEP";
pub const ENV_ON_WRITE_ERROR: &str = "VIDSTRIP_ON_WRITE_ERROR";
pub const ENV_FORMAT: &str = "VIDSTRIP_FORMAT";
pub const ENV_JOBS: &str = "VIDSTRIP_JOBS";
pub const ENV_LOG_LEVEL: &str = "VIDSTRIP_LOG_LEVEL";

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemuxConfig {
    pub remux: RemuxOptions,
    pub batch: BatchConfig,
    pub log: LogConfig,
}

impl RemuxConfig {
    /// Parse a TOML document; missing sections and keys keep their defaults
    pub fn from_toml_str(content: &str) -> RemuxResult<Self> {
        toml::from_str(content).map_err(|e| RemuxError::Config {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> RemuxResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| RemuxError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `explicit` (which must exist), else from `vidstrip.toml` in the working
    /// directory if present, else defaults
    pub fn load(explicit: Option<&Path>) -> RemuxResult<Self> {
        Self::load_from(explicit, Path::new("."))
    }

    pub fn load_from(explicit: Option<&Path>, working_dir: &Path) -> RemuxResult<Self> {
        let path: Option<PathBuf> = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = working_dir.join(DEFAULT_CONFIG_FILE);
                candidate.is_file().then_some(candidate)
            }
        };

        match path {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                Self::from_file(&path)
            }
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Override with `VIDSTRIP_*` variables from the process environment
    pub fn apply_env(&mut self) -> RemuxResult<()> {
        self.apply_env_from(std::env::vars())
    }

    /// Override with `VIDSTRIP_*` variables from `vars`; unrelated names are ignored
    pub fn apply_env_from<I>(&mut self, vars: I) -> RemuxResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            match name.as_str() {
                ENV_KEEP => self.remux.keep = value.parse()?,
                ENV_ON_WRITE_ERROR => self.remux.on_write_error = value.parse()?,
                ENV_FORMAT => {
                    let value = value.trim();
                    self.remux.format = (!value.is_empty()).then(|| value.to_string());
                }
                ENV_JOBS => {
                    let jobs = value.trim().parse::<usize>().map_err(|e| RemuxError::Config {
                        message: format!("{} must be a positive integer: {}", ENV_JOBS, e),
                    })?;
                    self.batch.jobs = Some(jobs);
                }
                ENV_LOG_LEVEL => self.log.level = value.trim().to_string(),
                _ => continue,
            }
            info!("Found environment override: {} = {}", name, value);
        }
        Ok(())
    }

    pub fn validate(&self) -> RemuxResult<()> {
        if self.batch.jobs == Some(0) {
            return Err(RemuxError::Config {
                message: "jobs must be at least 1".to_string(),
            });
        }
        if self.batch.suffix.is_empty() && self.batch.output_dir.is_none() {
            return Err(RemuxError::Config {
                message: "an empty suffix needs an output directory, or outputs would replace their inputs"
                    .to_string(),
            });
        }
        if self.batch.extension.trim_start_matches('.').is_empty() {
            return Err(RemuxError::Config {
                message: "batch extension must not be empty".to_string(),
            });
        }
        self.log.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WriteFailurePolicy;
    use crate::streams::StreamSelection;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = RemuxConfig::default();
        assert_eq!(config.remux.keep, StreamSelection::Video);
        assert_eq!(config.batch.extension, "mp4");
        assert_eq!(config.batch.suffix, "_noaudio");
        assert_eq!(config.log.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = RemuxConfig::from_toml_str(
            r#"
            [remux]
            keep = "non-audio"
            on_write_error = "stop"
            format = "matroska"

            [batch]
            extension = "mkv"
            jobs = 2
            recursive = true

            [log]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.remux.keep, StreamSelection::NonAudio);
        assert_eq!(config.remux.on_write_error, WriteFailurePolicy::Stop);
        assert_eq!(config.remux.format.as_deref(), Some("matroska"));
        assert_eq!(config.batch.extension, "mkv");
        assert_eq!(config.batch.suffix, "_noaudio");
        assert_eq!(config.batch.jobs, Some(2));
        assert!(config.batch.recursive);
        assert!(config.log.json);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(RemuxConfig::from_toml_str("[remux]\nkeep = \"loud\"\n").is_err());
        assert!(RemuxConfig::from_toml_str("[remux]\non_write_error = \"retry\"\n").is_err());
        assert!(RemuxConfig::from_toml_str("not toml at all [").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config =
            RemuxConfig::from_toml_str("[remux]\nkeep = \"video\"\n[batch]\njobs = 8\n").unwrap();
        config
            .apply_env_from(vars(&[
                ("VIDSTRIP_KEEP", "kind:video,subtitle"),
                ("VIDSTRIP_ON_WRITE_ERROR", "abort"),
                ("VIDSTRIP_JOBS", "3"),
                ("VIDSTRIP_LOG_LEVEL", "debug"),
                ("PATH", "/usr/bin"),
            ]))
            .unwrap();

        assert_eq!(
            config.remux.keep,
            "kind:video,subtitle".parse::<StreamSelection>().unwrap()
        );
        assert_eq!(config.remux.on_write_error, WriteFailurePolicy::Abort);
        assert_eq!(config.batch.jobs, Some(3));
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_env_format_empty_clears() {
        let mut config = RemuxConfig::default();
        config.remux.format = Some("mp4".to_string());
        config
            .apply_env_from(vars(&[("VIDSTRIP_FORMAT", " ")]))
            .unwrap();
        assert!(config.remux.format.is_none());
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let mut config = RemuxConfig::default();
        assert!(config
            .apply_env_from(vars(&[("VIDSTRIP_JOBS", "many")]))
            .is_err());
        assert!(config
            .apply_env_from(vars(&[("VIDSTRIP_KEEP", "index:x")]))
            .is_err());
    }

    #[test]
    fn test_validate_rejects_zero_jobs() {
        let mut config = RemuxConfig::default();
        config.batch.jobs = Some(0);
        assert!(matches!(config.validate(), Err(RemuxError::Config { .. })));
    }

    #[test]
    fn test_validate_empty_suffix_needs_output_dir() {
        let mut config = RemuxConfig::default();
        config.batch.suffix = String::new();
        assert!(matches!(config.validate(), Err(RemuxError::Config { .. })));

        config.batch.output_dir = Some(PathBuf::from("out"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_working_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = RemuxConfig::load_from(None, temp_dir.path()).unwrap();
        assert_eq!(config, RemuxConfig::default());

        fs::write(
            temp_dir.path().join(DEFAULT_CONFIG_FILE),
            "[batch]\nsuffix = \"_silent\"\n",
        )
        .unwrap();
        let config = RemuxConfig::load_from(None, temp_dir.path()).unwrap();
        assert_eq!(config.batch.suffix, "_silent");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(RemuxConfig::load_from(Some(&missing), temp_dir.path()).is_err());
    }
}
