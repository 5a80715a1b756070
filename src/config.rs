//! Configuration loading with override support.
//!
//! Settings are resolved in three tiers:
//! 1. TOML file (explicit path, `EDGESTAG_CONFIG_PATH`, or `./edgestag.toml`)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (applied by the binary)
//!
//! Every section is optional; missing keys fall back to defaults.
//!
//! ```toml
//! [canny]
//! low_threshold = 50.0
//! high_threshold = 150.0
//! blur_sigma = 1.4
//! blur_kernel_size = 5
//! l2_gradient = false
//!
//! [edit]
//! min_edge_size = 50
//!
//! [line]
//! mode = "trace"
//! thickness = 1
//!
//! [logging]
//! level = "info"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filters::edge::CannyParams;
use crate::line::LineParams;

/// Name of the config file searched for in the working directory.
pub const CONFIG_FILE_NAME: &str = "edgestag.toml";

/// Upper bound accepted for Canny thresholds.
pub const MAX_THRESHOLD: f32 = 2000.0;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Edge-editing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditParams {
    /// Minimum component area kept by small-edge removal
    pub min_edge_size: usize,
}

impl Default for EditParams {
    fn default() -> Self {
        Self { min_edge_size: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub canny: CannyParams,
    pub edit: EditParams,
    pub line: LineParams,
    pub logging: LoggingConfig,
}

impl EdgeConfig {
    /// Parse TOML text. `origin` is only used in error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        let c = &self.canny;
        for (field, value) in [
            ("canny.low_threshold", c.low_threshold),
            ("canny.high_threshold", c.high_threshold),
        ] {
            if !value.is_finite() || !(0.0..=MAX_THRESHOLD).contains(&value) {
                return Err(invalid(field, format!("{value} is outside 0-{MAX_THRESHOLD}")));
            }
        }
        if !c.blur_sigma.is_finite() || c.blur_sigma <= 0.0 {
            return Err(invalid("canny.blur_sigma", format!("{} must be positive", c.blur_sigma)));
        }
        if c.blur_kernel_size == 0 || c.blur_kernel_size % 2 == 0 {
            return Err(invalid(
                "canny.blur_kernel_size",
                format!("{} must be odd", c.blur_kernel_size),
            ));
        }
        if self.line.thickness == 0 {
            return Err(invalid("line.thickness", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason,
    }
}

/// Find a configuration file.
///
/// Search order:
/// 1. `EDGESTAG_CONFIG_PATH` environment variable (must exist)
/// 2. `./edgestag.toml`
///
/// Returns `Ok(None)` when nothing is configured and no file is present.
pub fn find_config_file() -> ConfigResult<Option<PathBuf>> {
    if let Ok(env_path) = env::var("EDGESTAG_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if !path.exists() {
            return Err(ConfigError::Io {
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file named by EDGESTAG_CONFIG_PATH does not exist",
                ),
                path,
            });
        }
        return Ok(Some(path));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    Ok(local.exists().then_some(local))
}

/// Load configuration: file (if any), then environment overrides, then
/// validation.
///
/// # Arguments
/// * `config_path` - Explicit file. If `None`, [`find_config_file`] is used
///   and defaults apply when nothing is found.
pub fn load_config(config_path: Option<&Path>) -> ConfigResult<EdgeConfig> {
    let file = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file()?,
    };

    let mut config = match &file {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "loading config file");
            EdgeConfig::from_toml_str(&content, path)?
        }
        None => EdgeConfig::default(),
    };

    apply_environment_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Apply `EDGESTAG_*` environment overrides.
///
/// Supported environment variables:
/// - `EDGESTAG_LOW_THRESHOLD` -> `canny.low_threshold`
/// - `EDGESTAG_HIGH_THRESHOLD` -> `canny.high_threshold`
/// - `EDGESTAG_BLUR_SIGMA` -> `canny.blur_sigma`
/// - `EDGESTAG_MIN_EDGE_SIZE` -> `edit.min_edge_size`
/// - `EDGESTAG_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut EdgeConfig) -> ConfigResult<()> {
    apply_overrides(config, |key| env::var(key).ok())
}

/// Apply overrides from any key lookup (environment, test fixtures).
pub fn apply_overrides<F>(config: &mut EdgeConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("EDGESTAG_LOW_THRESHOLD") {
        config.canny.low_threshold = parse_value("EDGESTAG_LOW_THRESHOLD", &v)?;
    }
    if let Some(v) = lookup("EDGESTAG_HIGH_THRESHOLD") {
        config.canny.high_threshold = parse_value("EDGESTAG_HIGH_THRESHOLD", &v)?;
    }
    if let Some(v) = lookup("EDGESTAG_BLUR_SIGMA") {
        config.canny.blur_sigma = parse_value("EDGESTAG_BLUR_SIGMA", &v)?;
    }
    if let Some(v) = lookup("EDGESTAG_MIN_EDGE_SIZE") {
        config.edit.min_edge_size = parse_value("EDGESTAG_MIN_EDGE_SIZE", &v)?;
    }
    if let Some(v) = lookup("EDGESTAG_LOG_LEVEL") {
        config.logging.level = v;
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> ConfigResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(key, format!("cannot parse '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::LineMode;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EdgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.canny.low_threshold, 50.0);
        assert_eq!(config.canny.high_threshold, 150.0);
        assert_eq!(config.edit.min_edge_size, 50);
        assert_eq!(config.line.mode, LineMode::Trace);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let content = r#"
            [canny]
            high_threshold = 200.0

            [line]
            mode = "outline"
        "#;
        let config = EdgeConfig::from_toml_str(content, Path::new("inline.toml")).unwrap();

        assert_eq!(config.canny.high_threshold, 200.0);
        assert_eq!(config.canny.low_threshold, 50.0);
        assert_eq!(config.line.mode, LineMode::Outline);
        assert_eq!(config.line.thickness, 1);
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let err = EdgeConfig::from_toml_str("[canny\n", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_validation_rejects_even_kernel() {
        let mut config = EdgeConfig::default();
        config.canny.blur_kernel_size = 4;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("canny.blur_kernel_size"));
    }

    #[test]
    fn test_validation_rejects_out_of_range_threshold() {
        let mut config = EdgeConfig::default();
        config.canny.low_threshold = -3.0;
        assert!(config.validate().is_err());

        let mut config = EdgeConfig::default();
        config.canny.high_threshold = MAX_THRESHOLD + 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_thickness() {
        let mut config = EdgeConfig::default();
        config.line.thickness = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("EDGESTAG_LOW_THRESHOLD", "10"),
            ("EDGESTAG_MIN_EDGE_SIZE", " 7 "),
            ("EDGESTAG_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = EdgeConfig::default();
        apply_overrides(&mut config, |k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.canny.low_threshold, 10.0);
        assert_eq!(config.canny.high_threshold, 150.0);
        assert_eq!(config.edit.min_edge_size, 7);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_override_parse_failure() {
        let mut config = EdgeConfig::default();
        let err = apply_overrides(&mut config, |k| {
            (k == "EDGESTAG_BLUR_SIGMA").then(|| "wide".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("EDGESTAG_BLUR_SIGMA"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
            [canny]
            low_threshold = 30.0
            l2_gradient = true

            [edit]
            min_edge_size = 12
            "#,
        );

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.canny.low_threshold, 30.0);
        assert!(config.canny.l2_gradient);
        assert_eq!(config.canny.high_threshold, 150.0);
        assert_eq!(config.edit.min_edge_size, 12);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = load_config(Some(&missing)).unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_load_config_validates_file_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[canny]\nhigh_threshold = 5000.0\n");

        let err = load_config(Some(&path)).unwrap_err();

        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "canny.high_threshold"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_find_config_file_from_env() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[line]\nthickness = 2\n");

        env::set_var("EDGESTAG_CONFIG_PATH", &path);
        let found = find_config_file();
        env::set_var("EDGESTAG_CONFIG_PATH", dir.path().join("gone.toml"));
        let missing = find_config_file();
        env::remove_var("EDGESTAG_CONFIG_PATH");

        assert_eq!(found.unwrap(), Some(path));
        assert!(matches!(missing.unwrap_err(), ConfigError::Io { .. }));
    }
}
