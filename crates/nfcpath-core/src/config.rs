//! # Configuration System
//!
//! Provides YAML-based configuration for nfcpath runs, including:
//!
//! - Device geometry assumptions (average phone size, receiver placement)
//! - Link-budget reference values (reference antenna area, power, gains, carrier)
//! - Processing settings (parallelism, ranking depth)
//! - Logging configuration
//!
//! Computations take these values as arguments; there are no module globals.
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `NFCPATH_CONFIG` environment variable
//! 2. `./nfcpath.yaml` (current directory)
//! 3. `~/.config/nfcpath/config.yaml` (user config)
//! 4. `/etc/nfcpath/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! device:
//!   average_width_m: 0.075
//!   average_height_m: 0.15
//!   receiver_offset_m: -0.04
//!
//! references:
//!   reference_area_m2: 0.002025
//!   reference_power_db: -50.0
//!   frequency_hz: 13.56e6
//!   gain_model: area_scaled
//!
//! processing:
//!   parallel: true
//!   threads: 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::observe::{LogFormat, LogLevel};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "NFCPATH_CONFIG";

/// NFC carrier frequency (Hz).
pub const NFC_CARRIER_HZ: f64 = 13.56e6;

/// Error type for configuration operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("config not found: {0}")]
    NotFound(String),
    /// Failed to read configuration file
    #[error("failed to read config: {0}")]
    ReadError(String),
    /// Failed to parse configuration
    #[error("failed to parse config: {0}")]
    ParseError(String),
    /// Invalid configuration value
    #[error("invalid config: {0}")]
    ValidationError(String),
}

/// Assumed physical device dimensions and receiver placement.
///
/// Actual per-device dimensions are not available, so every record is
/// converted with the same average phone size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceGeometryConstants {
    /// Average device width (m)
    pub average_width_m: f64,
    /// Average device height (m)
    pub average_height_m: f64,
    /// Receiver line position relative to the top edge (m, negative = above the device)
    pub receiver_offset_m: f64,
    /// Receiver antenna area (m²). `None` means `average_width_m²`.
    pub receiver_area_m2: Option<f64>,
}

impl Default for DeviceGeometryConstants {
    fn default() -> Self {
        Self {
            average_width_m: 0.075, // 75 mm
            average_height_m: 0.15, // 150 mm
            receiver_offset_m: -0.04,
            receiver_area_m2: None,
        }
    }
}

impl DeviceGeometryConstants {
    /// Receiver antenna area actually used for receive-gain scaling (m²).
    pub fn effective_receiver_area_m2(&self) -> f64 {
        self.receiver_area_m2
            .unwrap_or(self.average_width_m * self.average_width_m)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("device.average_width_m", self.average_width_m)?;
        positive("device.average_height_m", self.average_height_m)?;
        finite("device.receiver_offset_m", self.receiver_offset_m)?;
        positive("device.receiver_area_m2", self.effective_receiver_area_m2())
    }
}

/// How antenna gains enter the Friis equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainModel {
    /// Reference gains rescaled by antenna area
    #[default]
    AreaScaled,
    /// Reference gains used as-is for every record
    Reference,
}

/// Calibration values for an antenna of `reference_area_m2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkBudgetReferences {
    /// Area of the reference antenna (m²)
    pub reference_area_m2: f64,
    /// Transmit power of the reference antenna (dB)
    pub reference_power_db: f64,
    /// Transmit gain of the reference antenna (dB)
    pub reference_tx_gain_db: f64,
    /// Receive gain of the reference antenna (dB)
    pub reference_rx_gain_db: f64,
    /// Carrier frequency (Hz)
    pub frequency_hz: f64,
    /// Gain scaling model
    pub gain_model: GainModel,
    /// Fraction of the antenna area that contributes to transmit power, in (0, 1]
    pub tx_power_aperture_efficiency: f64,
}

impl Default for LinkBudgetReferences {
    fn default() -> Self {
        Self {
            reference_area_m2: 0.002025, // 45 mm x 45 mm
            reference_power_db: -50.0,
            reference_tx_gain_db: 0.0,
            reference_rx_gain_db: 0.0,
            frequency_hz: NFC_CARRIER_HZ,
            gain_model: GainModel::AreaScaled,
            tx_power_aperture_efficiency: 1.0,
        }
    }
}

impl LinkBudgetReferences {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("references.reference_area_m2", self.reference_area_m2)?;
        finite("references.reference_power_db", self.reference_power_db)?;
        finite("references.reference_tx_gain_db", self.reference_tx_gain_db)?;
        finite("references.reference_rx_gain_db", self.reference_rx_gain_db)?;
        positive("references.frequency_hz", self.frequency_hz)?;
        let eff = self.tx_power_aperture_efficiency;
        if !(eff > 0.0 && eff <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "references.tx_power_aperture_efficiency must be in (0, 1], got {eff}"
            )));
        }
        Ok(())
    }
}

/// Dataset processing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Process records on a rayon thread pool
    pub parallel: bool,
    /// Worker threads (0 = rayon default)
    pub threads: usize,
    /// Number of placements listed in the ranking report
    pub top_placements: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: 0,
            top_placements: 10,
        }
    }
}

/// Logging section of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Log format
    pub format: LogFormat,
    /// Module filter (e.g., "nfcpath_core=debug")
    pub filter: Option<String>,
    /// Include source location (file:line)
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            filter: None,
            source_location: false,
        }
    }
}

/// Complete nfcpath configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfcPathConfig {
    /// Configuration version
    pub version: String,
    /// Device geometry assumptions
    pub device: DeviceGeometryConstants,
    /// Link-budget reference values
    pub references: LinkBudgetReferences,
    /// Processing settings
    pub processing: ProcessingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for NfcPathConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            device: DeviceGeometryConstants::default(),
            references: LinkBudgetReferences::default(),
            processing: ProcessingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl NfcPathConfig {
    /// Load configuration from the default search path.
    ///
    /// Search order:
    /// 1. `NFCPATH_CONFIG` environment variable
    /// 2. `./nfcpath.yaml`
    /// 3. `~/.config/nfcpath/config.yaml`
    /// 4. `/etc/nfcpath/config.yaml`
    ///
    /// Returns default config if no file is found. A path named by the
    /// environment variable that does not exist is an error.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = Path::new(&path);
            if !path.exists() {
                return Err(ConfigError::NotFound(format!(
                    "{} (from {CONFIG_ENV_VAR})",
                    path.display()
                )));
            }
            return Self::load_from(path);
        }

        for path in &Self::config_search_paths() {
            if path.exists() {
                return Self::load_from(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_yaml()?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Get configuration search paths.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./nfcpath.yaml")];

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "nfcpath") {
            paths.push(config_dir.config_dir().join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/nfcpath/config.yaml"));

        paths
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.device.validate()?;
        self.references.validate()
    }

    /// Generate example configuration YAML.
    pub fn example_yaml() -> String {
        let config = Self {
            device: DeviceGeometryConstants {
                receiver_area_m2: Some(0.005625),
                ..Default::default()
            },
            ..Default::default()
        };

        serde_yaml::to_string(&config).unwrap_or_default()
    }
}

fn finite(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = NfcPathConfig::default();
        assert_eq!(config.device.average_width_m, 0.075);
        assert_eq!(config.device.average_height_m, 0.15);
        assert_eq!(config.device.receiver_offset_m, -0.04);
        assert_eq!(config.references.frequency_hz, 13.56e6);
        assert_eq!(config.references.gain_model, GainModel::AreaScaled);
        assert!(config.processing.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_receiver_area_defaults_to_width_squared() {
        let device = DeviceGeometryConstants::default();
        assert_relative_eq!(device.effective_receiver_area_m2(), 0.005625, epsilon = 1e-15);

        let explicit = DeviceGeometryConstants {
            receiver_area_m2: Some(0.001),
            ..Default::default()
        };
        assert_eq!(explicit.effective_receiver_area_m2(), 0.001);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
device:
  average_width_m: 0.07
  receiver_offset_m: -0.02

references:
  reference_area_m2: 0.001225
  reference_power_db: -45.0
  gain_model: reference
  tx_power_aperture_efficiency: 0.8

processing:
  parallel: false
  top_placements: 3
"#;

        let config = NfcPathConfig::parse(yaml).unwrap();
        assert_eq!(config.device.average_width_m, 0.07);
        assert_eq!(config.device.receiver_offset_m, -0.02);
        assert_eq!(config.references.reference_area_m2, 0.001225);
        assert_eq!(config.references.reference_power_db, -45.0);
        assert_eq!(config.references.gain_model, GainModel::Reference);
        assert_eq!(config.references.tx_power_aperture_efficiency, 0.8);
        assert!(!config.processing.parallel);
        assert_eq!(config.processing.top_placements, 3);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
references:
  reference_power_db: -40.0
"#;

        let config = NfcPathConfig::parse(yaml).unwrap();
        assert_eq!(config.references.reference_power_db, -40.0);
        // Defaults should be applied
        assert_eq!(config.references.frequency_hz, 13.56e6);
        assert_eq!(config.device.average_height_m, 0.15);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = NfcPathConfig::default();
        config.device.average_width_m = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = NfcPathConfig::default();
        config.references.reference_area_m2 = -1.0;
        assert!(config.validate().is_err());

        let mut config = NfcPathConfig::default();
        config.references.tx_power_aperture_efficiency = 1.5;
        assert!(config.validate().is_err());

        let mut config = NfcPathConfig::default();
        config.references.frequency_hz = f64::NAN;
        assert!(config.validate().is_err());

        let yaml = "device:\n  receiver_area_m2: 0.0\n";
        assert!(matches!(
            NfcPathConfig::parse(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        let result = NfcPathConfig::parse("device: [not, a, map]");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nfcpath.yaml");

        let mut config = NfcPathConfig::default();
        config.references.reference_power_db = -42.5;
        config.processing.threads = 2;
        config.save(&path).unwrap();

        let loaded = NfcPathConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_example_yaml_parses() {
        let yaml = NfcPathConfig::example_yaml();
        assert!(yaml.contains("reference_area_m2"));
        let config = NfcPathConfig::parse(&yaml).unwrap();
        assert_eq!(config.device.receiver_area_m2, Some(0.005625));
    }
}
