//! Job configuration stored in an optional `gistdash.toml`.
//!
//! Every field has a default matching the deployed dashboards, so the jobs
//! run with no config file at all. Credentials and gist IDs never live
//! here — they come from environment variables and stay opaque to the
//! logic.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Root configuration with one section per job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashConfig {
    pub agent: AgentConfig,
    pub clouds: CloudsConfig,
    pub money: MoneyConfig,
}

/// Persona job settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Location the persona experiences weather at.
    pub latitude: f64,
    pub longitude: f64,
    /// Model id for the persona voice.
    pub model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            latitude: 37.4275,
            longitude: -122.1697,
            model: "claude-sonnet-4-5-20250929".to_string(),
        }
    }
}

/// A weather-station marker on the cloud map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub name: String,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    pub color: String,
    pub symbol: String,
}

/// Cloud-cover map settings: grid bounding box and map markers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CloudsConfig {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub rows: usize,
    pub cols: usize,
    pub home_lat: f64,
    pub home_lon: f64,
    pub stations: Vec<Station>,
}

impl Default for CloudsConfig {
    fn default() -> Self {
        let station = |name: &str, label: &str, lat: f64, lon: f64, color: &str| Station {
            name: name.to_string(),
            label: label.to_string(),
            lat,
            lon,
            color: color.to_string(),
            symbol: "airport".to_string(),
        };
        Self {
            // ~80km x 80km centered on Palo Alto
            lat_min: 37.25,
            lat_max: 37.65,
            lon_min: -122.55,
            lon_max: -121.95,
            rows: 6,
            cols: 6,
            home_lat: 37.44783,
            home_lon: -122.13604,
            stations: vec![
                station("KPAO", "Palo Alto Airport", 37.461, -122.115, "#2196F3"),
                station("KNUQ", "Moffett Field (NASA)", 37.4161, -122.0496, "#2196F3"),
                station("KSQL", "San Carlos Airport", 37.5122, -122.2508, "#2196F3"),
                station("KSFO", "San Francisco Intl", 37.6213, -122.3750, "#9C27B0"),
                station("KSJC", "San Jose Intl", 37.3626, -121.9289, "#9C27B0"),
            ],
        }
    }
}

/// A ticker watched for insider (Form 4) filings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Watched {
    pub ticker: String,
    /// Zero-padded SEC CIK number.
    pub cik: String,
}

/// A sector ETF tracked for flow deltas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sector {
    pub symbol: String,
    pub label: String,
}

/// Money-flow dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MoneyConfig {
    pub watched: Vec<Watched>,
    pub sectors: Vec<Sector>,
    /// Model id for the refinement pass.
    pub model: String,
}

impl Default for MoneyConfig {
    fn default() -> Self {
        let watched = |ticker: &str, cik: &str| Watched {
            ticker: ticker.to_string(),
            cik: cik.to_string(),
        };
        let sector = |symbol: &str, label: &str| Sector {
            symbol: symbol.to_string(),
            label: label.to_string(),
        };
        Self {
            watched: vec![
                watched("NVDA", "0001045810"),
                watched("AMD", "0000002488"),
                watched("TSM", "0001046179"),
                watched("INTC", "0000050863"),
                watched("MSFT", "0000789019"),
            ],
            sectors: vec![
                sector("SOXX", "Semi"),
                sector("XLK", "Tech"),
                sector("XLE", "Enrg"),
                sector("XLF", "Fin"),
                sector("XLV", "Hlth"),
            ],
            model: "claude-sonnet-4-5-20250929".to_string(),
        }
    }
}

impl DashConfig {
    /// Load config from a TOML file; `None` means use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            let cfg = Self::default();
            cfg.validate()?;
            return Ok(cfg);
        };
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let cfg: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.clouds.rows == 0 || self.clouds.cols == 0 {
            return Err(ConfigError::Invalid(
                "clouds.rows and clouds.cols must be > 0".to_string(),
            ));
        }
        if self.clouds.lat_min >= self.clouds.lat_max || self.clouds.lon_min >= self.clouds.lon_max
        {
            return Err(ConfigError::Invalid(
                "clouds bounding box must have min < max".to_string(),
            ));
        }
        if self.money.sectors.is_empty() {
            return Err(ConfigError::Invalid(
                "money.sectors must not be empty".to_string(),
            ));
        }
        if self.agent.model.trim().is_empty() || self.money.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model id must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = DashConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.clouds.rows, 6);
        assert_eq!(cfg.money.watched.len(), 5);
        assert_eq!(cfg.money.sectors[0].label, "Semi");
    }

    #[test]
    fn load_none_returns_default() {
        let cfg = DashConfig::load(None).unwrap();
        assert_eq!(cfg, DashConfig::default());
    }

    #[test]
    fn load_missing_file_errors() {
        let temp = tempfile::tempdir().unwrap();
        let result = DashConfig::load(Some(&temp.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("gistdash.toml");
        std::fs::write(&path, "[clouds]\nrows = 4\ncols = 4\n").unwrap();
        let cfg = DashConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.clouds.rows, 4);
        assert_eq!(cfg.clouds.lat_min, 37.25);
        assert_eq!(cfg.money, MoneyConfig::default());
    }

    #[test]
    fn rejects_degenerate_grid() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("gistdash.toml");
        std::fs::write(&path, "[clouds]\nrows = 0\n").unwrap();
        assert!(matches!(
            DashConfig::load(Some(&path)),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = DashConfig::default();
        let raw = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DashConfig = toml::from_str(&raw).unwrap();
        assert_eq!(parsed, cfg);
    }
}
