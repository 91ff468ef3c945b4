//! Dashboard configuration.
//!
//! Loaded from a TOML file; every field has a default so a partial (or
//! missing) file works.

use crate::chart::{ChartOptions, Rgba};
use crate::telemetry::window::DEFAULT_TIME_WINDOW;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub playback: PlaybackConfig,
    pub charts: Vec<ChartConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            playback: PlaybackConfig::default(),
            charts: default_charts(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Like [`Config::load`], but a missing file just means defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("db/samples.sqlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Milliseconds between redraws.
    pub tick_ms: u64,
    /// Simulation seconds per wall-clock second.
    pub rate: f64,
    pub autoplay: bool,
    /// Trailing history shown by charts that don't set their own.
    pub time_window: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            rate: 1.0,
            autoplay: true,
            time_window: DEFAULT_TIME_WINDOW,
        }
    }
}

/// One chart on the dashboard and the series it plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub series: String,
    #[serde(default)]
    pub time_window: Option<f64>,
    #[serde(flatten)]
    pub options: ChartOptions,
}

fn default_charts() -> Vec<ChartConfig> {
    vec![
        ChartConfig {
            series: "altitude".into(),
            time_window: None,
            options: ChartOptions::new("altitudeChart", "Altitude", Rgba::opaque(0, 200, 255), "Altitude (km)")
                .y_bounds(Some(0.0), None),
        },
        ChartConfig {
            series: "velocity".into(),
            time_window: None,
            options: ChartOptions::new("velocityChart", "Velocity", Rgba::opaque(255, 99, 132), "Velocity (m/s)"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn overrides_merge_with_defaults() {
        let config = Config::parse(
            r#"
            [server]
            bind = "127.0.0.1:8080"

            [playback]
            rate = 10.0

            [[charts]]
            series = "temperature"
            surface = "tempChart"
            label = "Temperature"
            color = "rgba(255, 159, 64, 1)"
            y_axis_label = "°C"
            y_min = -40.0
            y_max = 120.0
            time_window = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.playback.rate, 10.0);
        assert_eq!(config.playback.tick_ms, 100);
        assert_eq!(config.playback.time_window, 60.0);
        assert_eq!(config.charts.len(), 1);

        let chart = &config.charts[0];
        assert_eq!(chart.time_window, Some(30.0));
        assert_eq!(chart.options.surface, "tempChart");
        assert_eq!(chart.options.color, Rgba::opaque(255, 159, 64));
        assert_eq!((chart.options.y_min, chart.options.y_max), (Some(-40.0), Some(120.0)));
    }

    #[test]
    fn example_config_parses() {
        let config = Config::parse(include_str!("../dashboard.example.toml")).unwrap();
        assert_eq!(config.charts.len(), 2);
        assert_eq!(config.charts[0].options.y_min, Some(0.0));
        assert_eq!(config.charts[1].time_window, Some(30.0));
    }

    #[test]
    fn rejects_bad_colours() {
        let err = Config::parse(
            r#"
            [[charts]]
            series = "x"
            surface = "x"
            label = "x"
            color = "blue-ish"
            y_axis_label = "x"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn missing_file_falls_back_but_broken_file_does_not() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[server\nbind = 1").unwrap();
        assert!(matches!(
            Config::load_or_default(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }
}
