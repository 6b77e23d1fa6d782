use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DashboardError, Result};

/// SLA limits used by the alert detector, in days.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub tth_limit: f64,
    pub ttf_limit: f64,
    pub screening_delay_days: i64,
    /// Days over a limit at which a TTH/TTF breach turns moderate.
    pub moderate_over: f64,
    /// Days over a limit at which a TTH/TTF breach turns critical.
    pub critical_over: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            tth_limit: 30.0,
            ttf_limit: 60.0,
            screening_delay_days: 2,
            moderate_over: 5.0,
            critical_over: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub alerts: AlertThresholds,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/TA Tracker - HM Sheet.csv"),
            alerts: AlertThresholds::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads the config file if one is given, otherwise returns defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DashboardError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
            data_path = "exports/tracker.csv"

            [alerts]
            tth_limit = 45
            "#,
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("exports/tracker.csv"));
        assert_eq!(config.alerts.tth_limit, 45.0);
        assert_eq!(config.alerts.ttf_limit, 60.0);
        assert_eq!(config.alerts.screening_delay_days, 2);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(DashboardConfig::from_toml("").unwrap(), DashboardConfig::default());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let err = DashboardConfig::from_toml("alerts = 3").unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "[alerts]\nscreening_delay_days = 3\n").unwrap();

        let config = DashboardConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.alerts.screening_delay_days, 3);

        let missing = DashboardConfig::load(Some(&dir.path().join("nope.toml"))).await;
        assert!(matches!(missing, Err(DashboardError::Io { .. })));
    }
}
