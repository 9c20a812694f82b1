//! Client Configuration
//!
//! Experiment parameters sent to the server on `start`/`reconnect`,
//! plus the env-driven endpoints this client talks to.

use serde::{Deserialize, Serialize};

/// Parameters for building one experiment instance
///
/// Width and height are always present; the remaining fields are
/// meaningful only for experiments that declare them (Wolfram rule for
/// the elementary automaton, connectivity mask and balance for the
/// Kohonen family) and are skipped on the wire otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,
    /// Wolfram rule number (elementary automaton only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<u32>,
    /// Connectivity mask id (lab experiments only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    /// Fuzzy-OR balance in `[-1, 1]` (balanced experiments only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

impl ExperimentConfig {
    /// A bare width×height configuration
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rule: None,
            mask: None,
            balance: None,
        }
    }

    /// Grid dimensions as a pair
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::sized(50, 50)
    }
}

/// Endpoints for the remote engine, read from the environment
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// WebSocket URL of the experiment endpoint
    pub ws_url: String,
    /// Base URL for the HTTP catalog API
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://127.0.0.1:8000/ws/experiment".to_string(),
            api_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ws_url: std::env::var("NEUROFLOW_WS_URL").unwrap_or(defaults.ws_url),
            api_url: std::env::var("NEUROFLOW_API_URL").unwrap_or(defaults.api_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_skipped_on_the_wire() {
        let json = serde_json::to_value(ExperimentConfig::sized(30, 30)).unwrap();
        assert!(json.get("rule").is_none());
        assert!(json.get("mask").is_none());
        assert!(json.get("balance").is_none());
    }

    #[test]
    fn rule_survives_round_trip() {
        let config = ExperimentConfig {
            rule: Some(110),
            ..ExperimentConfig::sized(50, 50)
        };
        let back: ExperimentConfig =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
