//! Experiment Catalog
//!
//! The list of experiments the server can build, fetched over HTTP
//! from the collaborator API with a built-in fallback so the client
//! stays usable when the catalog endpoint is unreachable.

use serde::{Deserialize, Serialize};

use crate::config::ExperimentConfig;

/// One selectable connectivity mask for lab experiments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskInfo {
    /// Mask id sent in the config
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
}

/// One experiment the server knows how to build
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentInfo {
    /// Id used in `start` commands
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Selectable Wolfram rules (elementary automaton only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<u32>>,
    /// Selectable connectivity masks (lab experiments only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masks: Option<Vec<MaskInfo>>,
    /// Configuration used when the experiment is first selected
    pub default_config: ExperimentConfig,
}

impl ExperimentInfo {
    /// Whether this experiment designates input/output rows
    /// (rule-driven automata feed the bottom row and read the top row;
    /// the Kohonen family has no such rows).
    pub fn has_io_rows(&self) -> bool {
        self.rules.is_some()
    }
}

/// The catalog shipped with the client, used when the API is
/// unreachable.
pub fn default_experiments() -> Vec<ExperimentInfo> {
    vec![
        ExperimentInfo {
            id: "von_neumann".into(),
            name: "Elementary Automaton (Von Neumann)".into(),
            description: "1D elementary cellular automaton (Wolfram rules)".into(),
            rules: Some(vec![111, 30, 90, 110]),
            masks: None,
            default_config: ExperimentConfig {
                rule: Some(111),
                ..ExperimentConfig::sized(50, 50)
            },
        },
        ExperimentInfo {
            id: "kohonen".into(),
            name: "Kohonen (2D Lateral Competition)".into(),
            description: "Self-organizing map with local excitation and lateral inhibition"
                .into(),
            rules: None,
            masks: None,
            default_config: ExperimentConfig::sized(30, 30),
        },
        ExperimentInfo {
            id: "kohonen_balanced".into(),
            name: "Balanced Kohonen".into(),
            description: "Kohonen with a configurable fuzzy-OR balance".into(),
            rules: None,
            masks: None,
            default_config: ExperimentConfig {
                balance: Some(0.0),
                ..ExperimentConfig::sized(30, 30)
            },
        },
        ExperimentInfo {
            id: "kohonen_lab".into(),
            name: "Kohonen Lab".into(),
            description: "Connectivity laboratory with configurable mask and balance".into(),
            rules: None,
            masks: Some(vec![
                MaskInfo {
                    id: "simple".into(),
                    name: "Simple Kohonen".into(),
                    description: "Moore r=1 center, r=2-4 corona, 8 inhibitory dendrites"
                        .into(),
                },
                MaskInfo {
                    id: "wide_hat".into(),
                    name: "Wide Hat".into(),
                    description: "Moore r=1 center, large r=2-7 corona".into(),
                },
                MaskInfo {
                    id: "narrow_hat".into(),
                    name: "Narrow Hat".into(),
                    description: "Moore r=1 center, close r=2-3 corona".into(),
                },
                MaskInfo {
                    id: "cross_center".into(),
                    name: "Cross Center".into(),
                    description: "Von Neumann r=1 center, 4 cardinal inhibitory blocks".into(),
                },
                MaskInfo {
                    id: "double_ring".into(),
                    name: "Double Ring".into(),
                    description: "Moore r=1 center, ring r=2-3 (-1) plus ring r=5-7 (-0.5)"
                        .into(),
                },
            ]),
            default_config: ExperimentConfig {
                mask: Some("simple".into()),
                balance: Some(0.0),
                ..ExperimentConfig::sized(30, 30)
            },
        },
    ]
}

/// Fetch the catalog from the API, falling back to the built-in list
/// when the endpoint is unreachable, errors, or returns nothing.
pub async fn fetch_experiments(api_url: &str) -> Vec<ExperimentInfo> {
    let url = format!("{}/api/experiments", api_url.trim_end_matches('/'));
    match try_fetch(&url).await {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => {
            tracing::warn!(url, "catalog endpoint returned no experiments, using defaults");
            default_experiments()
        }
        Err(error) => {
            tracing::warn!(url, %error, "catalog fetch failed, using defaults");
            default_experiments()
        }
    }
}

async fn try_fetch(url: &str) -> Result<Vec<ExperimentInfo>, reqwest::Error> {
    reqwest::get(url).await?.error_for_status()?.json().await
}
