use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AggregationConfig;

/// Per-layer aggregation strategy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Policy {
    /// Arithmetic mean over the intersected features.
    Mean,
    /// Maximum with the location of the feature attaining it.
    Max,
}

impl Policy {
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Mean => "MEAN",
            Policy::Max => "MAX",
        }
    }
}

/// Chooses the policy from a layer's display name.
///
/// Names containing one of the configured keywords (case-insensitive) are
/// production-style layers and use MAX. Every other name falls back to MEAN.
pub fn policy_for(layer_name: &str, config: &AggregationConfig) -> Policy {
    let name = layer_name.to_lowercase();
    let hit = config
        .max_keywords
        .iter()
        .find(|k| !k.is_empty() && name.contains(&k.to_lowercase()));
    match hit {
        Some(keyword) => {
            debug!(layer = layer_name, keyword = keyword.as_str(), "MAX policy");
            Policy::Max
        }
        None => {
            debug!(layer = layer_name, "no policy keyword matched, using MEAN");
            Policy::Mean
        }
    }
}
