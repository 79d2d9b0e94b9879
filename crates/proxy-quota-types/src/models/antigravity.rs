//! Antigravity quota data models.

use serde::{Deserialize, Serialize};

use super::fraction_to_percent;

/// Quota of a single Antigravity model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AntigravityModelQuota {
    /// Model identifier as reported by fetchAvailableModels
    pub model_id: String,
    /// Vendor display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Remaining fraction (0-1), `None` when unknown
    pub remaining_fraction: Option<f64>,
    /// Time when quota resets (vendor timestamp string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<String>,
}

impl AntigravityModelQuota {
    /// Remaining percentage (0-100), `None` when unknown.
    pub fn remaining_percent(&self) -> Option<f64> {
        self.remaining_fraction.map(fraction_to_percent)
    }
}

/// A named model family with its per-model quotas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AntigravityQuotaGroup {
    /// Stable group identifier (e.g. "gemini-3-pro")
    pub id: String,
    /// Display label (e.g. "Gemini 3 Pro")
    pub label: String,
    /// Member models in discovery order
    pub models: Vec<AntigravityModelQuota>,
    /// Lowest known remaining fraction across members
    pub remaining_fraction: Option<f64>,
    /// Earliest member reset time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<String>,
}

impl AntigravityQuotaGroup {
    /// Remaining percentage (0-100) of the most depleted member.
    pub fn remaining_percent(&self) -> Option<f64> {
        self.remaining_fraction.map(fraction_to_percent)
    }
}

/// Successful Antigravity fetch result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AntigravityQuota {
    /// Quota groups; empty on partial success
    pub groups: Vec<AntigravityQuotaGroup>,
    /// Subscription tier id (best effort)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<String>,
}

impl AntigravityQuota {
    /// Lowest remaining percentage across all groups.
    pub fn min_remaining_percent(&self) -> Option<f64> {
        self.groups
            .iter()
            .filter_map(AntigravityQuotaGroup::remaining_percent)
            .min_by(|a, b| a.total_cmp(b))
    }
}
