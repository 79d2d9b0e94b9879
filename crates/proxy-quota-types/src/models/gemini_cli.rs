//! Gemini CLI quota bucket models.

use serde::{Deserialize, Serialize};

/// A Gemini CLI quota bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeminiCliQuotaBucket {
    /// Model identifier (group representative)
    pub model_id: String,
    /// Token type the bucket accounts for (e.g. "REQUESTS")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Remaining fraction (0-1), `None` when unknown
    pub remaining_fraction: Option<f64>,
    /// Remaining amount, `None` when not reported
    pub remaining_amount: Option<f64>,
    /// Reset timestamp as reported by the vendor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_time: Option<String>,
    /// All vendor model ids folded into this bucket
    #[serde(default)]
    pub model_ids: Vec<String>,
}

/// Successful Gemini CLI fetch result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeminiCliQuota {
    /// Buckets sorted by model id, then token type
    pub buckets: Vec<GeminiCliQuotaBucket>,
}
