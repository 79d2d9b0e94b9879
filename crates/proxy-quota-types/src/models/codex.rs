//! Codex usage window models.

use serde::{Deserialize, Serialize};

/// One Codex rate-limit window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodexQuotaWindow {
    /// Window identifier: "primary", "secondary" or "code-review"
    pub id: String,
    /// Display label
    pub label: String,
    /// Used percentage (0-100); `None` means unknown, never "available"
    pub used_percent: Option<f64>,
    /// Human reset label, "-" when unknown
    pub reset_label: String,
}

/// Successful Codex fetch result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CodexQuota {
    /// Windows in primary, secondary, code-review order (absent windows omitted)
    pub windows: Vec<CodexQuotaWindow>,
    /// Plan type from the usage payload, else from the stored credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<String>,
}

impl CodexQuota {
    /// Look up a window by id.
    pub fn window(&self, id: &str) -> Option<&CodexQuotaWindow> {
        self.windows.iter().find(|w| w.id == id)
    }
}
