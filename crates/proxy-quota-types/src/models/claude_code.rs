//! Claude Code CLI model mapping.

use serde::{Deserialize, Serialize};

/// Model mapping stored in `~/.claude/settings.json`.
///
/// Empty strings mean "not set".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaudeCodeModels {
    /// Model used for the opus tier
    #[serde(default)]
    pub opus_model: String,
    /// Model used for the sonnet tier
    #[serde(default)]
    pub sonnet_model: String,
    /// Model used for the haiku tier
    #[serde(default)]
    pub haiku_model: String,
}

impl ClaudeCodeModels {
    /// Settings keys paired with their values.
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            ("opus_model", self.opus_model.as_str()),
            ("sonnet_model", self.sonnet_model.as_str()),
            ("haiku_model", self.haiku_model.as_str()),
        ]
    }
}
