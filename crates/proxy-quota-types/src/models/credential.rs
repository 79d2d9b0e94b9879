//! Stored credential records as enumerated by the credential catalog.

use serde::{Deserialize, Serialize};

/// Upstream quota protocol a credential is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderType {
    /// Google Antigravity IDE (Cloud Code fetchAvailableModels)
    Antigravity,
    /// OpenAI Codex (ChatGPT backend usage endpoint)
    Codex,
    /// Google Gemini CLI (Cloud Code retrieveUserQuota)
    GeminiCli,
}

impl ProviderType {
    /// All providers in registry order.
    pub const ALL: [Self; 3] = [Self::Antigravity, Self::Codex, Self::GeminiCli];

    /// Wire name used by the credential catalog.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Antigravity => "antigravity",
            Self::Codex => "codex",
            Self::GeminiCli => "gemini-cli",
        }
    }

    /// Human-readable name for tables and logs.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Antigravity => "Antigravity",
            Self::Codex => "Codex",
            Self::GeminiCli => "Gemini CLI",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "antigravity" => Ok(Self::Antigravity),
            "codex" => Ok(Self::Codex),
            "gemini-cli" | "gemini_cli" | "geminicli" => Ok(Self::GeminiCli),
            _ => Err(format!("Unknown provider type: {}", s)),
        }
    }
}

/// A stored upstream credential.
///
/// Owned by the external catalog; the engine only reads it. `fields` keeps
/// the full catalog entry so adapters can probe provider-specific values
/// (id tokens, stored plan types, project ids).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialRecord {
    /// Catalog file name; the key of this credential in every state map
    pub name: String,
    /// Raw provider string as reported by the catalog
    pub provider: String,
    /// Opaque index used by the authenticated-call primitive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_index: Option<String>,
    /// Whether the credential has been disabled
    #[serde(default)]
    pub disabled: bool,
    /// Whether the credential exists only in memory (no persisted file)
    #[serde(default)]
    pub runtime_only: bool,
    /// Full catalog entry
    #[serde(default)]
    pub fields: serde_json::Value,
}

impl CredentialRecord {
    /// Create a record with no extra fields.
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            auth_index: None,
            disabled: false,
            runtime_only: false,
            fields: serde_json::Value::Null,
        }
    }

    /// Set the auth index.
    pub fn with_auth_index(mut self, auth_index: impl Into<String>) -> Self {
        self.auth_index = Some(auth_index.into());
        self
    }

    /// Set the raw catalog fields.
    pub fn with_fields(mut self, fields: serde_json::Value) -> Self {
        self.fields = fields;
        self
    }

    /// Mark the record as disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Mark the record as runtime-only.
    pub fn runtime_only(mut self) -> Self {
        self.runtime_only = true;
        self
    }

    /// Parsed provider type, `None` for providers without a quota protocol.
    pub fn provider_type(&self) -> Option<ProviderType> {
        self.provider.parse().ok()
    }

    /// Check if the credential is bound to the given provider.
    pub fn is_provider(&self, provider: ProviderType) -> bool {
        self.provider_type() == Some(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!("antigravity".parse::<ProviderType>(), Ok(ProviderType::Antigravity));
        assert_eq!(" Gemini-CLI ".parse::<ProviderType>(), Ok(ProviderType::GeminiCli));
        assert_eq!("gemini_cli".parse::<ProviderType>(), Ok(ProviderType::GeminiCli));
        assert!("claude".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_provider_type_serde_matches_wire_name() {
        for provider in ProviderType::ALL {
            let json = serde_json::to_string(&provider).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", provider.as_str()));
        }
    }

    #[test]
    fn test_record_provider_match() {
        let record = CredentialRecord::new("codex-user.json", "codex").with_auth_index("7");
        assert!(record.is_provider(ProviderType::Codex));
        assert!(!record.is_provider(ProviderType::Antigravity));

        let unknown = CredentialRecord::new("claude.json", "claude");
        assert_eq!(unknown.provider_type(), None);
    }
}
