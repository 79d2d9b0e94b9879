use std::fs;
use std::path::{Path, PathBuf};

use proxy_quota_types::{AppConfig, ConfigError};
use tracing::warn;
use url::Url;

use crate::error::CoreResult;
use crate::utils::paths::get_data_dir;

const CONFIG_FILE: &str = "config.json";

pub const ENV_MANAGEMENT_URL: &str = "PROXY_QUOTA_MANAGEMENT_URL";
pub const ENV_MANAGEMENT_KEY: &str = "PROXY_QUOTA_MANAGEMENT_KEY";

/// Path of the config file inside the data directory.
pub fn config_path() -> CoreResult<PathBuf> {
    Ok(get_data_dir()?.join(CONFIG_FILE))
}

/// Load `path`, then apply environment and explicit overrides, then validate.
///
/// Explicit overrides win over the environment. A missing file yields defaults.
pub fn load_config(
    path: &Path,
    base_url: Option<&str>,
    key: Option<&str>,
) -> CoreResult<AppConfig> {
    let mut config = load_config_from(path)?;
    apply_env_overrides(&mut config);
    apply_overrides(&mut config, base_url, key);
    config.validate()?;
    Ok(config)
}

/// Load a config file without overrides or validation.
pub fn load_config_from(path: &Path) -> CoreResult<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::new());
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str(&content)
        .map_err(|e| ConfigError::parse(path.display().to_string(), &e))?;
    Ok(config)
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Apply management URL/key overrides; an invalid URL is ignored.
pub fn apply_overrides(config: &mut AppConfig, base_url: Option<&str>, key: Option<&str>) {
    if let Some(url) = base_url.map(str::trim).filter(|u| !u.is_empty()) {
        if is_http_url(url) {
            config.management.base_url = url.trim_end_matches('/').to_string();
        } else {
            warn!("Ignoring invalid management URL override: {}", url);
        }
    }
    if let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) {
        config.management.key = key.to_string();
    }
}

/// Apply `PROXY_QUOTA_MANAGEMENT_URL` / `PROXY_QUOTA_MANAGEMENT_KEY`.
pub fn apply_env_overrides(config: &mut AppConfig) {
    let url = std::env::var(ENV_MANAGEMENT_URL).ok();
    let key = std::env::var(ENV_MANAGEMENT_KEY).ok();
    apply_overrides(config, url.as_deref(), key.as_deref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_applies_overrides_then_validates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"management": {"base_url": "http://10.0.0.2:8317", "timeout_secs": 0}}"#)
            .unwrap();

        let err = load_config(&path, Some("https://proxy.example.com"), Some("k")).unwrap_err();
        assert!(err.to_string().contains("management.timeout_secs"));

        fs::write(&path, r#"{"management": {"timeout_secs": 5}, "api_keys": ["sk-test"]}"#).unwrap();
        let config = load_config(&path, Some("https://proxy.example.com/"), Some("k")).unwrap();
        assert_eq!(config.management.base_url, "https://proxy.example.com");
        assert_eq!(config.management.key, "k");
        assert_eq!(config.management.timeout_secs, 5);
        assert_eq!(config.api_keys, vec!["sk-test".to_string()]);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Config parse error"));
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        apply_overrides(&mut config, Some("https://proxy.example.com/"), Some(" secret "));
        assert_eq!(config.management.base_url, "https://proxy.example.com");
        assert_eq!(config.management.key, "secret");

        apply_overrides(&mut config, Some("not a url"), None);
        assert_eq!(config.management.base_url, "https://proxy.example.com");

        apply_overrides(&mut config, Some("ftp://proxy"), Some(""));
        assert_eq!(config.management.base_url, "https://proxy.example.com");
        assert_eq!(config.management.key, "secret");
    }
}
