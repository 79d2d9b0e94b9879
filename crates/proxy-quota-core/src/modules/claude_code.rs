//! Claude Code CLI model mapping in `~/.claude/settings.json`.
//!
//! Only the three model keys are touched; every other setting is preserved.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use proxy_quota_types::ClaudeCodeModels;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

pub fn settings_path() -> CoreResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CoreError::Unknown("Cannot determine home directory".into()))?;
    Ok(home.join(".claude").join("settings.json"))
}

fn read_settings(path: &Path) -> CoreResult<Option<Map<String, Value>>> {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            _ => Ok(None),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read the mapping; a missing or unparseable file reads as empty.
pub fn read_models(path: &Path) -> CoreResult<ClaudeCodeModels> {
    let Some(settings) = read_settings(path)? else {
        return Ok(ClaudeCodeModels::default());
    };
    let get = |key: &str| settings.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

    Ok(ClaudeCodeModels {
        opus_model: get("opus_model"),
        sonnet_model: get("sonnet_model"),
        haiku_model: get("haiku_model"),
    })
}

/// Write the mapping. Inputs are trimmed and an empty value removes its key.
pub fn write_models(path: &Path, models: &ClaudeCodeModels) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut settings = read_settings(path)?.unwrap_or_default();

    for (key, value) in models.entries() {
        let value = value.trim();
        if value.is_empty() {
            settings.remove(key);
        } else {
            settings.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    let output = serde_json::to_string_pretty(&Value::Object(settings))?;
    fs::write(path, output)?;
    Ok(())
}

pub fn load_models() -> CoreResult<ClaudeCodeModels> {
    read_models(&settings_path()?)
}

pub fn save_models(models: &ClaudeCodeModels) -> CoreResult<()> {
    write_models(&settings_path()?, models)
}
