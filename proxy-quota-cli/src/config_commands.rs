use anyhow::{Context, Result};
use colored::Colorize;

use proxy_quota_core::modules::claude_code;
use proxy_quota_types::{AppConfig, ClaudeCodeModels};

pub fn show_config(config: &AppConfig, json: bool) -> Result<()> {
    let mut redacted = config.clone();
    redacted.management.key = mask_key(&config.management.key);
    redacted.api_keys = config.api_keys.iter().map(|k| mask_key(k)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&redacted)?);
        return Ok(());
    }

    println!("{}", "Management API:".cyan().bold());
    println!("  URL: {}", redacted.management.base_url);
    println!("  Key: {}", display_or_dash(&redacted.management.key));
    println!("  Timeout: {}s", redacted.management.timeout_secs);
    println!("{}", "Endpoints:".cyan().bold());
    println!("  Antigravity quota: {}", redacted.endpoints.antigravity_quota_urls.join(", "));
    println!("  Antigravity tier: {}", redacted.endpoints.antigravity_tier_urls.join(", "));
    println!("  Codex usage: {}", redacted.endpoints.codex_usage_url);
    println!("  Gemini CLI quota: {}", redacted.endpoints.gemini_cli_quota_url);
    println!("  Default project: {}", redacted.default_project_id);
    println!("  Local API keys: {}", redacted.api_keys.len());
    Ok(())
}

pub fn show_claude_config(json: bool) -> Result<()> {
    let models = claude_code::load_models().context("Failed to read Claude Code settings")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!("{}", "Claude Code model mapping:".cyan().bold());
    for (key, value) in models.entries() {
        println!("  {}: {}", key, display_or_dash(value));
    }
    Ok(())
}

/// Overlay the given values on the stored mapping; unspecified tiers are kept.
pub fn set_claude_config(
    opus: Option<&str>,
    sonnet: Option<&str>,
    haiku: Option<&str>,
) -> Result<()> {
    if opus.is_none() && sonnet.is_none() && haiku.is_none() {
        anyhow::bail!("Specify at least one of --opus, --sonnet or --haiku");
    }

    let current = claude_code::load_models().context("Failed to read Claude Code settings")?;
    let updated = merge_models(current, opus, sonnet, haiku);
    claude_code::save_models(&updated).context("Failed to write Claude Code settings")?;

    println!("{} Claude Code settings updated", "✓".green());
    Ok(())
}

fn merge_models(
    current: ClaudeCodeModels,
    opus: Option<&str>,
    sonnet: Option<&str>,
    haiku: Option<&str>,
) -> ClaudeCodeModels {
    ClaudeCodeModels {
        opus_model: opus.map_or(current.opus_model, str::to_string),
        sonnet_model: sonnet.map_or(current.sonnet_model, str::to_string),
        haiku_model: haiku.map_or(current.haiku_model, str::to_string),
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
