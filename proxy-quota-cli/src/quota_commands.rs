use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;

use proxy_quota_client::{ClientConfig, ManagementClient};
use proxy_quota_core::quota::QuotaSnapshot;
use proxy_quota_core::{QuotaOrchestrator, RefreshSummary};
use proxy_quota_types::{
    AntigravityQuota, AppConfig, CodexQuota, GeminiCliQuota, ProviderType, QuotaState,
};

#[derive(Serialize)]
struct RefreshOutput<'a> {
    summaries: &'a [RefreshSummary],
    snapshot: &'a QuotaSnapshot,
}

fn build_orchestrator(config: AppConfig) -> Result<QuotaOrchestrator> {
    let client = Arc::new(
        ManagementClient::new(ClientConfig::from(&config.management))
            .context("Failed to create management client")?,
    );
    Ok(QuotaOrchestrator::new(config, client.clone(), client.clone(), client))
}

pub async fn refresh(
    config: AppConfig,
    provider: Option<ProviderType>,
    json: bool,
    force: bool,
) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;

    let summaries: Vec<RefreshSummary> = match provider {
        Some(provider) => vec![orchestrator.refresh_provider(provider, force).await?],
        None => orchestrator.refresh(force).await?.summaries().to_vec(),
    };
    let snapshot = orchestrator.store().snapshot();

    if json {
        let output = RefreshOutput { summaries: &summaries, snapshot: &snapshot };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Provider", "Credential", "Status", "Details"]);

    for summary in &summaries {
        match summary.provider {
            ProviderType::Antigravity => {
                add_rows(&mut table, summary.provider, &snapshot.antigravity, antigravity_details)
            },
            ProviderType::Codex => {
                add_rows(&mut table, summary.provider, &snapshot.codex, codex_details)
            },
            ProviderType::GeminiCli => {
                add_rows(&mut table, summary.provider, &snapshot.gemini_cli, gemini_cli_details)
            },
        }
    }

    if table.row_count() == 0 {
        println!("{}", "No matching credentials found.".yellow());
    } else {
        println!("{table}");
    }

    for summary in &summaries {
        println!(
            "{}: {} checked, {} ok, {}",
            summary.provider.display_name(),
            summary.dispatched,
            summary.succeeded,
            if summary.failed > 0 {
                format!("{} failed", summary.failed).red().to_string()
            } else {
                "0 failed".to_string()
            }
        );
    }
    Ok(())
}

pub async fn test_command(config: AppConfig, model: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    match orchestrator.test_command(model).await? {
        Some(command) => println!("{command}"),
        None => println!("{}", "No proxy API key available.".yellow()),
    }
    Ok(())
}

fn add_rows<T>(
    table: &mut Table,
    provider: ProviderType,
    states: &std::collections::BTreeMap<String, QuotaState<T>>,
    details: fn(&T) -> String,
) {
    for (name, state) in states {
        let (status, detail) = match state {
            QuotaState::Success { data } => (Cell::new("ok").fg(Color::Green), details(data)),
            QuotaState::Error { message, status } => {
                let detail = match status {
                    Some(code) => format!("{message} ({code})"),
                    None => message.clone(),
                };
                (Cell::new("error").fg(Color::Red), detail)
            },
            QuotaState::Loading => (Cell::new("loading").fg(Color::Yellow), String::new()),
            QuotaState::Idle => (Cell::new("idle"), String::new()),
        };
        table.add_row(vec![
            Cell::new(provider.display_name()),
            Cell::new(name),
            status,
            Cell::new(detail),
        ]);
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |p| format!("{:.0}%", p))
}

fn fraction_percent(value: Option<f64>) -> String {
    percent(value.map(|f| f * 100.0))
}

fn antigravity_details(quota: &AntigravityQuota) -> String {
    let mut lines: Vec<String> = quota
        .groups
        .iter()
        .map(|g| format!("{}: {}", g.label, percent(g.remaining_percent())))
        .collect();
    if let Some(tier) = &quota.subscription_tier {
        lines.insert(0, format!("tier: {tier}"));
    }
    lines.join("\n")
}

fn codex_details(quota: &CodexQuota) -> String {
    let mut lines: Vec<String> = quota
        .windows
        .iter()
        .map(|w| format!("{}: {} used, resets {}", w.label, percent(w.used_percent), w.reset_label))
        .collect();
    if let Some(plan) = &quota.plan_type {
        lines.insert(0, format!("plan: {plan}"));
    }
    lines.join("\n")
}

fn gemini_cli_details(quota: &GeminiCliQuota) -> String {
    quota
        .buckets
        .iter()
        .map(|b| {
            let mut line = format!("{}: {}", b.model_id, fraction_percent(b.remaining_fraction));
            if let Some(token_type) = &b.token_type {
                line.push_str(&format!(" [{token_type}]"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxy_quota_types::{CodexQuotaWindow, GeminiCliQuotaBucket};

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(None), "-");
        assert_eq!(percent(Some(42.4)), "42%");
        assert_eq!(fraction_percent(Some(0.5)), "50%");
    }

    #[test]
    fn test_codex_details_lists_plan_first() {
        let quota = CodexQuota {
            windows: vec![CodexQuotaWindow {
                id: "five-hour".to_string(),
                label: "5h limit".to_string(),
                used_percent: Some(30.0),
                reset_label: "-".to_string(),
            }],
            plan_type: Some("plus".to_string()),
        };
        assert_eq!(codex_details(&quota), "plan: plus\n5h limit: 30% used, resets -");
    }

    #[test]
    fn test_gemini_cli_details_include_token_type() {
        let quota = GeminiCliQuota {
            buckets: vec![GeminiCliQuotaBucket {
                model_id: "gemini-2.5-pro".to_string(),
                token_type: Some("REQUESTS".to_string()),
                remaining_fraction: Some(0.25),
                remaining_amount: None,
                reset_time: None,
                model_ids: vec!["gemini-2.5-pro".to_string()],
            }],
        };
        assert_eq!(gemini_cli_details(&quota), "gemini-2.5-pro: 25% [REQUESTS]");
    }
}
