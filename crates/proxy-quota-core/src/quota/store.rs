//! Per-provider quota state maps.

use std::collections::BTreeMap;

use dashmap::DashMap;
use proxy_quota_types::{AntigravityQuota, CodexQuota, GeminiCliQuota, QuotaState};
use serde::Serialize;

/// One state map per provider, keyed by credential name.
///
/// Each credential owns exactly one slot, so concurrent writers within a
/// pass never touch the same key.
#[derive(Debug, Default)]
pub struct QuotaStore {
    antigravity: DashMap<String, QuotaState<AntigravityQuota>>,
    codex: DashMap<String, QuotaState<CodexQuota>>,
    gemini_cli: DashMap<String, QuotaState<GeminiCliQuota>>,
}

/// Point-in-time copy of every state map.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct QuotaSnapshot {
    pub antigravity: BTreeMap<String, QuotaState<AntigravityQuota>>,
    pub codex: BTreeMap<String, QuotaState<CodexQuota>>,
    pub gemini_cli: BTreeMap<String, QuotaState<GeminiCliQuota>>,
}

fn copy<T: Clone>(map: &DashMap<String, QuotaState<T>>) -> BTreeMap<String, QuotaState<T>> {
    map.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect()
}

fn get_or_idle<T: Clone>(map: &DashMap<String, QuotaState<T>>, name: &str) -> QuotaState<T> {
    map.get(name).map(|entry| entry.value().clone()).unwrap_or_default()
}

impl QuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn antigravity_map(&self) -> &DashMap<String, QuotaState<AntigravityQuota>> {
        &self.antigravity
    }

    pub fn codex_map(&self) -> &DashMap<String, QuotaState<CodexQuota>> {
        &self.codex
    }

    pub fn gemini_cli_map(&self) -> &DashMap<String, QuotaState<GeminiCliQuota>> {
        &self.gemini_cli
    }

    /// State of an Antigravity credential, `Idle` when never fetched.
    pub fn antigravity(&self, name: &str) -> QuotaState<AntigravityQuota> {
        get_or_idle(&self.antigravity, name)
    }

    pub fn codex(&self, name: &str) -> QuotaState<CodexQuota> {
        get_or_idle(&self.codex, name)
    }

    pub fn gemini_cli(&self, name: &str) -> QuotaState<GeminiCliQuota> {
        get_or_idle(&self.gemini_cli, name)
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        QuotaSnapshot {
            antigravity: copy(&self.antigravity),
            codex: copy(&self.codex),
            gemini_cli: copy(&self.gemini_cli),
        }
    }

    pub fn clear(&self) {
        self.antigravity.clear();
        self.codex.clear();
        self.gemini_cli.clear();
    }
}
