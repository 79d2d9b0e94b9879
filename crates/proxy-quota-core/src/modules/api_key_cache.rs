//! Cached primary proxy API key.

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CoreResult;
use crate::quota::ApiKeySource;

fn first_non_empty<'a>(keys: impl IntoIterator<Item = &'a String>) -> Option<String> {
    keys.into_iter().map(|key| key.trim()).find(|key| !key.is_empty()).map(str::to_string)
}

/// Lazily resolved primary API key.
///
/// Resolution runs at most once until [`ApiKeyCache::invalidate`]: local
/// keys first, then the remote listing. The lock is held across the remote
/// call so concurrent callers share one lookup.
#[derive(Debug, Default)]
pub struct ApiKeyCache {
    cached: Mutex<Option<String>>,
}

impl ApiKeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(
        &self,
        local_keys: &[String],
        source: &dyn ApiKeySource,
    ) -> CoreResult<Option<String>> {
        let mut cached = self.cached.lock().await;
        if let Some(key) = cached.as_ref() {
            return Ok(Some(key.clone()));
        }

        let resolved = match first_non_empty(local_keys) {
            Some(key) => Some(key),
            None => {
                debug!("No local API key configured, querying management API");
                first_non_empty(&source.list_api_keys().await?)
            },
        };
        cached.clone_from(&resolved);
        Ok(resolved)
    }

    /// Drop the cached key; the next resolve looks it up again.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    pub async fn cached(&self) -> Option<String> {
        self.cached.lock().await.clone()
    }
}
