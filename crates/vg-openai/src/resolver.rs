//! Model resolution with a time-limited cache of available models

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::ClientResult;
use crate::TextGenerationBackend;

/// How long a fetched model list stays valid
pub const DEFAULT_CACHE_HOURS: u32 = 6;

/// Value meaning "pick for me"
const AUTO: &str = "auto";

#[derive(Debug, Clone)]
struct CachedModels {
    ids: Vec<String>,
    fetched_at: DateTime<Utc>,
}

/// Resolves `"auto"` to a concrete model using a cached model listing
///
/// The cache is invalidated by age only.
pub struct ModelResolver {
    cache: Mutex<Option<CachedModels>>,
    ttl: Duration,
}

impl ModelResolver {
    /// Create a resolver whose cache lives `cache_hours` hours
    pub fn new(cache_hours: u32) -> Self {
        Self {
            cache: Mutex::new(None),
            ttl: Duration::hours(i64::from(cache_hours)),
        }
    }

    /// Resolve the model to use, fetching the listing when needed
    ///
    /// A concrete `desired` model is returned as is. Otherwise the first
    /// entry of `prefer` that is available wins, then the first available
    /// model, then `None`.
    pub async fn resolve(
        &self,
        backend: &dyn TextGenerationBackend,
        api_key: &str,
        desired: Option<&str>,
        prefer: &[String],
    ) -> ClientResult<Option<String>> {
        self.resolve_at(backend, api_key, desired, prefer, Utc::now())
            .await
    }

    /// Same as [`resolve`](Self::resolve) with an explicit clock reading
    pub async fn resolve_at(
        &self,
        backend: &dyn TextGenerationBackend,
        api_key: &str,
        desired: Option<&str>,
        prefer: &[String],
        now: DateTime<Utc>,
    ) -> ClientResult<Option<String>> {
        if let Some(model) = desired.map(str::trim).filter(|m| !m.is_empty() && *m != AUTO) {
            return Ok(Some(model.to_string()));
        }

        let ids = match self.cached_ids(now) {
            Some(ids) => {
                debug!(count = ids.len(), "Using cached model list");
                ids
            }
            None => {
                let ids = backend.list_models(api_key).await?;
                info!(count = ids.len(), "Refreshed model list");
                self.store(ids.clone(), now);
                ids
            }
        };

        Ok(choose_model(&ids, prefer))
    }

    fn cached_ids(&self, now: DateTime<Utc>) -> Option<Vec<String>> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .as_ref()
            .filter(|c| now - c.fetched_at <= self.ttl)
            .map(|c| c.ids.clone())
    }

    fn store(&self, ids: Vec<String>, fetched_at: DateTime<Utc>) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *cache = Some(CachedModels { ids, fetched_at });
    }

    /// Forget the cached listing
    pub fn reset(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *cache = None;
    }
}

impl Default for ModelResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_HOURS)
    }
}

fn choose_model(ids: &[String], prefer: &[String]) -> Option<String> {
    prefer
        .iter()
        .find(|p| ids.contains(*p))
        .or_else(|| ids.first())
        .cloned()
}
