//! Free-tier model catalogue from OpenRouter, cached in memory.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::tailor::Provider;

const OPENROUTER_MODELS_URL: &str = "https://openrouter.ai/api/v1/models";
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Context length assumed for OpenRouter models that do not report one.
pub const DEFAULT_CONTEXT_LENGTH: u32 = 8192;
pub const GROK_CONTEXT_LENGTH: u32 = 4000;
pub const GROK_MODEL: &str = "grok-beta";

const FALLBACK_MODELS: [&str; 4] = [
    "meta-llama/llama-3.1-8b-instruct:free",
    "mistralai/mixtral-8x7b-instruct:free",
    "google/gemma-2-9b-it:free",
    "qwen/qwen-2-7b-instruct:free",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeModel {
    pub id: String,
    pub context_length: Option<u32>,
}

pub fn fallback_models() -> Vec<FreeModel> {
    FALLBACK_MODELS
        .iter()
        .map(|id| FreeModel {
            id: id.to_string(),
            context_length: Some(DEFAULT_CONTEXT_LENGTH),
        })
        .collect()
}

/// Context limit used for the token check.
pub fn token_limit(models: &[FreeModel], provider: Provider, model: &str) -> u32 {
    match provider {
        Provider::Grok => GROK_CONTEXT_LENGTH,
        Provider::OpenRouter => models
            .iter()
            .find(|m| m.id == model)
            .and_then(|m| m.context_length)
            .unwrap_or(DEFAULT_CONTEXT_LENGTH),
    }
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    id: String,
    #[serde(default)]
    pricing: Option<Pricing>,
    #[serde(default, alias = "max_context_length")]
    context_length: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Pricing {
    #[serde(default)]
    prompt: Option<String>,
}

fn free_models(list: ModelList) -> Vec<FreeModel> {
    list.data
        .into_iter()
        .filter(|m| {
            m.pricing
                .as_ref()
                .and_then(|p| p.prompt.as_deref())
                .is_some_and(|price| price == "0")
        })
        .map(|m| FreeModel {
            id: m.id,
            context_length: m.context_length,
        })
        .collect()
}

struct Cached {
    fetched_at: Instant,
    models: Vec<FreeModel>,
}

pub struct ModelCatalog {
    client: Client,
    cache: RwLock<Option<Cached>>,
}

impl ModelCatalog {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: RwLock::new(None),
        }
    }

    /// A catalogue that starts with `models` already cached.
    pub fn with_models(client: Client, models: Vec<FreeModel>) -> Self {
        Self {
            client,
            cache: RwLock::new(Some(Cached {
                fetched_at: Instant::now(),
                models,
            })),
        }
    }

    /// Free models, refreshed at most once a day. Falls back to a fixed list
    /// when OpenRouter cannot be reached; the fallback is not cached.
    pub async fn models(&self) -> Vec<FreeModel> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fetched_at.elapsed() < CACHE_TTL {
                return cached.models.clone();
            }
        }

        match self.fetch().await {
            Ok(models) if !models.is_empty() => {
                info!(count = models.len(), "Fetched free OpenRouter models");
                *self.cache.write().await = Some(Cached {
                    fetched_at: Instant::now(),
                    models: models.clone(),
                });
                models
            }
            Ok(_) => {
                warn!("OpenRouter reported no free models; using fallback list");
                fallback_models()
            }
            Err(e) => {
                warn!("Failed to fetch OpenRouter models: {e}; using fallback list");
                fallback_models()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<FreeModel>, reqwest::Error> {
        let list: ModelList = self
            .client
            .get(OPENROUTER_MODELS_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(free_models(list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_only_zero_priced_models_are_free() {
        let list: ModelList = serde_json::from_value(json!({
            "data": [
                { "id": "free/a", "pricing": { "prompt": "0" }, "context_length": 32768 },
                { "id": "paid/b", "pricing": { "prompt": "0.000001" }, "context_length": 8192 },
                { "id": "free/c", "pricing": { "prompt": "0" }, "max_context_length": 4096 },
                { "id": "unpriced/d" }
            ]
        }))
        .unwrap();

        let models = free_models(list);
        assert_eq!(
            models,
            vec![
                FreeModel { id: "free/a".into(), context_length: Some(32768) },
                FreeModel { id: "free/c".into(), context_length: Some(4096) },
            ]
        );
    }

    #[test]
    fn test_token_limit_by_provider() {
        let models = vec![
            FreeModel { id: "free/a".into(), context_length: Some(32768) },
            FreeModel { id: "free/b".into(), context_length: None },
        ];
        assert_eq!(token_limit(&models, Provider::Grok, GROK_MODEL), 4000);
        assert_eq!(token_limit(&models, Provider::OpenRouter, "free/a"), 32768);
        assert_eq!(token_limit(&models, Provider::OpenRouter, "free/b"), 8192);
        assert_eq!(token_limit(&models, Provider::OpenRouter, "unknown"), 8192);
    }

    #[tokio::test]
    async fn test_fresh_cache_is_served_without_fetching() {
        let models = vec![FreeModel { id: "cached/x".into(), context_length: Some(1000) }];
        let catalog = ModelCatalog::with_models(Client::new(), models.clone());
        assert_eq!(catalog.models().await, models);
    }

    #[test]
    fn test_fallback_list_has_default_limits() {
        let models = fallback_models();
        assert_eq!(models.len(), 4);
        assert!(models.iter().all(|m| m.context_length == Some(8192)));
    }
}
