//! Model catalogue and wildcard expansion
//!
//! Harnesses list the models they support, optionally with `provider/*` or `*`/`all`
//! tokens. Those tokens are resolved against a catalogue fetched from a JSON registry
//! shaped like `{ provider: { "models": { id: { "name": .., "status": .. } } } }`.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::agent::error::ModelError;
use crate::data::dedup_preserving_order;

/// Token that expands to every active model
const ALL_TOKENS: &[&str] = &["*", "all"];

/// Information about a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub provider: String,
    /// Model id within the provider
    pub id: String,
    /// Display name for UI
    pub display_name: String,
    /// Inactive (deprecated) models are skipped by wildcard expansion
    pub active: bool,
}

impl ModelInfo {
    pub fn new(provider: &str, id: &str) -> Self {
        Self {
            provider: provider.to_string(),
            id: id.to_string(),
            display_name: id.to_string(),
            active: true,
        }
    }

    /// Identifier passed to harness templates (`provider/id`)
    pub fn qualified_id(&self) -> String {
        format!("{}/{}", self.provider, self.id)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryProvider {
    #[serde(default)]
    models: BTreeMap<String, RegistryModel>,
}

#[derive(Debug, Deserialize)]
struct RegistryModel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Catalogue of known models
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelInfo>) -> Self {
        Self { models }
    }

    /// Parse the registry JSON document
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let providers: BTreeMap<String, RegistryProvider> = serde_json::from_str(json)?;
        let models = providers
            .into_iter()
            .flat_map(|(provider, entry)| {
                entry.models.into_iter().map(move |(id, model)| ModelInfo {
                    provider: provider.clone(),
                    display_name: model.name.unwrap_or_else(|| id.clone()),
                    active: model.status.as_deref() != Some("deprecated"),
                    id,
                })
            })
            .collect();
        Ok(Self { models })
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    /// Resolve a harness's model tokens into concrete, deduplicated model ids
    pub fn expand(&self, tokens: &[String]) -> Vec<String> {
        let active = || self.models.iter().filter(|m| m.active);
        let expanded = tokens.iter().flat_map(|token| {
            let token = token.trim();
            if ALL_TOKENS.contains(&token) {
                active().map(ModelInfo::qualified_id).collect::<Vec<_>>()
            } else if let Some(provider) = token.strip_suffix("/*") {
                active()
                    .filter(|m| m.provider == provider)
                    .map(ModelInfo::qualified_id)
                    .collect()
            } else {
                vec![token.to_string()]
            }
        });
        dedup_preserving_order(expanded)
    }
}

/// Fixed-interval retry policy for best-effort fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Delay between attempts
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            interval: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds or attempts are exhausted, returning the last error
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    tracing::debug!(attempt, error = %e, "Retrying after failure");
                    tokio::time::sleep(self.interval).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Source of the model catalogue
#[async_trait]
pub trait ModelSource: Send + Sync {
    async fn fetch(&self) -> Result<ModelCatalog, ModelError>;
}

/// Fetches the catalogue over HTTP; an unset URL yields an empty catalogue
#[derive(Debug, Clone)]
pub struct HttpModelSource {
    url: Option<String>,
    client: reqwest::Client,
}

impl HttpModelSource {
    pub fn new(url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { url, client }
    }
}

#[async_trait]
impl ModelSource for HttpModelSource {
    async fn fetch(&self) -> Result<ModelCatalog, ModelError> {
        let Some(url) = &self.url else {
            return Ok(ModelCatalog::default());
        };
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        ModelCatalog::from_json(&body)
    }
}
