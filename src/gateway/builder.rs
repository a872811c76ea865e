//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::SiteGateway;
use crate::Result;
use crate::assistant::AssistantClient;
use crate::cache::CacheConfig;
use crate::generation::GenerationClient;
use crate::guard::QuotaPolicy;
use crate::orchestrator::{DEFAULT_PACING, SequentialFetcher};
use crate::providers::{GeminiClient, GeminiConfig, ImageProvider, TextProvider};
use crate::types::AspectRatio;

/// Environment variables consulted for the Gemini credential, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Main entry point for creating gateway instances.
pub struct Aerogen;

impl Aerogen {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> AerogenBuilder {
        AerogenBuilder::new()
    }
}

/// Builder for configuring gateway instances.
pub struct AerogenBuilder {
    gemini_key: Option<String>,
    gemini: GeminiConfig,
    image_provider: Option<Arc<dyn ImageProvider>>,
    text_provider: Option<Arc<dyn TextProvider>>,
    cache: CacheConfig,
    quota_policy: QuotaPolicy,
    aspect_ratio: AspectRatio,
    pacing: Duration,
}

impl AerogenBuilder {
    pub fn new() -> Self {
        Self {
            gemini_key: None,
            gemini: GeminiConfig::default(),
            image_provider: None,
            text_provider: None,
            cache: CacheConfig::default(),
            quota_policy: QuotaPolicy::default(),
            aspect_ratio: AspectRatio::default(),
            pacing: DEFAULT_PACING,
        }
    }

    /// Configure the Gemini provider. An empty key counts as no key.
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.gemini_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    /// Read the Gemini credential from the process environment
    /// (see [`API_KEY_ENV_VARS`]). Leaves the builder unchanged when unset.
    pub fn from_env(self) -> Self {
        self.from_env_with(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_env_with(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(*name))
            .find(|value| !value.trim().is_empty());
        match key {
            Some(key) => self.gemini(key),
            None => self,
        }
    }

    /// Override the Gemini API base URL (for testing with wiremock).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini.base_url = url.into();
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.gemini.image_model = model.into();
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.gemini.text_model = model.into();
        self
    }

    /// Per-request timeout for both clients.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.gemini.timeout = timeout;
        self
    }

    /// Use a custom image provider instead of Gemini.
    pub fn image_provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.image_provider = Some(provider);
        self
    }

    /// Use a custom text provider instead of Gemini.
    pub fn text_provider(mut self, provider: Arc<dyn TextProvider>) -> Self {
        self.text_provider = Some(provider);
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    pub fn quota_policy(mut self, policy: QuotaPolicy) -> Self {
        self.quota_policy = policy;
        self
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Pause between items in a sequential fetch.
    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Whether any provider is configured.
    fn has_provider(&self) -> bool {
        self.gemini_key.is_some() || self.image_provider.is_some() || self.text_provider.is_some()
    }

    /// Build the gateway.
    ///
    /// Without a credential the gateway still builds; its clients fall back
    /// to their fixed no-provider behaviour.
    pub fn build(self) -> Result<SiteGateway> {
        if !self.has_provider() {
            info!("no Gemini credential configured, generative features disabled");
        }

        let gemini = match &self.gemini_key {
            Some(key) => Some(Arc::new(GeminiClient::with_config(
                key.clone(),
                self.gemini.clone(),
            )?)),
            None => None,
        };

        let image_provider = self
            .image_provider
            .or_else(|| gemini.clone().map(|g| g as Arc<dyn ImageProvider>));
        let text_provider = self
            .text_provider
            .or_else(|| gemini.map(|g| g as Arc<dyn TextProvider>));

        let generation = GenerationClient::builder()
            .provider_opt(image_provider)
            .cache(self.cache)
            .quota_policy(self.quota_policy)
            .aspect_ratio(self.aspect_ratio)
            .timeout(self.gemini.timeout)
            .build();
        let assistant = AssistantClient::new(text_provider).timeout(self.gemini.timeout);
        let fetcher = SequentialFetcher::new(generation.clone()).pacing(self.pacing);

        Ok(SiteGateway {
            generation,
            assistant,
            fetcher,
        })
    }
}

impl Default for AerogenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_no_key() {
        let builder = Aerogen::builder().gemini("   ");
        assert!(!builder.has_provider());
    }

    #[test]
    fn env_lookup_prefers_gemini_key() {
        let builder = Aerogen::builder().from_env_with(|name| match name {
            "GEMINI_API_KEY" => Some("primary".into()),
            "API_KEY" => Some("secondary".into()),
            _ => None,
        });
        assert_eq!(builder.gemini_key.as_deref(), Some("primary"));
    }

    #[test]
    fn env_lookup_falls_back_to_api_key() {
        let builder = Aerogen::builder().from_env_with(|name| match name {
            "GEMINI_API_KEY" => Some(String::new()),
            "API_KEY" => Some("secondary".into()),
            _ => None,
        });
        assert_eq!(builder.gemini_key.as_deref(), Some("secondary"));
    }

    #[test]
    fn env_lookup_without_vars_leaves_builder_unconfigured() {
        let builder = Aerogen::builder().from_env_with(|_| None);
        assert!(!builder.has_provider());
    }

    #[tokio::test]
    async fn build_without_credential_degrades() {
        let gateway = Aerogen::builder().build().unwrap();
        assert!(!gateway.generation().has_provider());
        assert!(!gateway.assistant().has_provider());
    }
}
