//! Product image generation with session caching and quota protection.
//!
//! [`GenerationClient::request_image`] never fails: every error is
//! classified, logged and turned into `None`, and the caller keeps showing
//! its static fallback image.
//!
//! | outcome                       | network | cache    | guard    |
//! |-------------------------------|---------|----------|----------|
//! | guard already tripped         | no      | -        | -        |
//! | cache hit                     | no      | read     | -        |
//! | no credential                 | no      | -        | -        |
//! | success with image            | 1 call  | insert   | -        |
//! | success without image         | 1 call  | -        | -        |
//! | quota/billing failure         | 1 call  | -        | trip     |
//! | other failure or timeout      | 1 call  | -        | -        |

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, instrument, warn};

use crate::cache::{CacheConfig, CacheKey, ImageCache};
use crate::guard::{QuotaGuard, QuotaPolicy};
use crate::providers::ImageProvider;
use crate::providers::gemini::DEFAULT_TIMEOUT;
use crate::telemetry;
use crate::types::{AspectRatio, ImagePayload, ImageRequest};
use crate::{AerogenError, Result};

/// Build the descriptive generation prompt for an item.
///
/// `context` is the item's explicit prompt when it has one, otherwise its
/// description.
pub fn product_prompt(title: &str, context: &str) -> String {
    format!(
        "Professional cinematic product photography of a high-tech drone named \"{title}\". \
         Context: {context}. The drone should be sleek, modern, and realistic. High resolution, \
         8k, studio lighting or dramatic outdoor setting relevant to the description. \
         No text overlays."
    )
}

struct Inner {
    provider: Option<Arc<dyn ImageProvider>>,
    cache: ImageCache,
    guard: QuotaGuard,
    policy: QuotaPolicy,
    aspect_ratio: AspectRatio,
    timeout: Duration,
}

/// Session-scoped image generation client.
///
/// Owns the [`ImageCache`] and [`QuotaGuard`]; clones share both, so one
/// client per session (or per test) is the unit of isolation.
#[derive(Clone)]
pub struct GenerationClient {
    inner: Arc<Inner>,
}

impl GenerationClient {
    /// Client with default cache, policy and timeout.
    ///
    /// `provider` is `None` when no credential is configured; every request
    /// then resolves to `None` without network access.
    pub fn new(provider: Option<Arc<dyn ImageProvider>>) -> Self {
        GenerationClientBuilder::new().provider_opt(provider).build()
    }

    pub fn builder() -> GenerationClientBuilder {
        GenerationClientBuilder::new()
    }

    /// Request a generated image for an item.
    ///
    /// The cache key and the prompt's context use `prompt` when given,
    /// otherwise `description`.
    #[instrument(skip_all, fields(title = %title))]
    pub async fn request_image(
        &self,
        title: &str,
        description: &str,
        prompt: Option<&str>,
    ) -> Option<ImagePayload> {
        let inner = &self.inner;

        if inner.guard.is_tripped() {
            metrics::counter!(telemetry::SHORT_CIRCUITS_TOTAL).increment(1);
            debug!("quota guard tripped, skipping image generation");
            return None;
        }

        let key = CacheKey::for_request(title, description, prompt);
        if let Some(cached) = inner.cache.get(&key).await {
            debug!(key = %key, "image cache hit");
            return Some(cached);
        }

        let Some(provider) = inner.provider.as_ref() else {
            debug!("no image provider configured");
            return None;
        };

        let request = ImageRequest::new(product_prompt(title, prompt.unwrap_or(description)))
            .aspect_ratio(inner.aspect_ratio);

        match self.call_provider(provider.as_ref(), &request).await {
            Ok(Some(payload)) => {
                inner.cache.insert(key, payload.clone()).await;
                Some(payload)
            }
            Ok(None) => {
                warn!(provider = provider.name(), "provider response held no image");
                None
            }
            Err(e) if inner.policy.is_quota_exhaustion(&e) => {
                if inner.guard.trip() {
                    warn!(
                        provider = provider.name(),
                        status = ?e.status(),
                        retry_after = ?e.retry_after(),
                        error = %e,
                        "quota or billing limit hit, disabling image generation for this session"
                    );
                }
                None
            }
            Err(e) => {
                error!(
                    provider = provider.name(),
                    status = ?e.status(),
                    transient = e.is_transient(),
                    error = %e,
                    "image generation failed"
                );
                None
            }
        }
    }

    /// Request an image for a [`CatalogItem`](crate::CatalogItem).
    pub async fn request_item_image(&self, item: &crate::CatalogItem) -> Option<ImagePayload> {
        self.request_image(&item.title, &item.description, item.prompt.as_deref())
            .await
    }

    async fn call_provider(
        &self,
        provider: &dyn ImageProvider,
        request: &ImageRequest,
    ) -> Result<Option<ImagePayload>> {
        let start = Instant::now();
        let result = tokio::time::timeout(self.inner.timeout, provider.generate_image(request))
            .await
            .unwrap_or(Err(AerogenError::Timeout));

        let status = match &result {
            Ok(Some(_)) => "ok",
            Ok(None) => "empty",
            Err(_) => "error",
        };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "operation" => telemetry::OP_GENERATE_IMAGE,
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "operation" => telemetry::OP_GENERATE_IMAGE,
        )
        .record(start.elapsed().as_secs_f64());

        result
    }

    /// Whether the quota guard has tripped this session.
    pub fn is_quota_exhausted(&self) -> bool {
        self.inner.guard.is_tripped()
    }

    /// Whether an image for these inputs is already cached.
    pub fn is_cached(&self, title: &str, description: &str, prompt: Option<&str>) -> bool {
        self.inner
            .cache
            .contains(&CacheKey::for_request(title, description, prompt))
    }

    /// Number of cached images.
    pub async fn cached_images(&self) -> u64 {
        self.inner.cache.run_pending_tasks().await;
        self.inner.cache.len()
    }

    /// Whether a provider (credential) is configured.
    pub fn has_provider(&self) -> bool {
        self.inner.provider.is_some()
    }
}

/// Builder for [`GenerationClient`].
pub struct GenerationClientBuilder {
    provider: Option<Arc<dyn ImageProvider>>,
    cache: CacheConfig,
    policy: QuotaPolicy,
    aspect_ratio: AspectRatio,
    timeout: Duration,
}

impl GenerationClientBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            cache: CacheConfig::default(),
            policy: QuotaPolicy::default(),
            aspect_ratio: AspectRatio::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn provider_opt(mut self, provider: Option<Arc<dyn ImageProvider>>) -> Self {
        self.provider = provider;
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    pub fn quota_policy(mut self, policy: QuotaPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Upper bound on a single provider call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> GenerationClient {
        GenerationClient {
            inner: Arc::new(Inner {
                provider: self.provider,
                cache: ImageCache::new(&self.cache),
                guard: QuotaGuard::new(),
                policy: self.policy,
                aspect_ratio: self.aspect_ratio,
                timeout: self.timeout,
            }),
        }
    }
}

impl Default for GenerationClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_title_and_context() {
        let prompt = product_prompt("The Vanguard X100", "rugged airframe");
        assert!(prompt.contains("named \"The Vanguard X100\""));
        assert!(prompt.contains("Context: rugged airframe."));
        assert!(prompt.ends_with("No text overlays."));
    }

    #[tokio::test]
    async fn no_provider_yields_none() {
        let client = GenerationClient::new(None);
        assert!(!client.has_provider());
        assert!(client.request_image("t", "d", None).await.is_none());
        assert!(!client.is_quota_exhausted());
        assert_eq!(client.cached_images().await, 0);
    }
}
