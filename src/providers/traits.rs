//! Provider traits for capability-specific implementations.
//!
//! The clients in this crate never talk HTTP directly; they hold an
//! `Arc<dyn ImageProvider>` / `Arc<dyn TextProvider>`. This keeps the cache,
//! guard and pacing logic testable against in-process mocks and lets a host
//! swap the Gemini backend for another vendor.
//!
//! Providers return raw [`Result`]s. Classification (quota vs transient) and
//! the "never fail to the caller" contract live in the clients.

use async_trait::async_trait;

use crate::Result;
use crate::types::{ImagePayload, ImageRequest};

/// Provider for single-image generation.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Generate one image.
    ///
    /// Returns `Ok(None)` when the provider answered successfully but the
    /// response held no inline image part.
    async fn generate_image(&self, request: &ImageRequest) -> Result<Option<ImagePayload>>;
}

/// Provider for short free-text answers.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Answer `query` under the given system instruction.
    ///
    /// Returns the provider's text verbatim, or
    /// [`AerogenError::EmptyResponse`](crate::AerogenError::EmptyResponse)
    /// when the provider produced no text.
    async fn answer(&self, system_instruction: &str, query: &str) -> Result<String>;
}
