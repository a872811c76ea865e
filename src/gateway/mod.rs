//! Gateway facade over the generation, assistant and fetch components.

mod builder;

pub use builder::{API_KEY_ENV_VARS, Aerogen, AerogenBuilder};

use crate::assistant::AssistantClient;
use crate::generation::GenerationClient;
use crate::orchestrator::{FetchSession, SequentialFetcher};
use crate::types::{CatalogItem, ImagePayload};

/// One session's worth of generative features.
///
/// Cheap to clone; clones share the image cache and quota guard.
#[derive(Clone)]
pub struct SiteGateway {
    generation: GenerationClient,
    assistant: AssistantClient,
    fetcher: SequentialFetcher,
}

impl SiteGateway {
    /// See [`GenerationClient::request_image`].
    pub async fn request_image(
        &self,
        title: &str,
        description: &str,
        prompt: Option<&str>,
    ) -> Option<ImagePayload> {
        self.generation
            .request_image(title, description, prompt)
            .await
    }

    /// See [`AssistantClient::answer_query`].
    pub async fn answer_query(&self, query: &str) -> String {
        self.assistant.answer_query(query).await
    }

    /// Once-per-mount sequential fetch over `items`.
    pub fn fetch_session(&self, items: Vec<CatalogItem>) -> FetchSession {
        self.fetcher.session(items)
    }

    pub fn generation(&self) -> &GenerationClient {
        &self.generation
    }

    pub fn assistant(&self) -> &AssistantClient {
        &self.assistant
    }

    pub fn fetcher(&self) -> &SequentialFetcher {
        &self.fetcher
    }
}
