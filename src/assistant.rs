//! Site navigation assistant.
//!
//! Answers free-text questions about the site in a couple of sentences,
//! pointing the visitor at the relevant section. Independent of the image
//! cache and quota guard: no caching, no circuit breaking, no retries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, instrument};

use crate::AerogenError;
use crate::providers::TextProvider;
use crate::providers::gemini::DEFAULT_TIMEOUT;
use crate::telemetry;

/// Returned when no credential is configured.
pub const MISSING_KEY_MESSAGE: &str =
    "API Key is missing. Please configure the environment to use the AI assistant.";

/// Returned when the provider answers with no text.
pub const EMPTY_ANSWER_MESSAGE: &str =
    "I couldn't find specific information on that. Please check our 'Solutions' tab.";

/// Returned on any provider or network failure.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Sorry, I'm having trouble connecting to the network right now.";

/// System instruction scoping the assistant to the site's sections.
pub const SYSTEM_INSTRUCTION: &str = "\
You are the AI Assistant for Volatus Aerospace.
Your goal is to help users navigate the website and understand our services.

Our main sections are:
- Solutions: Industrial inspections, Cargo, Defense, Environmental.
- Products: Enterprise Drones, Sensors, Software.
- Training: Pilot certification, Advanced Ops.
- Company: Investors, Careers.

Keep answers short (under 50 words) and direct the user to the relevant section.
If they ask about stock, mention \"Investors\".
If they ask about drones, mention \"Products\".
If they ask about flight school, mention \"Training\".";

/// One-shot question answering against a [`TextProvider`].
#[derive(Clone)]
pub struct AssistantClient {
    provider: Option<Arc<dyn TextProvider>>,
    timeout: Duration,
}

impl AssistantClient {
    /// `provider` is `None` when no credential is configured.
    pub fn new(provider: Option<Arc<dyn TextProvider>>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Upper bound on a single provider call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Answer a visitor's question. Never fails; see the message constants
    /// for the fallback texts.
    #[instrument(skip_all, fields(query_len = query.len()))]
    pub async fn answer_query(&self, query: &str) -> String {
        let Some(provider) = self.provider.as_ref() else {
            return MISSING_KEY_MESSAGE.to_string();
        };

        let start = Instant::now();
        let result =
            tokio::time::timeout(self.timeout, provider.answer(SYSTEM_INSTRUCTION, query)).await;
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "operation" => telemetry::OP_ANSWER_QUERY,
        )
        .record(start.elapsed().as_secs_f64());

        let (status, answer) = match result {
            Ok(Ok(text)) if text.trim().is_empty() => ("empty", EMPTY_ANSWER_MESSAGE.to_string()),
            Ok(Err(AerogenError::EmptyResponse)) => ("empty", EMPTY_ANSWER_MESSAGE.to_string()),
            Ok(Ok(text)) => ("ok", text),
            Ok(Err(e)) => {
                error!(provider = provider.name(), error = %e, "assistant query failed");
                ("error", NETWORK_ERROR_MESSAGE.to_string())
            }
            Err(_) => {
                error!(
                    provider = provider.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "assistant query timed out"
                );
                ("error", NETWORK_ERROR_MESSAGE.to_string())
            }
        };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "operation" => telemetry::OP_ANSWER_QUERY,
            "status" => status,
        )
        .increment(1);

        answer
    }

    /// Whether a provider (credential) is configured.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }
}
