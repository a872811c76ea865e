//! Google Gemini `generateContent` client for image generation and
//! assistant answers.
//!
//! See: <https://ai.google.dev/api/generate-content>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ImageProvider, TextProvider};
use crate::types::{ImagePayload, ImageRequest};
use crate::{AerogenError, Result};

/// Default base URL for the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model for image generation.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
/// Default model for assistant answers.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Error bodies are truncated to this many bytes before they reach logs.
const MAX_ERROR_BODY: usize = 500;

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub image_model: String,
    pub text_model: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the Gemini API.
///
/// Implements both [`ImageProvider`] (image model) and [`TextProvider`]
/// (text model) over the same HTTP connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a client with default endpoints and models.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, GeminiConfig::default())
    }

    /// Create a client with explicit settings (custom base URL for testing
    /// with wiremock, alternate models, timeout).
    pub fn with_config(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AerogenError::Configuration(
                "Gemini API key is empty".to_string(),
            ));
        }

        let http = Client::builder()
            .user_agent(crate::version::user_agent())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AerogenError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            http,
            config,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let response = Self::handle_response_errors(response).await?;

        response
            .json()
            .await
            .map_err(|e| {
                AerogenError::Http(format!(
                    "failed to parse Gemini response: {}",
                    e.without_url()
                ))
            })
    }

    /// Check response status and map to the appropriate error.
    async fn handle_response_errors(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        match status.as_u16() {
            401 => Err(AerogenError::AuthenticationFailed),
            429 => {
                debug!(%message, "Gemini rate limited");
                Err(AerogenError::RateLimited { retry_after })
            }
            code => Err(AerogenError::Api {
                status: code,
                message,
            }),
        }
    }
}

/// Render a provider error body for logs and classification.
///
/// Gemini wraps failures as `{"error": {"status": ..., "message": ...}}`;
/// both fields are kept so the status token stays visible to text markers.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        let detail = parsed.error;
        let rendered = match detail.status {
            Some(status) => format!("{status}: {}", detail.message),
            None => detail.message,
        };
        return truncate(&rendered, MAX_ERROR_BODY).to_string();
    }
    truncate(body, MAX_ERROR_BODY).to_string()
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

impl<'a> Content<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            parts: vec![TextPart { text }],
        }
    }
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: Vec<&'a str>,
    image_config: ImageConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig<'a> {
    aspect_ratio: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// First inline image part of the first candidate.
    fn first_image(&self) -> Option<ImagePayload> {
        self.first_parts()
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| ImagePayload::from_base64(&d.mime_type, &d.data))
    }

    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

// ============================================================================
// Provider Trait Implementations
// ============================================================================

#[async_trait]
impl ImageProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_image(&self, request: &ImageRequest) -> Result<Option<ImagePayload>> {
        let body = GenerateContentRequest {
            contents: vec![Content::text(&request.prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE"],
                image_config: ImageConfig {
                    aspect_ratio: request.aspect_ratio.as_str(),
                },
            }),
        };
        let response = self
            .generate_content(&self.config.image_model, &body)
            .await?;
        Ok(response.first_image())
    }
}

#[async_trait]
impl TextProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn answer(&self, system_instruction: &str, query: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content::text(query)],
            system_instruction: Some(Content::text(system_instruction)),
            generation_config: None,
        };
        let response = self.generate_content(&self.config.text_model, &body).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(AerogenError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AspectRatio;

    #[test]
    fn image_request_body_shape() {
        let request = ImageRequest::new("Draw a drone").aspect_ratio(AspectRatio::Widescreen);
        let body = GenerateContentRequest {
            contents: vec![Content::text(&request.prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE"],
                image_config: ImageConfig {
                    aspect_ratio: request.aspect_ratio.as_str(),
                },
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Draw a drone");
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn parse_first_inline_image() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your drone"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "AAAA"}},
                        {"inlineData": {"mimeType": "image/png", "data": "BBBB"}}
                    ]
                }
            }]
        }))
        .unwrap();
        let image = response.first_image().unwrap();
        assert_eq!(image.as_data_uri(), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn parse_response_without_image() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot draw that"}]}}]
        }))
        .unwrap();
        assert!(response.first_image().is_none());
        assert_eq!(response.text(), "I cannot draw that");
    }

    #[test]
    fn parse_empty_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(response.first_image().is_none());
        assert_eq!(response.text(), "");
    }

    #[test]
    fn error_message_keeps_status_token() {
        let body = r#"{"error":{"code":429,"message":"You exceeded your current quota","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            error_message(body),
            "RESOURCE_EXHAUSTED: You exceeded your current quota"
        );
    }

    #[test]
    fn error_message_truncates_plain_bodies() {
        let body = "x".repeat(2_000);
        assert_eq!(error_message(&body).len(), MAX_ERROR_BODY);
    }

    #[test]
    fn error_message_truncates_long_provider_messages() {
        let body = format!(
            r#"{{"error":{{"code":429,"message":"{}","status":"RESOURCE_EXHAUSTED"}}}}"#,
            "q".repeat(2_000)
        );
        let message = error_message(&body);
        assert_eq!(message.len(), MAX_ERROR_BODY);
        assert!(message.starts_with("RESOURCE_EXHAUSTED: qqq"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(10); // 2 bytes each
        assert_eq!(truncate(&s, 5).len(), 4);
    }

    #[test]
    fn empty_api_key_rejected() {
        assert!(GeminiClient::new("  ").is_err());
    }

    #[test]
    fn endpoint_joins_model() {
        let client = GeminiClient::with_config(
            "k",
            GeminiConfig {
                base_url: "http://localhost:1234/".into(),
                ..GeminiConfig::default()
            },
        )
        .unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost:1234/models/gemini-2.5-flash:generateContent"
        );
    }
}
