//! Generated image payloads and request shape.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::{AerogenError, Result};

/// MIME type assumed when the provider omits one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// A generated image as a self-describing data URI
/// (`data:<mime>;base64,<data>`).
///
/// Cheap to clone relative to the network call that produced it; the
/// renderer uses the URI directly as an image source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImagePayload {
    uri: String,
    // byte offset of the base64 data within `uri`
    data_start: usize,
}

impl ImagePayload {
    /// Build a payload from a MIME type and base64-encoded bytes.
    ///
    /// An empty MIME type falls back to [`DEFAULT_MIME_TYPE`].
    pub fn from_base64(mime_type: &str, base64_data: &str) -> Self {
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE
        } else {
            mime_type.trim()
        };
        let prefix = format!("data:{mime_type};base64,");
        Self {
            data_start: prefix.len(),
            uri: prefix + base64_data,
        }
    }

    /// Build a payload by encoding raw bytes.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::from_base64(mime_type, &STANDARD.encode(bytes))
    }

    /// The full data URI.
    pub fn as_data_uri(&self) -> &str {
        &self.uri
    }

    /// MIME type declared in the URI header.
    pub fn mime_type(&self) -> &str {
        // "data:" is 5 bytes, ";base64," is 8
        &self.uri[5..self.data_start - 8]
    }

    /// Base64 body of the URI.
    pub fn base64_data(&self) -> &str {
        &self.uri[self.data_start..]
    }

    /// Decode the image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.base64_data())
            .map_err(|e| AerogenError::InvalidInput(format!("invalid base64 image data: {e}")))
    }

    /// Conventional file extension for the MIME type.
    pub fn file_extension(&self) -> &'static str {
        match self.mime_type() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl FromStr for ImagePayload {
    type Err = AerogenError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix("data:")
            .ok_or_else(|| AerogenError::InvalidInput("data URI must start with 'data:'".into()))?;
        let (mime_type, data) = rest.split_once(";base64,").ok_or_else(|| {
            AerogenError::InvalidInput("data URI must be base64-encoded".into())
        })?;
        if mime_type.is_empty() {
            return Err(AerogenError::InvalidInput(
                "data URI is missing a MIME type".into(),
            ));
        }
        Ok(Self::from_base64(mime_type, data))
    }
}

impl TryFrom<String> for ImagePayload {
    type Error = AerogenError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ImagePayload> for String {
    fn from(payload: ImagePayload) -> Self {
        payload.uri
    }
}

impl fmt::Display for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Aspect ratio requested from the image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Standard,
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Standard => "4:3",
            Self::Widescreen => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AerogenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1:1" => Ok(Self::Square),
            "4:3" => Ok(Self::Standard),
            "16:9" => Ok(Self::Widescreen),
            other => Err(AerogenError::InvalidInput(format!(
                "unsupported aspect ratio '{other}'"
            ))),
        }
    }
}

/// A single image generation request as sent to an [`ImageProvider`](crate::providers::ImageProvider).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Fully rendered generation prompt.
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::default(),
        }
    }

    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }
}
