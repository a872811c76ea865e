//! Provider layer: capability traits and the Gemini implementation.

pub mod gemini;
pub mod traits;

pub use gemini::{GeminiClient, GeminiConfig};
pub use traits::{ImageProvider, TextProvider};
