//! Public types for the Aerogen API.

pub mod catalog;
mod image;

pub use catalog::CatalogItem;
pub use image::{AspectRatio, DEFAULT_MIME_TYPE, ImagePayload, ImageRequest};
