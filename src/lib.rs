//! Aerogen - generative imagery and site assistant for a drone catalog
//!
//! This crate wraps a Gemini-style generative API behind two never-failing
//! operations: product image generation (session-cached, protected by a
//! one-way quota breaker) and a short-answer navigation assistant. A
//! sequential fetcher drives image generation for whole lists of catalog
//! items without bursting the provider.
//!
//! # Example
//!
//! ```rust,no_run
//! use aerogen::{Aerogen, types::catalog};
//!
//! #[tokio::main]
//! async fn main() -> aerogen::Result<()> {
//!     let gateway = Aerogen::builder().from_env().build()?;
//!
//!     let image = gateway
//!         .request_image("The Vanguard X100", "Rugged airframe for inspection.", None)
//!         .await;
//!     println!("generated: {}", image.is_some());
//!
//!     let session = gateway.fetch_session(catalog::featured_products());
//!     if let Some(run) = session.trigger() {
//!         let tracker = run.settle_all().await;
//!         println!("{} images", tracker.images().len());
//!     }
//!
//!     println!("{}", gateway.answer_query("Where do I learn to fly?").await);
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod cache;
#[cfg(feature = "cli")]
pub mod config;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod guard;
pub mod orchestrator;
pub mod preferences;
pub mod providers;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use assistant::AssistantClient;
pub use cache::{CacheConfig, CacheKey, ImageCache};
pub use error::{AerogenError, Result};
pub use gateway::{Aerogen, AerogenBuilder, SiteGateway};
pub use generation::{GenerationClient, GenerationClientBuilder};
pub use guard::{QuotaGuard, QuotaPolicy};
pub use orchestrator::{
    CancelHandle, FetchEvent, FetchRun, FetchSession, LoadingState, LoadingTracker,
    SequentialFetcher,
};
pub use preferences::{PreferenceStore, Theme};
pub use providers::{ImageProvider, TextProvider};
pub use types::{AspectRatio, CatalogItem, ImagePayload, ImageRequest};
pub use version::{PKG_VERSION, user_agent, version_string};
