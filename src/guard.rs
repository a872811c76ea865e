//! Session-wide quota guard.
//!
//! Once the provider reports a rate-limit or billing failure, every further
//! image request in the session is refused without touching the network.
//! The guard never closes again; a fresh [`GenerationClient`](crate::generation::GenerationClient)
//! (i.e. a new session) starts with a fresh guard.
//!
//! [`QuotaPolicy`] decides which failures count. Structured information on
//! the error (a [`RateLimited`](AerogenError::RateLimited) variant or an
//! [`Api`](AerogenError::Api) status) is consulted first; substring markers
//! over the provider's own error message are the fallback for providers
//! that only report quota exhaustion in prose. Transport failures are never
//! marker-matched, since their text is produced locally and can carry the
//! request URL.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;

use crate::AerogenError;
use crate::telemetry;

/// One-way latch. `false` (closed, requests allowed) until tripped.
#[derive(Debug, Default)]
pub struct QuotaGuard {
    tripped: AtomicBool,
}

impl QuotaGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the guard has been tripped this session.
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    /// Latch the guard. Returns `true` only for the call that flipped it.
    pub fn trip(&self) -> bool {
        let first = !self.tripped.swap(true, Ordering::AcqRel);
        if first {
            metrics::counter!(telemetry::QUOTA_TRIPS_TOTAL).increment(1);
        }
        first
    }
}

/// Which provider failures trip the [`QuotaGuard`].
///
/// ```rust
/// # use aerogen::QuotaPolicy;
/// let policy = QuotaPolicy::default().marker("billing");
/// assert!(policy.markers.iter().any(|m| m == "RESOURCE_EXHAUSTED"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuotaPolicy {
    /// HTTP statuses treated as quota/billing exhaustion. Default: 429, 403.
    pub status_codes: Vec<u16>,
    /// Substrings that mark quota/billing exhaustion in error text.
    /// Matched case-sensitively. Default: `429`, `RESOURCE_EXHAUSTED`,
    /// `403`, `quota`.
    pub markers: Vec<String>,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            status_codes: vec![429, 403],
            markers: ["429", "RESOURCE_EXHAUSTED", "403", "quota"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl QuotaPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text marker.
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Add a quota status code.
    pub fn status_code(mut self, status: u16) -> Self {
        self.status_codes.push(status);
        self
    }

    /// Classify an error as quota/billing exhaustion.
    pub fn is_quota_exhaustion(&self, err: &AerogenError) -> bool {
        match err {
            AerogenError::RateLimited { .. } => true,
            AerogenError::Api { status, message } => {
                self.status_codes.contains(status) || self.matches_text(message)
            }
            _ => false,
        }
    }

    /// Substring fallback over free-form error text.
    pub fn matches_text(&self, text: &str) -> bool {
        self.markers.iter().any(|m| text.contains(m.as_str()))
    }
}
