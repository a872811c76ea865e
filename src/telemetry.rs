//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `aerogen_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation`: `"generate_image"` or `"answer_query"`
//! - `status`: `"ok"`, `"empty"` or `"error"`

/// Total provider requests actually sent over the network.
///
/// Labels: `operation`, `status` ("ok" | "empty" | "error").
pub const REQUESTS_TOTAL: &str = "aerogen_requests_total";

/// Provider request duration in seconds.
///
/// Labels: `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "aerogen_request_duration_seconds";

/// Image cache hits.
pub const CACHE_HITS_TOTAL: &str = "aerogen_cache_hits_total";

/// Image cache misses.
pub const CACHE_MISSES_TOTAL: &str = "aerogen_cache_misses_total";

/// Times the quota guard latched. At most one per guard instance.
pub const QUOTA_TRIPS_TOTAL: &str = "aerogen_quota_trips_total";

/// Image requests refused without network access because the guard is open.
pub const SHORT_CIRCUITS_TOTAL: &str = "aerogen_short_circuits_total";

/// Catalog items settled by the sequential fetcher.
///
/// Labels: `outcome` ("image" | "none").
pub const FETCH_ITEMS_TOTAL: &str = "aerogen_fetch_items_total";

pub(crate) const OP_GENERATE_IMAGE: &str = "generate_image";
pub(crate) const OP_ANSWER_QUERY: &str = "answer_query";
