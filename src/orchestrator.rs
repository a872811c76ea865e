//! Sequential, paced image fetching for a list of catalog items.
//!
//! A page that shows several generated images hands its items to a
//! [`SequentialFetcher`]. The fetcher marks every item in-flight at once,
//! then requests images strictly one at a time in list order with a fixed
//! pause between items, so a page load never bursts the provider.
//!
//! The run is a spawned task that reports progress as [`FetchEvent`]s over a
//! bounded channel; the renderer folds them into a [`LoadingTracker`]. The
//! core never touches UI state directly.
//!
//! # Cancellation
//!
//! Dropping the [`FetchRun`] (e.g. the page unmounts) or calling
//! [`FetchRun::cancel`] stops the loop before the next item. A provider call
//! already in flight is allowed to finish so its image still lands in the
//! session cache, but no `Settled` event is sent for it: after a cancel the
//! next and final event is [`FetchEvent::Cancelled`].

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::generation::GenerationClient;
use crate::telemetry;
use crate::types::{CatalogItem, ImagePayload};

/// Default pause between consecutive provider requests.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Default number of events buffered between the fetch task and its consumer.
pub const DEFAULT_EVENT_BUFFER: usize = 16;

/// Progress of a fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// Every listed item is now in flight.
    Started { ids: Vec<String> },
    /// One item finished. `image` is `None` on any failure.
    Settled {
        id: String,
        image: Option<ImagePayload>,
    },
    /// All items settled.
    Finished,
    /// The run was cancelled before all items settled.
    Cancelled,
}

/// Drives a [`GenerationClient`] over item lists, one request at a time.
#[derive(Clone)]
pub struct SequentialFetcher {
    client: GenerationClient,
    pacing: Duration,
    buffer: usize,
}

impl SequentialFetcher {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            pacing: DEFAULT_PACING,
            buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    /// Set the pause between consecutive items.
    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Set the event channel capacity (minimum 1).
    pub fn buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    /// Spawn a fetch over `items`.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn run(&self, items: Vec<CatalogItem>) -> FetchRun {
        let (tx, rx) = mpsc::channel(self.buffer);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let client = self.client.clone();
        let pacing = self.pacing;
        let task = tokio::spawn(fetch_loop(client, items, pacing, tx, cancel_rx));

        FetchRun {
            events: ReceiverStream::new(rx),
            cancel: CancelHandle(Arc::new(cancel_tx)),
            task,
        }
    }

    /// Create a once-per-mount session over `items`.
    pub fn session(&self, items: Vec<CatalogItem>) -> FetchSession {
        FetchSession {
            fetcher: self.clone(),
            items,
            triggered: AtomicBool::new(false),
        }
    }
}

async fn fetch_loop(
    client: GenerationClient,
    items: Vec<CatalogItem>,
    pacing: Duration,
    tx: mpsc::Sender<FetchEvent>,
    mut cancel: watch::Receiver<bool>,
) {
    let ids = items.iter().map(|item| item.id.clone()).collect();
    if tx.send(FetchEvent::Started { ids }).await.is_err() {
        return;
    }

    let total = items.len();
    for (index, item) in items.into_iter().enumerate() {
        let cancelled = *cancel.borrow();
        if cancelled || tx.is_closed() {
            debug!(remaining = total - index, "fetch run cancelled");
            let _ = tx.send(FetchEvent::Cancelled).await;
            return;
        }

        let image = client.request_item_image(&item).await;
        let outcome = if image.is_some() { "image" } else { "none" };
        metrics::counter!(telemetry::FETCH_ITEMS_TOTAL, "outcome" => outcome).increment(1);
        debug!(id = %item.id, outcome, "item settled");

        // cancelled mid-call: the image is cached but the item is not reported
        let cancelled = *cancel.borrow();
        if cancelled {
            debug!(id = %item.id, remaining = total - index - 1, "fetch run cancelled");
            let _ = tx.send(FetchEvent::Cancelled).await;
            return;
        }

        if tx
            .send(FetchEvent::Settled { id: item.id, image })
            .await
            .is_err()
        {
            return;
        }

        if index + 1 < total {
            tokio::select! {
                _ = tokio::time::sleep(pacing) => {}
                _ = cancel.changed() => {}
            }
        }
    }

    info!(items = total, "fetch run finished");
    let _ = tx.send(FetchEvent::Finished).await;
}

/// Cloneable handle that cancels a [`FetchRun`].
#[derive(Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

/// A spawned fetch. Yields [`FetchEvent`]s as a [`Stream`].
pub struct FetchRun {
    events: ReceiverStream<FetchEvent>,
    cancel: CancelHandle,
    task: JoinHandle<()>,
}

impl FetchRun {
    /// Stop the run before its next item.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Whether the fetch task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Drain the run to completion, folding every event into a tracker.
    pub async fn settle_all(mut self) -> LoadingTracker {
        let mut tracker = LoadingTracker::new();
        while let Some(event) = self.next().await {
            tracker.apply(&event);
        }
        tracker
    }
}

impl Stream for FetchRun {
    type Item = FetchEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

/// Once-per-mount wrapper around a fetch.
///
/// The owning page creates one session when it mounts and may call
/// [`trigger`](Self::trigger) from every render; only the first call starts
/// a run.
pub struct FetchSession {
    fetcher: SequentialFetcher,
    items: Vec<CatalogItem>,
    triggered: AtomicBool,
}

impl FetchSession {
    /// Start the fetch if this session has not started one yet.
    pub fn trigger(&self) -> Option<FetchRun> {
        if self.triggered.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(self.fetcher.run(self.items.clone()))
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}

/// Per-item loading state shown by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingState {
    #[default]
    NotStarted,
    InFlight,
    /// Finished, with or without an image.
    Settled,
}

/// Renderer-side fold of [`FetchEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct LoadingTracker {
    states: HashMap<String, LoadingState>,
    images: HashMap<String, ImagePayload>,
    finished: bool,
    cancelled: bool,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event.
    ///
    /// `Settled` only moves an in-flight item, so each item settles at most
    /// once.
    pub fn apply(&mut self, event: &FetchEvent) {
        match event {
            FetchEvent::Started { ids } => {
                for id in ids {
                    self.states
                        .entry(id.clone())
                        .or_insert(LoadingState::InFlight);
                }
            }
            FetchEvent::Settled { id, image } => {
                let Some(state) = self.states.get_mut(id) else {
                    return;
                };
                if *state != LoadingState::InFlight {
                    return;
                }
                *state = LoadingState::Settled;
                if let Some(image) = image {
                    self.images.insert(id.clone(), image.clone());
                }
            }
            FetchEvent::Finished => self.finished = true,
            FetchEvent::Cancelled => self.cancelled = true,
        }
    }

    pub fn state(&self, id: &str) -> LoadingState {
        self.states.get(id).copied().unwrap_or_default()
    }

    pub fn is_loading(&self, id: &str) -> bool {
        self.state(id) == LoadingState::InFlight
    }

    /// Generated image for an item, if one arrived.
    pub fn image(&self, id: &str) -> Option<&ImagePayload> {
        self.images.get(id)
    }

    pub fn images(&self) -> &HashMap<String, ImagePayload> {
        &self.images
    }

    /// Image source for an item: the generated image when present, else the
    /// item's static fallback.
    pub fn display_source<'a>(&'a self, item: &'a CatalogItem) -> Option<&'a str> {
        self.image(&item.id)
            .map(ImagePayload::as_data_uri)
            .or(item.fallback_image.as_deref())
    }

    pub fn in_flight(&self) -> usize {
        self.states
            .values()
            .filter(|s| **s == LoadingState::InFlight)
            .count()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(ids: &[&str]) -> FetchEvent {
        FetchEvent::Started {
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn tracker_marks_all_in_flight_up_front() {
        let mut tracker = LoadingTracker::new();
        assert_eq!(tracker.state("a"), LoadingState::NotStarted);
        tracker.apply(&started(&["a", "b", "c"]));
        assert_eq!(tracker.in_flight(), 3);
        assert!(tracker.is_loading("b"));
    }

    #[test]
    fn tracker_settles_once() {
        let mut tracker = LoadingTracker::new();
        tracker.apply(&started(&["a"]));
        let image = ImagePayload::from_base64("image/png", "AAAA");
        tracker.apply(&FetchEvent::Settled {
            id: "a".into(),
            image: Some(image.clone()),
        });
        // duplicate settle without an image must not clear the first result
        tracker.apply(&FetchEvent::Settled {
            id: "a".into(),
            image: None,
        });
        assert_eq!(tracker.state("a"), LoadingState::Settled);
        assert_eq!(tracker.image("a"), Some(&image));
    }

    #[test]
    fn tracker_ignores_unknown_ids() {
        let mut tracker = LoadingTracker::new();
        tracker.apply(&FetchEvent::Settled {
            id: "ghost".into(),
            image: None,
        });
        assert_eq!(tracker.state("ghost"), LoadingState::NotStarted);
    }

    #[test]
    fn display_source_prefers_generated_image() {
        let item = CatalogItem::new("a", "A", "d").fallback_image("https://example.com/a.jpg");
        let mut tracker = LoadingTracker::new();
        assert_eq!(
            tracker.display_source(&item),
            Some("https://example.com/a.jpg")
        );

        tracker.apply(&started(&["a"]));
        tracker.apply(&FetchEvent::Settled {
            id: "a".into(),
            image: Some(ImagePayload::from_base64("image/png", "AAAA")),
        });
        assert_eq!(
            tracker.display_source(&item),
            Some("data:image/png;base64,AAAA")
        );
    }
}
