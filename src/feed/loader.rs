use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{
    Admission, Feed, FetchRequest, Identified, MergeOrder, Page, PageToken, SettleOutcome,
    Settlement, Ticket, Trigger, TriggerOrigin,
};
use crate::api::ApiError;

/// Supplies pages to a [`FeedLoader`]. Transport, endpoints and auth live
/// behind this trait.
pub trait PageSource: Send + Sync + 'static {
    type Item: Identified + Send + 'static;

    /// Short name used in logs.
    fn label(&self) -> String;

    fn fetch_page(
        &self,
        token: PageToken,
        page_size: usize,
    ) -> impl Future<Output = Result<Page<Self::Item>, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub page_size: usize,
    /// Upper bound on one fetch; expiry settles it as [`ApiError::TimedOut`].
    pub fetch_timeout: Duration,
    pub first_token: PageToken,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            fetch_timeout: Duration::from_secs(15),
            first_token: PageToken::first_page(),
        }
    }
}

/// Messages posted back to the loader.
pub enum FeedEvent<T> {
    Settled {
        ticket: Ticket,
        result: Result<Page<T>, ApiError>,
    },
    /// Deferred re-evaluation of triggers coalesced during a fetch.
    Retrigger,
}

/// What applying one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderUpdate {
    Settled(Settlement),
    Retriggered(Admission),
}

impl LoaderUpdate {
    /// Whether the item set may have changed.
    pub fn items_changed(&self) -> bool {
        matches!(
            self,
            Self::Settled(Settlement {
                outcome: SettleOutcome::Merged { new_items, .. },
                ..
            }) if *new_items > 0
        )
    }
}

/// Drives a [`Feed`] against a [`PageSource`] on the tokio runtime.
///
/// All state changes happen on the caller's task: fetches run in spawned
/// tasks that only post their result back. Call [`FeedLoader::poll`] from the
/// event loop (or await [`FeedLoader::next_event`]) to apply them.
pub struct FeedLoader<S: PageSource> {
    feed: Feed<S::Item>,
    source: Arc<S>,
    label: String,
    fetch_timeout: Duration,
    events_tx: mpsc::UnboundedSender<FeedEvent<S::Item>>,
    events_rx: mpsc::UnboundedReceiver<FeedEvent<S::Item>>,
    in_flight_since: Option<Instant>,
    fetches_issued: u64,
}

impl<S: PageSource> FeedLoader<S> {
    pub fn new(source: S, order: MergeOrder<S::Item>, config: LoaderConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let label = source.label();
        Self {
            feed: Feed::new(config.page_size, config.first_token, order),
            source: Arc::new(source),
            label,
            fetch_timeout: config.fetch_timeout,
            events_tx,
            events_rx,
            in_flight_since: None,
            fetches_issued: 0,
        }
    }

    pub fn feed(&self) -> &Feed<S::Item> {
        &self.feed
    }

    /// Mutable access for optimistic inserts and reconciliation.
    pub fn feed_mut(&mut self) -> &mut Feed<S::Item> {
        &mut self.feed
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn items(&self) -> &[S::Item] {
        self.feed.items()
    }

    pub fn is_fetching_more(&self) -> bool {
        self.feed.is_fetching_more()
    }

    pub fn has_more(&self) -> bool {
        self.feed.has_more()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.feed.error()
    }

    pub fn fetches_issued(&self) -> u64 {
        self.fetches_issued
    }

    /// Load the first page.
    pub fn start(&mut self) -> Admission {
        info!(feed = %self.label, "loading first page");
        self.request_load_more(Trigger::manual())
    }

    /// Drop everything and load the first page of a new lifetime.
    pub fn refresh(&mut self) -> Admission {
        info!(feed = %self.label, "refresh");
        self.feed.reset();
        self.in_flight_since = None;
        self.request_load_more(Trigger::manual())
    }

    /// The single entry point for every load-more signal.
    pub fn request_load_more(&mut self, trigger: Trigger) -> Admission {
        let admission = self.feed.begin_fetch();
        match &admission {
            Admission::Issue(request) => {
                debug!(
                    feed = %self.label,
                    origin = trigger.origin.label(),
                    token = ?request.token,
                    "fetch issued"
                );
                self.spawn_fetch(request.clone());
            }
            Admission::Coalesced => {
                debug!(
                    feed = %self.label,
                    origin = trigger.origin.label(),
                    "fetch in flight; trigger coalesced"
                );
            }
            Admission::Exhausted => {}
        }
        admission
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.events_tx.clone();
        let timeout = self.fetch_timeout;
        self.in_flight_since = Some(Instant::now());
        self.fetches_issued += 1;

        tokio::spawn(async move {
            let FetchRequest {
                ticket,
                token,
                page_size,
            } = request;
            let result = match tokio::time::timeout(timeout, source.fetch_page(token, page_size)).await
            {
                Ok(result) => result,
                Err(_) => Err(ApiError::TimedOut(timeout)),
            };
            let _ = tx.send(FeedEvent::Settled { ticket, result });
        });
    }

    /// Apply every event queued before this call, without waiting.
    ///
    /// A re-trigger posted while applying is left for the next call, so the
    /// caller gets to render the settled state first.
    pub fn poll(&mut self) -> Vec<LoaderUpdate> {
        let mut queued = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            queued.push(event);
        }
        queued.into_iter().map(|event| self.apply(event)).collect()
    }

    /// Wait for the next event and apply it.
    pub async fn next_event(&mut self) -> Option<LoaderUpdate> {
        let event = self.events_rx.recv().await?;
        Some(self.apply(event))
    }

    fn apply(&mut self, event: FeedEvent<S::Item>) -> LoaderUpdate {
        match event {
            FeedEvent::Settled { ticket, result } => {
                let settlement = self.feed.settle(ticket, result);
                self.log_settlement(&settlement);
                if settlement.retrigger {
                    // Posted, not called: the re-trigger runs on a later pass.
                    let _ = self.events_tx.send(FeedEvent::Retrigger);
                }
                LoaderUpdate::Settled(settlement)
            }
            FeedEvent::Retrigger => {
                LoaderUpdate::Retriggered(self.request_load_more(Trigger::new(TriggerOrigin::Coalesced)))
            }
        }
    }

    fn log_settlement(&mut self, settlement: &Settlement) {
        if matches!(settlement.outcome, SettleOutcome::Stale) {
            warn!(feed = %self.label, "fetch result discarded (stale)");
            return;
        }
        let elapsed = self.in_flight_since.take().map(|t| t.elapsed());
        match &settlement.outcome {
            SettleOutcome::Merged {
                new_items,
                has_more,
            } => debug!(
                feed = %self.label,
                new_items,
                has_more,
                total = self.feed.len(),
                elapsed = ?elapsed,
                "fetch completed"
            ),
            SettleOutcome::Failed(err) => warn!(
                feed = %self.label,
                error = %err,
                elapsed = ?elapsed,
                "fetch failed"
            ),
            SettleOutcome::Stale => {}
        }
    }
}
