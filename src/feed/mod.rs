//! Race-safe incremental feed loading.
//!
//! A [`Feed`] is the growing, de-duplicated collection behind one scrollable
//! list. It is driven through a single entry point, [`Feed::begin_fetch`],
//! which enforces single-flight fetching and remembers triggers that arrive
//! while a fetch is outstanding. [`FeedLoader`] runs the actual page fetches
//! on the tokio runtime and feeds their results back into the state machine.
//!
//! The pieces:
//! - [`guard`]: at most one fetch in flight, busy triggers coalesced into one
//! - [`merge`]: appends or re-sorts fetched pages without duplicate ids
//! - [`exhaustion`]: derives `has_more` from pagination metadata
//! - [`trigger`]: turns viewport geometry into "load more" signals
//! - [`loader`]: async driver with a bounded wait per fetch

pub mod exhaustion;
pub mod guard;
pub mod loader;
pub mod merge;
pub mod trigger;

use std::fmt::Debug;
use std::hash::Hash;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::ApiError;

pub use exhaustion::Exhaustion;
pub use guard::{FetchGuard, Ticket};
pub use loader::{FeedEvent, FeedLoader, LoaderConfig, LoaderUpdate, PageSource};
pub use merge::{MergeOrder, Reconciled};
pub use trigger::{Trigger, TriggerConfig, TriggerOrigin, TriggerSource, Viewport};

/// Anything the loader can de-duplicate.
pub trait Identified {
    type Id: Eq + Hash + Clone + Debug;

    fn id(&self) -> &Self::Id;
}

/// Lifecycle tag a caller may attach to an item it inserted optimistically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    #[default]
    Completed,
    Failed,
}

/// Where the next page starts. Opaque to the loader beyond "advance".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageToken {
    /// 1-based page number
    Number(u32),
    /// Server cursor; `None` requests the first page
    Cursor(Option<String>),
}

impl PageToken {
    pub const fn first_page() -> Self {
        Self::Number(1)
    }

    pub const fn first_cursor() -> Self {
        Self::Cursor(None)
    }

    /// The token following a successfully fetched page, or `None` when no
    /// further request can be formed.
    pub fn advance(&self, info: Option<&PageInfo>) -> Option<Self> {
        match self {
            Self::Number(n) => Some(Self::Number(n + 1)),
            Self::Cursor(_) => info
                .and_then(|i| i.next_cursor.clone())
                .map(|c| Self::Cursor(Some(c))),
        }
    }
}

/// Pagination metadata reported alongside a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub next_cursor: Option<String>,
}

/// One fetched page, in server order.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: Option<PageInfo>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_next_page: bool) -> Self {
        Self {
            items,
            page_info: Some(PageInfo {
                has_next_page,
                next_cursor: None,
            }),
        }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        let info = self.page_info.get_or_insert_with(PageInfo::default);
        info.next_cursor = Some(cursor.into());
        self
    }
}

/// A fetch the caller must perform now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub token: PageToken,
    pub page_size: usize,
}

/// Answer to a "load more" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// No more pages; nothing happens.
    Exhausted,
    /// A fetch is already outstanding; the request is remembered.
    Coalesced,
    /// Go fetch this page.
    Issue(FetchRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    Merged { new_items: usize, has_more: bool },
    Failed(ApiError),
    /// Result of a fetch from before the last reset; ignored.
    Stale,
}

/// What happened when a fetch settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub outcome: SettleOutcome,
    /// A trigger arrived while the fetch was outstanding; re-evaluate once.
    pub retrigger: bool,
}

/// The managed collection for one scrollable view.
#[derive(Debug)]
pub struct Feed<T: Identified> {
    items: Vec<T>,
    page_size: usize,
    first_token: PageToken,
    next_token: PageToken,
    order: MergeOrder<T>,
    guard: FetchGuard,
    exhaustion: Exhaustion,
    error: Option<ApiError>,
    pages_loaded: usize,
}

impl<T: Identified> Feed<T> {
    pub fn new(page_size: usize, first_token: PageToken, order: MergeOrder<T>) -> Self {
        Self {
            items: Vec::new(),
            page_size: page_size.max(1),
            next_token: first_token.clone(),
            first_token,
            order,
            guard: FetchGuard::new(),
            exhaustion: Exhaustion::new(),
            error: None,
            pages_loaded: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn is_fetching_more(&self) -> bool {
        self.guard.is_fetching()
    }

    pub fn has_more(&self) -> bool {
        self.exhaustion.has_more()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    pub fn next_token(&self) -> &PageToken {
        &self.next_token
    }

    pub fn has_pending_retrigger(&self) -> bool {
        self.guard.has_pending()
    }

    /// The single "load more" entry point.
    pub fn begin_fetch(&mut self) -> Admission {
        if !self.exhaustion.has_more() {
            return Admission::Exhausted;
        }
        match self.guard.try_acquire() {
            Some(ticket) => Admission::Issue(FetchRequest {
                ticket,
                token: self.next_token.clone(),
                page_size: self.page_size,
            }),
            None => Admission::Coalesced,
        }
    }

    /// Apply the result of the fetch identified by `ticket`.
    pub fn settle(&mut self, ticket: Ticket, result: Result<Page<T>, ApiError>) -> Settlement {
        let Some(retrigger) = self.guard.release(ticket) else {
            return Settlement {
                outcome: SettleOutcome::Stale,
                retrigger: false,
            };
        };

        let outcome = match result {
            Ok(page) => {
                let returned = page.items.len();
                let new_items = merge::merge_page(&mut self.items, page.items, &self.order);
                let info = page.page_info;
                self.exhaustion.observe(
                    info.as_ref().map(|i| i.has_next_page),
                    returned,
                    new_items,
                    self.page_size,
                );
                match self.next_token.advance(info.as_ref()) {
                    Some(token) => self.next_token = token,
                    None => {
                        if self.exhaustion.has_more() {
                            warn!("page reports more results but no cursor; stopping");
                        }
                        self.exhaustion.finish();
                    }
                }
                self.pages_loaded += 1;
                self.error = None;
                SettleOutcome::Merged {
                    new_items,
                    has_more: self.exhaustion.has_more(),
                }
            }
            Err(e) => {
                self.error = Some(e.clone());
                SettleOutcome::Failed(e)
            }
        };

        Settlement { outcome, retrigger }
    }

    /// Prepend a locally created item before the server knows about it.
    pub fn insert_optimistic(&mut self, item: T) {
        if self.items.iter().any(|existing| existing.id() == item.id()) {
            debug!(id = ?item.id(), "optimistic item already present");
            return;
        }
        self.items.insert(0, item);
    }

    /// Swap an optimistic placeholder for the authoritative version.
    pub fn reconcile(&mut self, placeholder: &T::Id, authoritative: T) -> Reconciled {
        merge::reconcile(&mut self.items, placeholder, authoritative, &self.order)
    }

    /// Mutate an item in place, e.g. to mark a placeholder as failed.
    pub fn update_item(&mut self, id: &T::Id, f: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    /// Start a new lifetime: empty, first page next, nothing in flight.
    ///
    /// Results of fetches issued before the reset settle as stale.
    pub fn reset(&mut self) {
        self.items.clear();
        self.next_token = self.first_token.clone();
        self.guard.reset();
        self.exhaustion = Exhaustion::new();
        self.error = None;
        self.pages_loaded = 0;
    }
}
