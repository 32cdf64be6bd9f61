//! "Load more" signals derived from list geometry.
//!
//! Heights are in rows of the scroll container. Three producers feed the same
//! signal: a sentinel just past the last item, a scroll-distance fallback, and
//! a one-shot bootstrap for first pages that don't fill the viewport. None of
//! them knows whether a fetch is allowed right now; every [`Trigger`] goes to
//! the feed's single load-more entry point, which does the deduplication.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Geometry of the scroll container at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row of the content
    pub scroll_top: usize,
    /// Rows the container can show
    pub viewport_height: usize,
    /// Rows the rendered items occupy
    pub content_height: usize,
}

impl Viewport {
    /// Rows of content below the visible area.
    pub fn remaining(&self) -> usize {
        self.content_height
            .saturating_sub(self.scroll_top + self.viewport_height)
    }

    /// Whether the content overflows the container.
    pub fn is_filled(&self) -> bool {
        self.content_height > self.viewport_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOrigin {
    Sentinel,
    ScrollFallback,
    Bootstrap,
    Manual,
    /// Re-evaluation of triggers that arrived during a fetch
    Coalesced,
}

impl TriggerOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sentinel => "sentinel",
            Self::ScrollFallback => "scroll",
            Self::Bootstrap => "bootstrap",
            Self::Manual => "manual",
            Self::Coalesced => "coalesced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub origin: TriggerOrigin,
}

impl Trigger {
    pub const fn manual() -> Self {
        Self {
            origin: TriggerOrigin::Manual,
        }
    }

    pub const fn new(origin: TriggerOrigin) -> Self {
        Self { origin }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerConfig {
    /// Rows past the bottom edge within which the sentinel counts as visible
    pub sentinel_margin: usize,
    /// Remaining rows below which a scroll event signals
    pub scroll_threshold: usize,
    /// Delay after first content render before the scroll listener attaches
    pub scroll_settle: Duration,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            sentinel_margin: 4,
            scroll_threshold: 1,
            scroll_settle: Duration::from_millis(800),
        }
    }
}

/// Listener state for one list view.
#[derive(Debug)]
pub struct TriggerSource {
    config: TriggerConfig,
    attached: bool,
    sentinel_intersecting: bool,
    content_rendered_at: Option<Instant>,
    scroll_attached: bool,
    bootstrap_spent: bool,
}

impl TriggerSource {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            attached: false,
            sentinel_intersecting: false,
            content_rendered_at: None,
            scroll_attached: false,
            bootstrap_spent: false,
        }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_scroll_attached(&self) -> bool {
        self.scroll_attached
    }

    /// Start observing. Returns `false` if already attached.
    pub fn attach(&mut self) -> bool {
        if self.attached {
            warn!("trigger source already attached; ignoring");
            return false;
        }
        self.attached = true;
        self.sentinel_intersecting = false;
        debug!("trigger source attached");
        true
    }

    /// Stop observing. A detached source never emits.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.scroll_attached = false;
        self.sentinel_intersecting = false;
        self.content_rendered_at = None;
        debug!("trigger source detached");
    }

    /// Forget the sentinel's last visibility so a still-visible sentinel
    /// fires again. Call when the item count or container size changes.
    pub fn rearm(&mut self) {
        self.sentinel_intersecting = false;
    }

    /// Allow the bootstrap signal to fire again for a new feed lifetime.
    pub fn reset(&mut self) {
        self.bootstrap_spent = false;
        self.sentinel_intersecting = false;
    }

    /// Call after content has been laid out. Records the first render for the
    /// scroll settle delay and emits the one-shot bootstrap signal when the
    /// content does not fill the container.
    pub fn content_rendered(&mut self, viewport: Viewport, now: Instant) -> Option<Trigger> {
        if !self.attached || viewport.content_height == 0 {
            return None;
        }
        self.content_rendered_at.get_or_insert(now);
        if self.bootstrap_spent {
            return None;
        }
        self.bootstrap_spent = true;
        (!viewport.is_filled()).then(|| Trigger::new(TriggerOrigin::Bootstrap))
    }

    /// Attach the scroll fallback once the settle delay has passed.
    /// Returns `true` on the call that attaches it.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.attached || self.scroll_attached {
            return false;
        }
        match self.content_rendered_at {
            Some(at) if now.saturating_duration_since(at) >= self.config.scroll_settle => {
                self.scroll_attached = true;
                debug!("scroll fallback attached");
                true
            }
            _ => false,
        }
    }

    /// Evaluate the sentinel against the current geometry. Emits on the
    /// transition into visibility.
    pub fn observe(&mut self, viewport: Viewport) -> Option<Trigger> {
        if !self.attached || viewport.content_height == 0 {
            return None;
        }
        let visible_bottom =
            viewport.scroll_top + viewport.viewport_height + self.config.sentinel_margin;
        let intersecting = viewport.content_height <= visible_bottom;
        let entered = intersecting && !self.sentinel_intersecting;
        self.sentinel_intersecting = intersecting;
        entered.then(|| Trigger::new(TriggerOrigin::Sentinel))
    }

    /// Scroll event from the container.
    pub fn on_scroll(&mut self, viewport: Viewport) -> Option<Trigger> {
        if !self.attached || !self.scroll_attached || viewport.content_height == 0 {
            return None;
        }
        (viewport.remaining() < self.config.scroll_threshold)
            .then(|| Trigger::new(TriggerOrigin::ScrollFallback))
    }
}

impl Drop for TriggerSource {
    fn drop(&mut self) {
        self.detach();
    }
}
