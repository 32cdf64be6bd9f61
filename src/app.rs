use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{
    ApiError, ColoringPage, GalleryClient, GalleryPages, Generation, GenerationHistory, Sort,
};
use crate::feed::{
    FeedLoader, ItemStatus, MergeOrder, PageSource, Trigger, TriggerConfig, TriggerSource, Viewport,
};
use crate::settings::Settings;
use crate::theme::ResolvedTheme;

/// Rows per list entry: title + metadata.
pub const ITEM_HEIGHT: usize = 2;
const LAYOUT_OVERHEAD: u16 = 4; // 1 tabs + 1 status bar + 2 borders
const PAGE_JUMP: usize = 10;
const GENERATION_POLL_INTERVAL: Duration = Duration::from_secs(2);
const GENERATION_MAX_POLLS: u32 = 60;

pub enum AsyncResult {
    GenerationCreated {
        placeholder: String,
        result: Result<Generation, ApiError>,
    },
    GenerationUpdated {
        id: String,
        result: Result<Generation, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Gallery,
    History,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Gallery, Tab::History]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Gallery => "Gallery",
            Tab::History => "My Generations",
        }
    }
}

/// Selection, scroll position and load-more listeners for one list.
#[derive(Debug)]
pub struct ListView {
    pub selected: usize,
    pub scroll_offset: usize,
    pub triggers: TriggerSource,
}

impl ListView {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            triggers: TriggerSource::new(config),
        }
    }

    pub fn viewport(&self, len: usize, capacity: usize) -> Viewport {
        Viewport {
            scroll_top: self.scroll_offset * ITEM_HEIGHT,
            viewport_height: capacity * ITEM_HEIGHT,
            content_height: len * ITEM_HEIGHT,
        }
    }

    fn select_next(&mut self, len: usize) {
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_last(&mut self, len: usize) {
        if len > 0 {
            self.selected = len - 1;
        }
    }

    fn page_down(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + PAGE_JUMP).min(len - 1);
        }
    }

    fn page_up(&mut self) {
        self.selected = self.selected.saturating_sub(PAGE_JUMP);
    }

    /// Scroll just enough to keep the selection on screen.
    fn ensure_visible(&mut self, capacity: usize) {
        if capacity == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + capacity {
            self.scroll_offset = self.selected + 1 - capacity;
        }
    }

    /// Back to the top for a new feed lifetime; listeners stay attached.
    fn reset(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
        self.triggers.reset();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    PageDown,
    PageUp,
    LoadMore,
    Refresh,
    NextTab,
    PrevTab,
    SwitchTab(Tab),
    CycleSort,
    ToggleDetail,
    OpenUrl,
    OpenPrompt,
    PromptInput(char),
    PromptBackspace,
    SubmitPrompt,
    CancelPrompt,
    ToggleHelp,
    Quit,
    UpdateViewportHeight(u16),
}

pub struct App {
    pub tab: Tab,
    pub sort: Sort,
    pub gallery: FeedLoader<GalleryPages>,
    pub history: FeedLoader<GenerationHistory>,
    pub gallery_view: ListView,
    pub history_view: ListView,
    pub client: GalleryClient,
    pub settings: Settings,
    pub theme: ResolvedTheme,
    /// Prompt being typed for a new generation
    pub prompt: Option<String>,
    pub show_detail: bool,
    pub show_help: bool,
    pub should_quit: bool,
    /// One-line message outside any feed, e.g. a failed generation
    pub notice: Option<String>,
    pub viewport_height: Option<u16>,
    pub started_at: Instant,
    // Async task management
    pub result_tx: mpsc::Sender<AsyncResult>,
    pub result_rx: mpsc::Receiver<AsyncResult>,
    next_placeholder: u64,
}

impl App {
    pub fn new(settings: Settings, theme: ResolvedTheme) -> Result<Self> {
        let client = GalleryClient::new(settings.api_base.clone())?;
        let sort = settings.sort.unwrap_or_default();
        let (result_tx, result_rx) = mpsc::channel(16);
        let triggers = settings.triggers();

        Ok(Self {
            tab: Tab::default(),
            sort,
            gallery: gallery_loader(&client, sort, &settings),
            history: FeedLoader::new(
                GenerationHistory::new(client.clone()),
                MergeOrder::Append,
                settings.history_loader(),
            ),
            gallery_view: ListView::new(triggers),
            history_view: ListView::new(triggers),
            client,
            settings,
            theme,
            prompt: None,
            show_detail: false,
            show_help: false,
            should_quit: false,
            notice: None,
            viewport_height: None,
            started_at: Instant::now(),
            result_tx,
            result_rx,
            next_placeholder: 0,
        })
    }

    /// Mount the active list and load the first page of both feeds.
    pub fn start(&mut self) {
        self.active_view_mut().triggers.attach();
        self.gallery.start();
        self.history.start();
    }

    pub fn list_capacity(&self) -> usize {
        self.viewport_height
            .map(|h| h.saturating_sub(LAYOUT_OVERHEAD) as usize / ITEM_HEIGHT)
            .unwrap_or(0)
    }

    pub fn active_view(&self) -> &ListView {
        match self.tab {
            Tab::Gallery => &self.gallery_view,
            Tab::History => &self.history_view,
        }
    }

    fn active_view_mut(&mut self) -> &mut ListView {
        match self.tab {
            Tab::Gallery => &mut self.gallery_view,
            Tab::History => &mut self.history_view,
        }
    }

    pub fn active_len(&self) -> usize {
        match self.tab {
            Tab::Gallery => self.gallery.items().len(),
            Tab::History => self.history.items().len(),
        }
    }

    pub fn active_is_fetching(&self) -> bool {
        match self.tab {
            Tab::Gallery => self.gallery.is_fetching_more(),
            Tab::History => self.history.is_fetching_more(),
        }
    }

    pub fn active_has_more(&self) -> bool {
        match self.tab {
            Tab::Gallery => self.gallery.has_more(),
            Tab::History => self.history.has_more(),
        }
    }

    pub fn active_error(&self) -> Option<&ApiError> {
        match self.tab {
            Tab::Gallery => self.gallery.error(),
            Tab::History => self.history.error(),
        }
    }

    /// Whether the active feed has settled a first page in this lifetime.
    /// Placeholders shown before that don't count as rendered content.
    pub fn active_first_page_loaded(&self) -> bool {
        match self.tab {
            Tab::Gallery => self.gallery.feed().pages_loaded() > 0,
            Tab::History => self.history.feed().pages_loaded() > 0,
        }
    }

    pub fn active_viewport(&self) -> Viewport {
        self.active_view()
            .viewport(self.active_len(), self.list_capacity())
    }

    pub fn selected_page(&self) -> Option<&ColoringPage> {
        self.gallery.items().get(self.gallery_view.selected)
    }

    pub fn selected_generation(&self) -> Option<&Generation> {
        self.history.items().get(self.history_view.selected)
    }

    /// Every load-more signal for the active list goes through here.
    fn request_load_more(&mut self, trigger: Trigger) {
        match self.tab {
            Tab::Gallery => {
                self.gallery.request_load_more(trigger);
            }
            Tab::History => {
                self.history.request_load_more(trigger);
            }
        }
    }

    /// Apply settled fetches and deferred re-triggers from both loaders.
    pub fn poll_loaders(&mut self) {
        if poll_loader(&mut self.gallery, &mut self.gallery_view) {
            debug!(total = self.gallery.items().len(), "gallery grew");
        }
        if poll_loader(&mut self.history, &mut self.history_view) {
            debug!(total = self.history.items().len(), "history grew");
        }
    }

    /// Layout is done: evaluate the bootstrap fill, the sentinel, and the
    /// scroll fallback's settle delay against the rendered geometry.
    ///
    /// Nothing fires until the active feed has a first page; a lone
    /// placeholder would otherwise spend the bootstrap.
    pub fn after_render(&mut self, now: Instant) {
        let capacity = self.list_capacity();
        if capacity == 0 {
            return;
        }
        let loaded = self.active_first_page_loaded();
        let viewport = self.active_viewport();
        let view = self.active_view_mut();
        view.triggers.tick(now);
        if !loaded {
            return;
        }
        let fired: Vec<Trigger> = [
            view.triggers.content_rendered(viewport, now),
            view.triggers.observe(viewport),
        ]
        .into_iter()
        .flatten()
        .collect();
        for trigger in fired {
            self.request_load_more(trigger);
        }
    }

    /// The list scrolled (or the user tried to): keep the selection visible
    /// and let both trigger producers look at the new position.
    fn scrolled(&mut self) {
        let capacity = self.list_capacity();
        self.active_view_mut().ensure_visible(capacity);
        if !self.active_first_page_loaded() {
            return;
        }
        let viewport = self.active_viewport();
        let view = self.active_view_mut();
        let fired: Vec<Trigger> = [view.triggers.on_scroll(viewport), view.triggers.observe(viewport)]
            .into_iter()
            .flatten()
            .collect();
        for trigger in fired {
            self.request_load_more(trigger);
        }
    }

    pub fn handle_async_result(&mut self, result: AsyncResult) {
        match result {
            AsyncResult::GenerationCreated {
                placeholder,
                result: Ok(generation),
            } => {
                let id = generation.id.clone();
                let pending = generation.is_pending();
                let outcome = self.history.feed_mut().reconcile(&placeholder, generation);
                info!(%placeholder, %id, ?outcome, "generation accepted");
                if pending {
                    self.spawn_generation_poll(id);
                }
            }
            AsyncResult::GenerationCreated {
                placeholder,
                result: Err(e),
            } => {
                warn!(%placeholder, error = %e, "generation request failed");
                self.history
                    .feed_mut()
                    .update_item(&placeholder, |g| g.status = ItemStatus::Failed);
                self.notice = Some(format!("Generation failed: {}", e.user_message()));
            }
            AsyncResult::GenerationUpdated {
                id,
                result: Ok(generation),
            } => {
                let outcome = self.history.feed_mut().reconcile(&id, generation);
                debug!(%id, ?outcome, "generation settled");
            }
            AsyncResult::GenerationUpdated { id, result: Err(e) } => {
                warn!(%id, error = %e, "generation did not complete");
                self.history
                    .feed_mut()
                    .update_item(&id, |g| g.status = ItemStatus::Failed);
                self.notice = Some(format!("Generation failed: {}", e.user_message()));
            }
        }
    }

    pub fn update(&mut self, msg: Message) {
        self.notice = None;

        let len = self.active_len();
        match msg {
            Message::SelectNext => {
                self.active_view_mut().select_next(len);
                self.scrolled();
            }
            Message::SelectPrev => {
                self.active_view_mut().select_prev();
                self.scrolled();
            }
            Message::SelectFirst => {
                self.active_view_mut().selected = 0;
                self.scrolled();
            }
            Message::SelectLast => {
                self.active_view_mut().select_last(len);
                self.scrolled();
            }
            Message::PageDown => {
                self.active_view_mut().page_down(len);
                self.scrolled();
            }
            Message::PageUp => {
                self.active_view_mut().page_up();
                self.scrolled();
            }
            Message::LoadMore => self.request_load_more(Trigger::manual()),
            Message::Refresh => self.refresh(),
            Message::NextTab => self.cycle_tab(1),
            Message::PrevTab => self.cycle_tab(-1),
            Message::SwitchTab(tab) => self.switch_tab(tab),
            Message::CycleSort => self.cycle_sort(),
            Message::ToggleDetail => self.show_detail = !self.show_detail,
            Message::OpenUrl => self.open_url(),
            Message::OpenPrompt => self.prompt = Some(String::new()),
            Message::PromptInput(c) => {
                if let Some(prompt) = &mut self.prompt {
                    prompt.push(c);
                }
            }
            Message::PromptBackspace => {
                if let Some(prompt) = &mut self.prompt {
                    prompt.pop();
                }
            }
            Message::SubmitPrompt => self.submit_prompt(),
            Message::CancelPrompt => self.prompt = None,
            Message::ToggleHelp => self.show_help = !self.show_help,
            Message::Quit => self.should_quit = true,
            Message::UpdateViewportHeight(height) => {
                let old_height = self.viewport_height;
                self.viewport_height = Some(height);
                if old_height != Some(height) {
                    self.gallery_view.triggers.rearm();
                    self.history_view.triggers.rearm();
                }
            }
        }
    }

    fn cycle_tab(&mut self, direction: i32) {
        let tabs = Tab::all();
        let current = tabs.iter().position(|&t| t == self.tab).unwrap_or(0);
        let next = (current as i32 + direction).rem_euclid(tabs.len() as i32) as usize;
        self.switch_tab(tabs[next]);
    }

    /// Unmount the current list's listeners and mount the other one's.
    fn switch_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.active_view_mut().triggers.detach();
        self.tab = tab;
        self.active_view_mut().triggers.attach();
        self.show_detail = false;
    }

    fn cycle_sort(&mut self) {
        let sorts = Sort::all();
        let current = sorts.iter().position(|&s| s == self.sort).unwrap_or(0);
        self.set_sort(sorts[(current + 1) % sorts.len()]);
    }

    /// A different sort is a different feed: start a fresh one.
    pub fn set_sort(&mut self, sort: Sort) {
        if self.sort == sort {
            return;
        }
        info!(from = %self.sort, to = %sort, "switching gallery sort");
        self.sort = sort;
        self.gallery = gallery_loader(&self.client, sort, &self.settings);
        self.gallery_view.reset();
        self.gallery.start();
        self.switch_tab(Tab::Gallery);
    }

    fn refresh(&mut self) {
        match self.tab {
            Tab::Gallery => {
                self.gallery_view.reset();
                self.gallery.refresh();
            }
            Tab::History => {
                // Placeholders for generations still in flight survive the reset
                let pending: Vec<Generation> = self
                    .history
                    .items()
                    .iter()
                    .filter(|g| g.is_pending() && is_placeholder(&g.id))
                    .cloned()
                    .collect();
                self.history_view.reset();
                self.history.refresh();
                for generation in pending.into_iter().rev() {
                    self.history.feed_mut().insert_optimistic(generation);
                }
            }
        }
    }

    fn open_url(&self) {
        let url = match self.tab {
            Tab::Gallery => self
                .selected_page()
                .map(|p| p.web_url(&self.settings.site_url)),
            Tab::History => self.selected_generation().and_then(|g| g.image_url.clone()),
        };
        if let Some(url) = url
            && let Err(e) = open::that(&url)
        {
            warn!(%url, error = %e, "failed to open browser");
        }
    }

    fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let prompt = prompt.trim().to_string();
        if prompt.is_empty() {
            return;
        }

        self.next_placeholder += 1;
        let placeholder = format!("temp-{}", self.next_placeholder);
        self.history
            .feed_mut()
            .insert_optimistic(Generation::placeholder(placeholder.clone(), prompt.clone()));
        self.switch_tab(Tab::History);
        self.history_view.selected = 0;
        self.history_view.scroll_offset = 0;
        self.spawn_generation(placeholder, prompt);
    }

    fn spawn_generation(&self, placeholder: String, prompt: String) {
        let client = self.client.clone();
        let tx = self.result_tx.clone();
        info!(%placeholder, "submitting generation");

        tokio::spawn(async move {
            let result = client.create_generation(&prompt).await;
            let _ = tx
                .send(AsyncResult::GenerationCreated {
                    placeholder,
                    result,
                })
                .await;
        });
    }

    /// Poll a pending generation until it completes, fails, or we give up.
    fn spawn_generation_poll(&self, id: String) {
        let client = self.client.clone();
        let tx = self.result_tx.clone();

        tokio::spawn(async move {
            for _ in 0..GENERATION_MAX_POLLS {
                tokio::time::sleep(GENERATION_POLL_INTERVAL).await;
                let result = client.fetch_generation(&id).await;
                match result {
                    Ok(generation) if generation.is_pending() => continue,
                    result => {
                        let _ = tx.send(AsyncResult::GenerationUpdated { id, result }).await;
                        return;
                    }
                }
            }
            let waited = GENERATION_POLL_INTERVAL * GENERATION_MAX_POLLS;
            let _ = tx
                .send(AsyncResult::GenerationUpdated {
                    id,
                    result: Err(ApiError::TimedOut(waited)),
                })
                .await;
        });
    }
}

fn gallery_loader(client: &GalleryClient, sort: Sort, settings: &Settings) -> FeedLoader<GalleryPages> {
    FeedLoader::new(
        GalleryPages::new(client.clone(), sort),
        MergeOrder::Sorted(sort.comparator()),
        settings.gallery_loader(),
    )
}

/// Returns whether the loader's items changed.
fn poll_loader<S: PageSource>(loader: &mut FeedLoader<S>, view: &mut ListView) -> bool {
    let mut changed = false;
    for update in loader.poll() {
        if update.items_changed() {
            changed = true;
        }
    }
    if changed {
        // New content moves the sentinel; let it fire again if still visible
        view.triggers.rearm();
    }
    let len = loader.items().len();
    if len == 0 {
        view.selected = 0;
        view.scroll_offset = 0;
    } else if view.selected >= len {
        view.selected = len - 1;
    }
    changed
}

pub fn is_placeholder(id: &str) -> bool {
    id.starts_with("temp-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{GenerationBuilder, PageBuilder, TestAppBuilder, sample_pages};

    #[test]
    fn test_new_app() {
        let app = TestAppBuilder::new().build();
        assert_eq!(app.tab, Tab::Gallery);
        assert_eq!(app.sort, Sort::Newest);
        assert!(!app.should_quit);
        assert!(app.gallery.has_more());
    }

    #[test]
    fn list_capacity_with_no_viewport() {
        let app = TestAppBuilder::new().build();
        assert_eq!(app.list_capacity(), 0);
    }

    #[test]
    fn list_capacity_from_terminal_height() {
        // 24 lines: (24 - 4) / 2 = 10 entries
        let app = TestAppBuilder::new().viewport_height(24).build();
        assert_eq!(app.list_capacity(), 10);
        // 4 lines is all overhead
        let app = TestAppBuilder::new().viewport_height(4).build();
        assert_eq!(app.list_capacity(), 0);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut app = TestAppBuilder::new()
            .with_pages(sample_pages())
            .viewport_height(24)
            .has_more(false)
            .build();

        app.update(Message::SelectNext);
        assert_eq!(app.gallery_view.selected, 1);
        app.update(Message::SelectLast);
        assert_eq!(app.gallery_view.selected, 4);
        app.update(Message::SelectNext);
        assert_eq!(app.gallery_view.selected, 4);
        app.update(Message::SelectFirst);
        app.update(Message::SelectPrev);
        assert_eq!(app.gallery_view.selected, 0);
    }

    #[test]
    fn selection_scrolls_viewport() {
        let pages: Vec<_> = (0..30)
            .map(|i| PageBuilder::new().id(&format!("cp_{i}")).build())
            .collect();
        let mut app = TestAppBuilder::new()
            .with_pages(pages)
            .viewport_height(24) // capacity 10
            .has_more(false)
            .build();

        app.update(Message::PageDown);
        app.update(Message::SelectNext);
        assert_eq!(app.gallery_view.selected, 11);
        assert_eq!(app.gallery_view.scroll_offset, 2);

        app.update(Message::SelectFirst);
        assert_eq!(app.gallery_view.scroll_offset, 0);
    }

    #[tokio::test]
    async fn manual_load_more_is_coalesced_while_fetching() {
        let mut app = TestAppBuilder::new()
            .with_pages(sample_pages())
            .viewport_height(24)
            .build();

        app.update(Message::LoadMore);
        assert!(app.gallery.is_fetching_more());
        app.update(Message::LoadMore);
        app.update(Message::LoadMore);
        assert_eq!(app.gallery.fetches_issued(), 1);
        assert!(app.gallery.feed().has_pending_retrigger());
    }

    #[test]
    fn load_more_on_exhausted_feed_does_nothing() {
        let mut app = TestAppBuilder::new()
            .with_pages(sample_pages())
            .has_more(false)
            .build();

        app.update(Message::LoadMore);
        assert!(!app.gallery.is_fetching_more());
        assert_eq!(app.gallery.fetches_issued(), 0);
    }

    #[tokio::test]
    async fn short_first_page_bootstraps_next_fetch() {
        // 5 entries, capacity 10: content does not fill the list
        let mut app = TestAppBuilder::new()
            .with_pages(sample_pages())
            .viewport_height(24)
            .build();
        app.gallery_view.triggers.attach();

        app.after_render(Instant::now());
        assert!(app.gallery.is_fetching_more());
        assert_eq!(app.gallery.fetches_issued(), 1);
    }

    #[test]
    fn nothing_fires_before_layout() {
        let mut app = TestAppBuilder::new().with_pages(sample_pages()).build();
        app.gallery_view.triggers.attach();
        app.after_render(Instant::now());
        assert!(!app.gallery.is_fetching_more());
    }

    #[test]
    fn full_first_page_waits_for_scrolling() {
        // 20 entries, capacity 10: the sentinel sits well past the margin
        let pages = (1..=20)
            .map(|n| PageBuilder::new().id(&format!("cp_{n}")).build())
            .collect();
        let mut app = TestAppBuilder::new()
            .with_pages(pages)
            .viewport_height(24)
            .build();
        app.gallery_view.triggers.attach();

        app.after_render(Instant::now());
        assert!(!app.gallery.is_fetching_more());
        assert_eq!(app.gallery.fetches_issued(), 0);
    }

    fn history_page(count: usize) -> Vec<Generation> {
        (1..=count)
            .map(|n| GenerationBuilder::new().id(&format!("gen_{n}")).build())
            .collect()
    }

    #[tokio::test]
    async fn placeholder_during_refresh_does_not_spend_bootstrap() {
        let mut app = TestAppBuilder::new()
            .tab(Tab::History)
            .with_generations(history_page(20))
            .viewport_height(24)
            .build();
        app.history_view.triggers.attach();
        app.history
            .feed_mut()
            .insert_optimistic(Generation::placeholder("temp-1", "a fox"));

        app.update(Message::Refresh);
        assert_eq!(app.history.items().len(), 1);
        assert_eq!(app.history.fetches_issued(), 1);

        app.after_render(Instant::now());
        app.update(Message::SelectLast);

        assert_eq!(app.history.fetches_issued(), 1);
        assert!(!app.history.feed().has_pending_retrigger());

        // Once page 1 fills the list, nothing is owed for page 2
        seed_after_refresh(&mut app, history_page(20));
        app.after_render(Instant::now());
        assert!(!app.history.is_fetching_more());
        assert!(!app.history.feed().has_pending_retrigger());
    }

    #[tokio::test]
    async fn prompt_before_first_history_page_does_not_queue_load_more() {
        let mut app = TestAppBuilder::new().viewport_height(24).build();
        app.gallery_view.triggers.attach();
        app.history.start();

        app.update(Message::OpenPrompt);
        app.update(Message::PromptInput('x'));
        app.update(Message::SubmitPrompt);
        assert_eq!(app.tab, Tab::History);
        assert_eq!(app.history.items().len(), 1);

        app.after_render(Instant::now());
        assert_eq!(app.history.fetches_issued(), 1);
        assert!(!app.history.feed().has_pending_retrigger());
    }

    /// Stand in for the in-flight first page landing: drop the real fetch
    /// and settle a page directly, keeping the surviving placeholders.
    fn seed_after_refresh(app: &mut App, generations: Vec<Generation>) {
        let placeholders: Vec<Generation> = app
            .history
            .items()
            .iter()
            .filter(|g| is_placeholder(&g.id))
            .cloned()
            .collect();
        app.history.feed_mut().reset();
        crate::test_utils::seed(&mut app.history, generations, true);
        for generation in placeholders {
            app.history.feed_mut().insert_optimistic(generation);
        }
        app.history_view.triggers.rearm();
    }

    #[test]
    fn switching_tabs_moves_listeners() {
        let mut app = TestAppBuilder::new().build();
        app.gallery_view.triggers.attach();

        app.update(Message::NextTab);
        assert_eq!(app.tab, Tab::History);
        assert!(!app.gallery_view.triggers.is_attached());
        assert!(app.history_view.triggers.is_attached());

        app.update(Message::SwitchTab(Tab::History));
        assert!(app.history_view.triggers.is_attached());
    }

    #[tokio::test]
    async fn submitting_prompt_inserts_pending_placeholder() {
        let mut app = TestAppBuilder::new()
            .with_generations(vec![GenerationBuilder::new().id("gen_1").build()])
            .build();

        app.update(Message::OpenPrompt);
        for c in "a lighthouse".chars() {
            app.update(Message::PromptInput(c));
        }
        app.update(Message::SubmitPrompt);

        assert_eq!(app.tab, Tab::History);
        assert!(app.prompt.is_none());
        let first = &app.history.items()[0];
        assert_eq!(first.id, "temp-1");
        assert_eq!(first.prompt, "a lighthouse");
        assert_eq!(first.status, ItemStatus::Pending);
        assert_eq!(app.history.items().len(), 2);
    }

    #[test]
    fn blank_prompt_is_ignored() {
        let mut app = TestAppBuilder::new().build();
        app.update(Message::OpenPrompt);
        app.update(Message::PromptInput(' '));
        app.update(Message::SubmitPrompt);
        assert!(app.history.items().is_empty());
    }

    #[test]
    fn completed_generation_replaces_placeholder() {
        let mut app = TestAppBuilder::new()
            .with_generations(vec![GenerationBuilder::new().id("gen_1").build()])
            .build();
        app.history
            .feed_mut()
            .insert_optimistic(Generation::placeholder("temp-1", "a fox"));

        app.handle_async_result(AsyncResult::GenerationCreated {
            placeholder: "temp-1".into(),
            result: Ok(GenerationBuilder::new().id("gen_2").prompt("a fox").build()),
        });

        let ids: Vec<&str> = app.history.items().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["gen_2", "gen_1"]);
    }

    #[test]
    fn refreshed_feed_does_not_duplicate_reconciled_item() {
        // The list fetch already returned the server copy of the generation
        let mut app = TestAppBuilder::new()
            .with_generations(vec![
                GenerationBuilder::new().id("gen_2").prompt("a fox").build(),
                GenerationBuilder::new().id("gen_1").build(),
            ])
            .build();
        app.history
            .feed_mut()
            .insert_optimistic(Generation::placeholder("temp-1", "a fox"));
        assert_eq!(app.history.items().len(), 3);

        app.handle_async_result(AsyncResult::GenerationCreated {
            placeholder: "temp-1".into(),
            result: Ok(GenerationBuilder::new().id("gen_2").prompt("a fox").build()),
        });

        let ids: Vec<&str> = app.history.items().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["gen_2", "gen_1"]);
    }

    #[test]
    fn failed_generation_marks_placeholder() {
        let mut app = TestAppBuilder::new().build();
        app.history
            .feed_mut()
            .insert_optimistic(Generation::placeholder("temp-1", "a fox"));

        app.handle_async_result(AsyncResult::GenerationCreated {
            placeholder: "temp-1".into(),
            result: Err(ApiError::HttpStatus(500, "Internal Server Error".into())),
        });

        assert_eq!(app.history.items()[0].status, ItemStatus::Failed);
        assert!(app.notice.as_deref().unwrap().contains("Generation failed"));
    }

    #[tokio::test]
    async fn refresh_keeps_in_flight_placeholders() {
        let mut app = TestAppBuilder::new()
            .tab(Tab::History)
            .with_generations(vec![GenerationBuilder::new().id("gen_1").build()])
            .build();
        app.history
            .feed_mut()
            .insert_optimistic(Generation::placeholder("temp-1", "a fox"));

        app.update(Message::Refresh);

        let ids: Vec<&str> = app.history.items().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["temp-1"]);
        assert!(app.history.is_fetching_more());
    }

    #[tokio::test]
    async fn changing_sort_starts_new_feed() {
        let mut app = TestAppBuilder::new()
            .with_pages(sample_pages())
            .has_more(false)
            .build();
        app.gallery_view.selected = 3;

        app.update(Message::CycleSort);

        assert_eq!(app.sort, Sort::Popular);
        assert!(app.gallery.items().is_empty());
        assert!(app.gallery.has_more());
        assert!(app.gallery.is_fetching_more());
        assert_eq!(app.gallery_view.selected, 0);
    }

    #[test]
    fn viewport_change_rearms_sentinel() {
        let mut app = TestAppBuilder::new()
            .with_pages(sample_pages())
            .viewport_height(24)
            .has_more(false)
            .build();
        app.gallery_view.triggers.attach();
        let vp = app.active_viewport();
        assert!(app.gallery_view.triggers.observe(vp).is_some());
        assert!(app.gallery_view.triggers.observe(vp).is_none());

        app.update(Message::UpdateViewportHeight(30));
        let vp = app.active_viewport();
        assert!(app.gallery_view.triggers.observe(vp).is_some());
    }

    #[test]
    fn key_press_clears_notice() {
        let mut app = TestAppBuilder::new().build();
        app.notice = Some("Generation failed".into());
        app.update(Message::SelectNext);
        assert!(app.notice.is_none());
    }
}
