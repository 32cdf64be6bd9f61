//! Test data builders and a scripted page source.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, Utc};
use tokio::sync::{mpsc, oneshot};

use crate::api::{ApiError, ColoringPage, Generation};
use crate::app::{App, Tab};
use crate::feed::{Admission, FeedLoader, Identified, ItemStatus, Page, PageSource, PageToken};
use crate::settings::Settings;
use crate::theme::ResolvedTheme;

/// Minimal feed item for exercising the feed core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: u32,
    pub label: String,
}

impl Tile {
    pub fn new(id: u32) -> Self {
        Self::labelled(id, &format!("tile {id}"))
    }

    pub fn labelled(id: u32, label: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
        }
    }
}

impl Identified for Tile {
    type Id = u32;

    fn id(&self) -> &u32 {
        &self.id
    }
}

pub fn tiles(ids: impl IntoIterator<Item = u32>) -> Vec<Tile> {
    ids.into_iter().map(Tile::new).collect()
}

/// A fetch made against a [`ScriptedSource`], waiting for the test to answer.
pub struct PendingCall {
    pub token: PageToken,
    pub page_size: usize,
    reply: oneshot::Sender<Result<Page<Tile>, ApiError>>,
}

impl PendingCall {
    pub fn reply(self, result: Result<Page<Tile>, ApiError>) {
        let _ = self.reply.send(result);
    }
}

/// Test-side handle on the calls a [`ScriptedSource`] receives.
pub struct CallLog {
    rx: mpsc::UnboundedReceiver<PendingCall>,
    peak: Arc<AtomicUsize>,
}

impl CallLog {
    pub async fn next(&mut self) -> PendingCall {
        match self.rx.recv().await {
            Some(call) => call,
            None => panic!("scripted source dropped"),
        }
    }

    pub fn try_next(&mut self) -> Option<PendingCall> {
        self.rx.try_recv().ok()
    }

    /// Most fetches that were ever running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Page source whose fetches block until the test replies through [`CallLog`].
pub struct ScriptedSource {
    tx: mpsc::UnboundedSender<PendingCall>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new() -> (Self, CallLog) {
        let (tx, rx) = mpsc::unbounded_channel();
        let peak = Arc::new(AtomicUsize::new(0));
        let source = Self {
            tx,
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::clone(&peak),
        };
        (source, CallLog { rx, peak })
    }
}

struct ActiveCall(Arc<AtomicUsize>);

impl Drop for ActiveCall {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PageSource for ScriptedSource {
    type Item = Tile;

    fn label(&self) -> String {
        "scripted".into()
    }

    fn fetch_page(
        &self,
        token: PageToken,
        page_size: usize,
    ) -> impl Future<Output = Result<Page<Tile>, ApiError>> + Send {
        let tx = self.tx.clone();
        let active = Arc::clone(&self.active);
        let peak = Arc::clone(&self.peak);

        async move {
            let running = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(running, Ordering::SeqCst);
            let _active = ActiveCall(active);

            let (reply, answer) = oneshot::channel();
            let call = PendingCall {
                token,
                page_size,
                reply,
            };
            if tx.send(call).is_err() {
                return Err(ApiError::Network("call log dropped".into()));
            }
            answer
                .await
                .unwrap_or_else(|_| Err(ApiError::Network("dropped".into())))
        }
    }
}

pub struct PageBuilder {
    id: String,
    title: String,
    category: Option<String>,
    description: Option<String>,
    likes: u32,
    downloads: u32,
    created_at: Option<String>,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl PageBuilder {
    pub fn new() -> Self {
        Self {
            id: "cp_1".to_string(),
            title: "Test Page".to_string(),
            category: Some("animals".to_string()),
            description: None,
            likes: 10,
            downloads: 100,
            created_at: Some("2024-05-01T12:00:00Z".to_string()),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn likes(mut self, likes: u32) -> Self {
        self.likes = likes;
        self
    }

    pub fn downloads(mut self, downloads: u32) -> Self {
        self.downloads = downloads;
        self
    }

    pub fn created_at(mut self, created_at: &str) -> Self {
        self.created_at = Some(created_at.to_string());
        self
    }

    /// Timestamp relative to now, so rendered ages are stable.
    pub fn created_ago(mut self, age: Duration) -> Self {
        self.created_at = Some((Utc::now() - age).to_rfc3339());
        self
    }

    pub fn build(self) -> ColoringPage {
        ColoringPage {
            image_url: Some(format!("https://cdn.example.com/{}.png", self.id)),
            id: self.id,
            title: self.title,
            category: self.category,
            description: self.description,
            likes: self.likes,
            downloads: self.downloads,
            created_at: self.created_at,
        }
    }
}

pub struct GenerationBuilder {
    id: String,
    prompt: String,
    status: ItemStatus,
    created_at: Option<String>,
}

impl Default for GenerationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl GenerationBuilder {
    pub fn new() -> Self {
        Self {
            id: "gen_1".to_string(),
            prompt: "a cat wearing a hat".to_string(),
            status: ItemStatus::Completed,
            created_at: Some("2024-05-01T12:00:00Z".to_string()),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }

    pub fn status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn created_ago(mut self, age: Duration) -> Self {
        self.created_at = Some((Utc::now() - age).to_rfc3339());
        self
    }

    pub fn build(self) -> Generation {
        let image_url = (self.status == ItemStatus::Completed)
            .then(|| format!("https://cdn.example.com/{}.png", self.id));
        Generation {
            id: self.id,
            prompt: self.prompt,
            status: self.status,
            image_url,
            created_at: self.created_at,
        }
    }
}

/// Settle one page into a loader's feed without touching the network.
pub fn seed<S: PageSource>(loader: &mut FeedLoader<S>, items: Vec<S::Item>, has_more: bool) {
    let feed = loader.feed_mut();
    if let Admission::Issue(request) = feed.begin_fetch() {
        let page = if has_more {
            Page::new(items, true).with_cursor("next")
        } else {
            Page::new(items, false)
        };
        feed.settle(request.ticket, Ok(page));
    }
}

#[allow(dead_code)]
pub struct TestAppBuilder {
    tab: Tab,
    pages: Vec<ColoringPage>,
    generations: Vec<Generation>,
    has_more: bool,
    selected: usize,
    show_help: bool,
    show_detail: bool,
    notice: Option<String>,
    theme: ResolvedTheme,
    viewport_height: Option<u16>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            tab: Tab::Gallery,
            pages: Vec::new(),
            generations: Vec::new(),
            has_more: true,
            selected: 0,
            show_help: false,
            show_detail: false,
            notice: None,
            theme: ResolvedTheme::dark(),
            viewport_height: None,
        }
    }

    pub fn tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }

    pub fn with_pages(mut self, pages: Vec<ColoringPage>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_generations(mut self, generations: Vec<Generation>) -> Self {
        self.generations = generations;
        self
    }

    pub fn has_more(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }

    pub fn show_help(mut self) -> Self {
        self.show_help = true;
        self
    }

    pub fn show_detail(mut self) -> Self {
        self.show_detail = true;
        self
    }

    pub fn notice(mut self, msg: &str) -> Self {
        self.notice = Some(msg.to_string());
        self
    }

    pub fn theme(mut self, theme: ResolvedTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn viewport_height(mut self, height: u16) -> Self {
        self.viewport_height = Some(height);
        self
    }

    pub fn build(self) -> App {
        let settings = Settings {
            // Nothing listens here; spawned fetches fail fast
            api_base: "http://127.0.0.1:9".to_string(),
            ..Settings::default()
        };
        let mut app = App::new(settings, self.theme).expect("test app");

        if !self.pages.is_empty() {
            seed(&mut app.gallery, self.pages, self.has_more);
        }
        if !self.generations.is_empty() {
            seed(&mut app.history, self.generations, self.has_more);
        }
        app.tab = self.tab;
        match self.tab {
            Tab::Gallery => app.gallery_view.selected = self.selected,
            Tab::History => app.history_view.selected = self.selected,
        }
        app.show_help = self.show_help;
        app.show_detail = self.show_detail;
        app.notice = self.notice;
        app.viewport_height = self.viewport_height;
        app
    }
}

/// Five pages, newest first.
pub fn sample_pages() -> Vec<ColoringPage> {
    vec![
        PageBuilder::new()
            .id("cp_5")
            .title("Sleepy Fox in Autumn Leaves")
            .category("animals")
            .likes(42)
            .downloads(310)
            .created_at("2024-05-05T09:00:00Z")
            .build(),
        PageBuilder::new()
            .id("cp_4")
            .title("Castle on a Hill")
            .category("fantasy")
            .likes(17)
            .downloads(95)
            .created_at("2024-05-04T09:00:00Z")
            .build(),
        PageBuilder::new()
            .id("cp_3")
            .title("Mandala Garden")
            .category("patterns")
            .description("Concentric petals with plenty of small spaces for fine pens.")
            .likes(88)
            .downloads(1204)
            .created_at("2024-05-03T09:00:00Z")
            .build(),
        PageBuilder::new()
            .id("cp_2")
            .title("Rocket to the Moon")
            .category("space")
            .likes(5)
            .downloads(40)
            .created_at("2024-05-02T09:00:00Z")
            .build(),
        PageBuilder::new()
            .id("cp_1")
            .title("Under the Sea")
            .category("ocean")
            .likes(63)
            .downloads(502)
            .created_at("2024-05-01T09:00:00Z")
            .build(),
    ]
}

pub fn sample_generations() -> Vec<Generation> {
    vec![
        GenerationBuilder::new()
            .id("gen_3")
            .prompt("a dragon reading a book")
            .status(ItemStatus::Pending)
            .build(),
        GenerationBuilder::new()
            .id("gen_2")
            .prompt("a lighthouse in a storm")
            .build(),
        GenerationBuilder::new()
            .id("gen_1")
            .prompt("a cat wearing a hat")
            .status(ItemStatus::Failed)
            .build(),
    ]
}

/// Three pages dated relative to now, newest first.
pub fn recent_pages() -> Vec<ColoringPage> {
    vec![
        PageBuilder::new()
            .id("cp_3")
            .title("Sleepy Fox")
            .likes(42)
            .downloads(310)
            .created_ago(Duration::hours(3))
            .build(),
        PageBuilder::new()
            .id("cp_2")
            .title("Castle on a Hill")
            .category("fantasy")
            .likes(17)
            .downloads(95)
            .created_ago(Duration::days(2))
            .build(),
        PageBuilder::new()
            .id("cp_1")
            .title("Mandala Garden")
            .category("patterns")
            .likes(8)
            .downloads(1204)
            .created_ago(Duration::days(40))
            .build(),
    ]
}

/// One generation per status, dated relative to now.
pub fn recent_generations() -> Vec<Generation> {
    vec![
        GenerationBuilder::new()
            .id("gen_3")
            .prompt("a dragon reading a book")
            .status(ItemStatus::Pending)
            .created_ago(Duration::minutes(5))
            .build(),
        GenerationBuilder::new()
            .id("gen_2")
            .prompt("a lighthouse in a storm")
            .created_ago(Duration::hours(3))
            .build(),
        GenerationBuilder::new()
            .id("gen_1")
            .prompt("a cat wearing a hat")
            .status(ItemStatus::Failed)
            .created_ago(Duration::days(2))
            .build(),
    ]
}
