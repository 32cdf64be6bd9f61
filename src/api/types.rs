use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::{Identified, ItemStatus, Page, PageInfo};

/// List envelope returned by every paged endpoint.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination: Option<Pagination>,
}

/// Paging fields; `page`, `limit` and `total` are not used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub has_next_page: bool,
    pub next_cursor: Option<String>,
}

impl<T> From<ListResponse<T>> for Page<T> {
    fn from(resp: ListResponse<T>) -> Self {
        Page {
            items: resp.data,
            page_info: resp.pagination.map(|p| PageInfo {
                has_next_page: p.has_next_page,
                next_cursor: p.next_cursor,
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColoringPage {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub downloads: u32,
    pub created_at: Option<String>,
}

impl ColoringPage {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref()?)
    }

    /// Public page on the gallery site.
    pub fn web_url(&self, site: &str) -> String {
        format!("{}/coloring-pages/{}", site.trim_end_matches('/'), self.id)
    }
}

impl Identified for ColoringPage {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub status: ItemStatus,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
}

impl Generation {
    /// Local stand-in shown until the server confirms the generation.
    pub fn placeholder(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            status: ItemStatus::Pending,
            image_url: None,
            created_at: Some(Utc::now().to_rfc3339()),
        }
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref()?)
    }

    pub fn is_pending(&self) -> bool {
        self.status == ItemStatus::Pending
    }
}

impl Identified for Generation {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Server-declared orderings for the gallery list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    #[default]
    Newest,
    Popular,
    Downloads,
}

impl Sort {
    pub fn all() -> &'static [Sort] {
        &[Sort::Newest, Sort::Popular, Sort::Downloads]
    }

    pub fn param(&self) -> &'static str {
        match self {
            Sort::Newest => "newest",
            Sort::Popular => "popular",
            Sort::Downloads => "downloads",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sort::Newest => "Newest",
            Sort::Popular => "Popular",
            Sort::Downloads => "Most Downloaded",
        }
    }

    /// Client-side comparator matching the server's ordering.
    pub fn comparator(&self) -> fn(&ColoringPage, &ColoringPage) -> Ordering {
        match self {
            Sort::Newest => by_newest,
            Sort::Popular => by_likes,
            Sort::Downloads => by_downloads,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" | "new" => Ok(Self::Newest),
            "popular" | "likes" => Ok(Self::Popular),
            "downloads" => Ok(Self::Downloads),
            _ => Err(format!(
                "Invalid sort: {s}. Use 'newest', 'popular' or 'downloads'"
            )),
        }
    }
}

fn by_newest(a: &ColoringPage, b: &ColoringPage) -> Ordering {
    b.created().cmp(&a.created())
}

fn by_likes(a: &ColoringPage, b: &ColoringPage) -> Ordering {
    b.likes.cmp(&a.likes)
}

fn by_downloads(a: &ColoringPage, b: &ColoringPage) -> Ordering {
    b.downloads.cmp(&a.downloads)
}
