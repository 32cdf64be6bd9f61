use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::error::ApiError;
use super::types::{ColoringPage, Generation, GenerationRequest, ListResponse, Sort};
use crate::feed::{Page, PageSource, PageToken};

pub const DEFAULT_API_BASE: &str = "https://api.coloring-gallery.example/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// REST client for the gallery backend.
#[derive(Clone)]
pub struct GalleryClient {
    http: reqwest::Client,
    base_url: String,
}

impl GalleryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_coloring_pages(
        &self,
        sort: Sort,
        page: u32,
        limit: usize,
    ) -> Result<Page<ColoringPage>, ApiError> {
        let url = format!("{}/coloring-pages", self.base_url);
        debug!(%url, page, limit, sort = sort.param(), "GET coloring pages");
        let resp: ListResponse<ColoringPage> = self
            .http
            .get(&url)
            .query(&[
                ("page", page.to_string()),
                ("limit", limit.to_string()),
                ("sort", sort.param().to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.into())
    }

    pub async fn fetch_generations(
        &self,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<Page<Generation>, ApiError> {
        let url = format!("{}/generations", self.base_url);
        debug!(%url, ?cursor, limit, "GET generations");
        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        let resp: ListResponse<Generation> = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.into())
    }

    pub async fn fetch_generation(&self, id: &str) -> Result<Generation, ApiError> {
        let url = format!("{}/generations/{}", self.base_url, id);
        let generation = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(generation)
    }

    pub async fn create_generation(&self, prompt: &str) -> Result<Generation, ApiError> {
        let url = format!("{}/generations", self.base_url);
        debug!(%url, "POST generation");
        let generation = self
            .http
            .post(&url)
            .json(&GenerationRequest { prompt })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(generation)
    }
}

/// The unified gallery list under one server-declared sort.
pub struct GalleryPages {
    client: GalleryClient,
    sort: Sort,
}

impl GalleryPages {
    pub fn new(client: GalleryClient, sort: Sort) -> Self {
        Self { client, sort }
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }
}

impl PageSource for GalleryPages {
    type Item = ColoringPage;

    fn label(&self) -> String {
        format!("gallery:{}", self.sort)
    }

    fn fetch_page(
        &self,
        token: PageToken,
        page_size: usize,
    ) -> impl Future<Output = Result<Page<ColoringPage>, ApiError>> + Send {
        async move {
            match token {
                PageToken::Number(page) => {
                    self.client
                        .fetch_coloring_pages(self.sort, page, page_size)
                        .await
                }
                PageToken::Cursor(_) => Err(ApiError::Parse(
                    "gallery lists are paged by number".into(),
                )),
            }
        }
    }
}

/// The signed-in user's AI generation history, newest first, cursor-paged.
pub struct GenerationHistory {
    client: GalleryClient,
}

impl GenerationHistory {
    pub fn new(client: GalleryClient) -> Self {
        Self { client }
    }
}

impl PageSource for GenerationHistory {
    type Item = Generation;

    fn label(&self) -> String {
        "history".into()
    }

    fn fetch_page(
        &self,
        token: PageToken,
        page_size: usize,
    ) -> impl Future<Output = Result<Page<Generation>, ApiError>> + Send {
        async move {
            match token {
                PageToken::Cursor(cursor) => {
                    self.client
                        .fetch_generations(cursor.as_deref(), page_size)
                        .await
                }
                PageToken::Number(_) => Err(ApiError::Parse(
                    "generation history is paged by cursor".into(),
                )),
            }
        }
    }
}
