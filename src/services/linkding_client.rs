//! HTTP client for the linkding REST API.
//!
//! Every request carries `Authorization: Token <token>`. The listing endpoint
//! is paginated through the `next` url of each page.

use std::fmt;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Response};
use zeroize::Zeroizing;

use crate::types::bookmark::{Bookmark, BookmarkPage, NewBookmark};
use crate::types::errors::ApiError;

/// Page size requested from `/api/bookmarks/`.
pub const PAGE_LIMIT: u32 = 100;

/// Remote operations the bookmark view-model depends on.
#[async_trait]
pub trait BookmarkApi: Send + Sync {
    /// Fetches every bookmark, following pagination to the end.
    async fn fetch_all(&self) -> Result<Vec<Bookmark>, ApiError>;
    async fn create(&self, bookmark: &NewBookmark) -> Result<Bookmark, ApiError>;
    /// Sends the full record with `PUT /api/bookmarks/{id}/`.
    async fn update(&self, bookmark: &Bookmark) -> Result<Bookmark, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    /// Connectivity probe against `/api/`. Transport failures count as `false`.
    async fn probe(&self) -> bool;
}

/// Trims whitespace and a trailing `/` from a user-entered base url.
pub fn clean_base_url(url: &str) -> String {
    let url = url.trim();
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// `reqwest`-backed [`BookmarkApi`].
pub struct LinkdingClient {
    http: Client,
    base_url: String,
    token: Zeroizing<String>,
}

impl fmt::Debug for LinkdingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkdingClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl LinkdingClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    pub fn with_client(http: Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: clean_base_url(base_url),
            token: Zeroizing::new(token.to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn first_page_url(&self) -> String {
        self.endpoint(&format!("/api/bookmarks/?limit={}", PAGE_LIMIT))
    }

    pub fn bookmark_url(&self, id: i64) -> String {
        self.endpoint(&format!("/api/bookmarks/{}/", id))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("Token {}", self.token.as_str()))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    warn!("linkding answered {} for {}", status, url);
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl BookmarkApi for LinkdingClient {
    async fn fetch_all(&self) -> Result<Vec<Bookmark>, ApiError> {
        let mut bookmarks = Vec::new();
        let mut next = Some(self.first_page_url());

        while let Some(url) = next {
            debug!("GET {}", url);
            let response = self.send(self.request(Method::GET, &url)).await?;
            let page: BookmarkPage = decode(response).await?;
            bookmarks.extend(page.results);
            next = page.next;
        }
        debug!("fetched {} bookmarks", bookmarks.len());
        Ok(bookmarks)
    }

    async fn create(&self, bookmark: &NewBookmark) -> Result<Bookmark, ApiError> {
        let url = self.endpoint("/api/bookmarks/");
        debug!("POST {}", url);
        let response = self
            .send(self.request(Method::POST, &url).json(bookmark))
            .await?;
        decode(response).await
    }

    async fn update(&self, bookmark: &Bookmark) -> Result<Bookmark, ApiError> {
        let url = self.bookmark_url(bookmark.id);
        debug!("PUT {}", url);
        let response = self
            .send(self.request(Method::PUT, &url).json(bookmark))
            .await?;
        decode(response).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let url = self.bookmark_url(id);
        debug!("DELETE {}", url);
        self.send(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }

    async fn probe(&self) -> bool {
        let url = self.endpoint("/api/");
        match self.request(Method::GET, &url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("connectivity probe failed: {}", e);
                false
            }
        }
    }
}
