use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use url::Url;

use medialib_core::models::Catalog;

use crate::error::ApiError;
use crate::traits::LibraryBackend;
use crate::types::{
    CoverKind, CoverResponse, ErrorBody, NextEpisode, PathRequest, PlayRequest, PlayerStatus,
    ProgressUpdate, SetCoverRequest,
};

/// HTTP client for the media library server.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base: String,
    http: Client,
}

impl BackendClient {
    /// Build a client for `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base: parsed.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.base, route.trim_start_matches('/'))
    }

    /// Check the HTTP response for errors, pulling the server's `error` text.
    async fn check_response(resp: Response) -> Result<Response, ApiError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        tracing::warn!(status, %message, "Backend API error");
        Err(ApiError::Api { status, message })
    }

    async fn parse<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// The server's `{"error": ...}` text, or `HTTP <status>` when absent.
fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"))
}

impl LibraryBackend for BackendClient {
    async fn fetch_library(&self) -> Result<Catalog, ApiError> {
        let resp = self.http.get(self.endpoint("library")).send().await?;
        let resp = Self::check_response(resp).await?;
        let catalog: Catalog = Self::parse(resp).await?;
        tracing::debug!(
            series = catalog.series.len(),
            movies = catalog.movies.len(),
            "Fetched library"
        );
        Ok(catalog)
    }

    async fn start_playback(&self, path: &str, start_time: f64) -> Result<(), ApiError> {
        tracing::info!(path, start_time, "Requesting external playback");
        let resp = self
            .http
            .post(self.endpoint("play"))
            .json(&PlayRequest { path, start_time })
            .send()
            .await?;
        Self::check_response(resp).await?;
        Ok(())
    }

    async fn player_status(&self) -> Result<Option<PlayerStatus>, ApiError> {
        let resp = self.http.get(self.endpoint("vlc/status")).send().await?;
        if !resp.status().is_success() {
            tracing::trace!(status = resp.status().as_u16(), "External player not reachable");
            return Ok(None);
        }
        Ok(Some(Self::parse(resp).await?))
    }

    async fn update_progress(&self, update: &ProgressUpdate) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.endpoint("progress"))
            .json(update)
            .send()
            .await?;
        Self::check_response(resp).await?;
        Ok(())
    }

    async fn next_episode(&self, path: &str) -> Result<Option<NextEpisode>, ApiError> {
        let resp = self
            .http
            .post(self.endpoint("next-episode"))
            .json(&PathRequest { path })
            .send()
            .await?;

        // 404 means the series has no further episode.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check_response(resp).await?;
        Ok(Some(Self::parse(resp).await?))
    }

    async fn reset_progress(&self, path: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.endpoint("reset-progress"))
            .json(&PathRequest { path })
            .send()
            .await?;
        Self::check_response(resp).await?;
        Ok(())
    }

    async fn cover(&self, title: &str, kind: CoverKind) -> Result<Option<String>, ApiError> {
        let resp = self
            .http
            .get(self.endpoint("cover"))
            .query(&[("title", title), ("type", kind.as_str())])
            .send()
            .await?;
        let resp = Self::check_response(resp).await?;
        let body: CoverResponse = Self::parse(resp).await?;
        Ok(body.cover_url)
    }

    async fn set_cover(&self, title: &str, kind: CoverKind, cover_url: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.endpoint("cover"))
            .json(&SetCoverRequest {
                title,
                kind,
                cover_url,
            })
            .send()
            .await?;
        Self::check_response(resp).await?;
        Ok(())
    }
}
