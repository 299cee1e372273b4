// SPDX-License-Identifier: MIT

//! YouTube Data API client.
//!
//! Every call carries the caller's own access token, taken from the session
//! credential for the current request. Nothing is cached here.

use crate::error::AppError;
use crate::models::video::{Channel, PlaylistItem, Video};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Deadline applied to every provider call. The YouTube API is the only
/// unbounded-latency dependency in a request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// YouTube Data API client.
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for YouTubeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YouTubeClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different base URL (stub servers in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .expect("reqwest client"),
            base_url: base_url.into(),
        }
    }

    /// List the authenticated user's own channel.
    ///
    /// `mine=true` with `maxResults=1`; the API reports at most one channel
    /// for a user, and `page_info.total_results == 0` means they have none.
    pub async fn list_my_channel(&self, access_token: &str) -> Result<ChannelListResponse, AppError> {
        let url = format!("{}/channels", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("mine", "true"),
                ("part", "id,snippet,contentDetails,statistics"),
                ("maxResults", "1"),
            ])
            .send()
            .await
            .map_err(request_error)?;

        self.check_response_json(response).await
    }

    /// List items of an uploads playlist in a single page.
    ///
    /// `max_results` is set to the channel's reported video count; no
    /// iterative pagination is performed.
    pub async fn list_playlist_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        max_results: u32,
    ) -> Result<PlaylistItemListResponse, AppError> {
        let url = format!("{}/playlistItems", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("playlistId", playlist_id),
                ("part", "id,snippet,contentDetails"),
                ("maxResults", &max_results.to_string()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        self.check_response_json(response).await
    }

    /// Look up a single video by id.
    pub async fn get_video(&self, access_token: &str, video_id: &str) -> Result<Video, AppError> {
        let url = format!("{}/videos", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("id", video_id),
                ("part", "id,snippet,statistics,contentDetails"),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let list: VideoListResponse = self.check_response_json(response).await?;
        list.items
            .into_iter()
            .next()
            .ok_or_else(|| AppError::YouTubeApi(format!("Video {} not found", video_id)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::YouTubeApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::YouTubeApi(format!("JSON parse error: {}", e)))
    }
}

fn request_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(format!("YouTube request timed out: {}", e))
    } else {
        AppError::YouTubeApi(e.to_string())
    }
}

/// Channel listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelListResponse {
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
    #[serde(default)]
    pub items: Vec<Channel>,
}

/// Playlist items listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

/// Single-video listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "totalResults")]
    pub total_results: u32,
}
