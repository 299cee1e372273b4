// SPDX-License-Identifier: MIT

//! Library routes: channel sync, saved list, single-video lookup.
//!
//! All routes here require a session token; the auth middleware is applied
//! in routes/mod.rs.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::SavedListOp;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::video::{Channel, PlaylistItem, Video};
use crate::models::UserRecord;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/channel", get(get_channel))
        .route("/refresh-list", get(refresh_list))
        .route("/saved", get(get_saved))
        .route("/video/{video_id}", get(get_video))
        .route("/save", post(save_to_list))
        .route("/remove", post(remove_from_list))
}

// ─── Channel Sync ────────────────────────────────────────────

/// Channel + uploads envelope returned by the sync routes.
#[derive(Serialize)]
pub struct LibraryResponse {
    pub status: bool,
    pub data: LibraryData,
}

#[derive(Serialize)]
pub struct LibraryData {
    pub channel: Channel,
    pub uploads: Vec<PlaylistItem>,
}

/// Soft "no channel" outcome: transported as 200, flagged via `status`.
#[derive(Serialize)]
pub struct NoChannelResponse {
    pub status: bool,
    pub msg: String,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ChannelResponse {
    Library(LibraryResponse),
    NoChannel(NoChannelResponse),
}

fn library_response(user: UserRecord) -> Result<ChannelResponse> {
    let channel = user
        .channel
        .ok_or_else(|| AppError::Database("Record missing channel after sync".to_string()))?;
    let uploads = user.uploads.into_values().collect();

    Ok(ChannelResponse::Library(LibraryResponse {
        status: true,
        data: LibraryData { channel, uploads },
    }))
}

/// Return the stored channel snapshot, building it on first call.
///
/// A present snapshot is returned as-is with no provider call or freshness
/// check; staleness is accepted by design. Without a snapshot the channel is
/// listed, its uploads playlist pulled in one page capped at the reported
/// video count, and the result persisted in a single write.
async fn get_channel(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ChannelResponse>> {
    let record = state.store.require_user(&user.id).await?;

    if record.has_snapshot() {
        tracing::debug!(user_id = %user.id, "Returning stored channel snapshot");
        return Ok(Json(library_response(record)?));
    }

    let token = &user.yt_access.access_token;
    let channel_list = state.youtube.list_my_channel(token).await?;

    if channel_list.page_info.total_results == 0 {
        tracing::info!(user_id = %user.id, "User has no channel");
        return Ok(Json(ChannelResponse::NoChannel(NoChannelResponse {
            status: false,
            msg: "This User has no channel".to_string(),
        })));
    }

    let channel = channel_list
        .items
        .into_iter()
        .next()
        .ok_or_else(|| AppError::YouTubeApi("Channel listing returned no items".to_string()))?;

    let playlist_id = channel.uploads_playlist_id().to_string();
    let uploads = fetch_uploads(&state, token, &playlist_id, channel.video_count()).await?;

    tracing::info!(
        user_id = %user.id,
        channel_id = %channel.id,
        uploads = uploads.len(),
        "Built channel snapshot"
    );

    let updated = state
        .store
        .store_snapshot(&user.id, channel, uploads, playlist_id)
        .await?;

    Ok(Json(library_response(updated)?))
}

/// Force a rebuild of the uploads snapshot from the cached playlist id,
/// skipping the channel lookup entirely.
async fn refresh_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ChannelResponse>> {
    let record = state.store.require_user(&user.id).await?;

    // Both come from the same read so the rebuild cap matches the playlist.
    let (playlist_id, channel) = match (record.upload_list_id, record.channel) {
        (Some(playlist_id), Some(channel)) => (playlist_id, channel),
        _ => {
            return Err(AppError::NotFound(
                "No synced channel to refresh; fetch /channel first".to_string(),
            ))
        }
    };

    let token = &user.yt_access.access_token;
    let uploads = fetch_uploads(&state, token, &playlist_id, channel.video_count()).await?;

    tracing::info!(
        user_id = %user.id,
        uploads = uploads.len(),
        "Rebuilt uploads snapshot"
    );

    let updated = state.store.replace_uploads(&user.id, uploads).await?;
    Ok(Json(library_response(updated)?))
}

/// Pull the uploads playlist in one page and key the items by their id.
async fn fetch_uploads(
    state: &AppState,
    token: &str,
    playlist_id: &str,
    video_count: u32,
) -> Result<HashMap<String, PlaylistItem>> {
    let listing = state
        .youtube
        .list_playlist_items(token, playlist_id, video_count)
        .await?;

    Ok(listing
        .items
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect())
}

// ─── Saved List ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SavedListBody {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

#[derive(Serialize)]
pub struct SavedListResponse {
    pub status: bool,
    pub msg: String,
    pub data: SavedListData,
}

#[derive(Serialize)]
pub struct SavedListData {
    #[serde(rename = "saveList")]
    pub save_list: Vec<String>,
    pub video: PlaylistItem,
}

async fn mutate_saved_list(
    state: &AppState,
    user_id: &str,
    video_id: &str,
    op: SavedListOp,
    msg: &str,
) -> Result<Json<SavedListResponse>> {
    let updated = state.store.update_saved(user_id, video_id, op).await?;

    // update_saved only succeeds when the id is in `uploads`.
    let video = updated
        .uploads
        .get(video_id)
        .cloned()
        .ok_or_else(|| AppError::NotFoundInLibrary(video_id.to_string()))?;

    tracing::info!(user_id, video_id, op = ?op, "Saved list updated");

    Ok(Json(SavedListResponse {
        status: true,
        msg: msg.to_string(),
        data: SavedListData {
            save_list: updated.saved,
            video,
        },
    }))
}

/// Add a video to the saved list (idempotent set semantics).
async fn save_to_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SavedListBody>,
) -> Result<Json<SavedListResponse>> {
    mutate_saved_list(
        &state,
        &user.id,
        &body.video_id,
        SavedListOp::Add,
        "Video saved to list",
    )
    .await
}

/// Remove a video from the saved list.
async fn remove_from_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SavedListBody>,
) -> Result<Json<SavedListResponse>> {
    mutate_saved_list(
        &state,
        &user.id,
        &body.video_id,
        SavedListOp::Remove,
        "Video removed from list",
    )
    .await
}

#[derive(Serialize)]
pub struct SavedVideosResponse {
    pub status: bool,
    pub saved_videos: Vec<PlaylistItem>,
}

/// Project the saved ids through the uploads snapshot.
///
/// Ids whose upload entry was discarded by a later sync rebuild are dropped
/// silently rather than reported.
async fn get_saved(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SavedVideosResponse>> {
    let record = state.store.require_user(&user.id).await?;
    let saved_videos = project_saved(&record);

    Ok(Json(SavedVideosResponse {
        status: true,
        saved_videos,
    }))
}

fn project_saved(record: &UserRecord) -> Vec<PlaylistItem> {
    record
        .saved
        .iter()
        .filter_map(|id| record.uploads.get(id).cloned())
        .collect()
}

// ─── Single Video ────────────────────────────────────────────

#[derive(Serialize)]
pub struct VideoResponse {
    pub status: bool,
    pub data: VideoData,
}

#[derive(Serialize)]
pub struct VideoData {
    pub video: Video,
    pub is_saved: bool,
}

/// Fetch one video from the provider, store it under `uploads.<video_id>`,
/// and report whether it is currently saved.
async fn get_video(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> Result<Json<VideoResponse>> {
    let video = state
        .youtube
        .get_video(&user.yt_access.access_token, &video_id)
        .await?;

    let item = PlaylistItem::from_video(&video);
    let updated = state.store.store_video(&user.id, &video.id, item).await?;

    Ok(Json(VideoResponse {
        status: true,
        data: VideoData {
            is_saved: updated.saved.contains(&video_id),
            video,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::video::{PlaylistItemContentDetails, ResourceSnippet};
    use crate::models::AccessGrant;

    fn item(id: &str) -> PlaylistItem {
        PlaylistItem {
            id: id.to_string(),
            snippet: ResourceSnippet {
                title: format!("video {id}"),
                description: String::new(),
                published_at: None,
                thumbnails: None,
            },
            content_details: PlaylistItemContentDetails {
                video_id: id.to_string(),
                video_published_at: None,
            },
        }
    }

    fn record_with(saved: &[&str], uploads: &[&str]) -> UserRecord {
        let mut record = UserRecord::new(
            "U1".to_string(),
            "Test".to_string(),
            None,
            AccessGrant {
                access_token: "t".to_string(),
                refresh_token: None,
                expires_in: None,
                id_token: None,
                scope: None,
                token_type: None,
            },
        );
        record.uploads = uploads
            .iter()
            .map(|id| (id.to_string(), item(id)))
            .collect();
        record.saved = saved.iter().map(|s| s.to_string()).collect();
        record
    }

    #[test]
    fn project_saved_keeps_order() {
        let record = record_with(&["V2", "V1"], &["V1", "V2", "V3"]);
        let projected = project_saved(&record);
        let ids: Vec<&str> = projected.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["V2", "V1"]);
    }

    #[test]
    fn project_saved_drops_ids_lost_in_rebuild() {
        // A sync rebuild can discard an upload a stale saved id points at.
        let record = record_with(&["V1", "VGONE"], &["V1"]);
        let projected = project_saved(&record);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].id, "V1");
    }
}
