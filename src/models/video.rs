//! Typed YouTube Data API resources.
//!
//! The API returns loosely-shaped JSON; these structs pin down the fields we
//! actually rely on so that a response missing a required field fails
//! deserialization instead of propagating nulls into storage.

use serde::{Deserialize, Serialize};

/// A channel resource with the parts we request
/// (`id,snippet,contentDetails,statistics`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub snippet: ResourceSnippet,
    #[serde(rename = "contentDetails")]
    pub content_details: ChannelContentDetails,
    pub statistics: ChannelStatistics,
}

impl Channel {
    /// The id of the channel's auto-generated "uploads" playlist.
    pub fn uploads_playlist_id(&self) -> &str {
        &self.content_details.related_playlists.uploads
    }

    /// Reported upload count, used as the single-page listing cap.
    pub fn video_count(&self) -> u32 {
        self.statistics.video_count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelContentDetails {
    #[serde(rename = "relatedPlaylists")]
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: String,
}

/// YouTube serializes counters as JSON strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStatistics {
    #[serde(
        rename = "videoCount",
        deserialize_with = "de_string_u32",
        serialize_with = "ser_string_u32"
    )]
    pub video_count: u32,
    #[serde(
        rename = "subscriberCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subscriber_count: Option<String>,
    #[serde(rename = "viewCount", default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<String>,
}

/// A playlist item from the uploads playlist
/// (`id,snippet,contentDetails` parts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    pub snippet: ResourceSnippet,
    #[serde(rename = "contentDetails")]
    pub content_details: PlaylistItemContentDetails,
}

impl PlaylistItem {
    /// Build an uploads entry from a directly-fetched video resource.
    ///
    /// Single-video lookups return a `Video`, but the uploads snapshot holds
    /// playlist items; this keeps the map homogeneous when a lookup writes
    /// back into it.
    pub fn from_video(video: &Video) -> Self {
        Self {
            id: video.id.clone(),
            snippet: video.snippet.clone(),
            content_details: PlaylistItemContentDetails {
                video_id: video.id.clone(),
                video_published_at: video.snippet.published_at.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemContentDetails {
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(
        rename = "videoPublishedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub video_published_at: Option<String>,
}

/// A single video resource (`snippet,statistics,contentDetails` parts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub snippet: ResourceSnippet,
    #[serde(
        rename = "contentDetails",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<serde_json::Value>,
}

/// Snippet shared by channels, playlist items and videos. Only the fields the
/// frontend renders are typed; thumbnails stay as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "publishedAt", default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<serde_json::Value>,
}

fn de_string_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u32),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.parse().map_err(D::Error::custom),
        StringOrNumber::Number(n) => Ok(n),
    }
}

fn ser_string_u32<S>(value: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_decodes_from_api_shape() {
        let json = serde_json::json!({
            "id": "UC123",
            "snippet": { "title": "My Channel", "description": "stuff" },
            "contentDetails": { "relatedPlaylists": { "uploads": "UU123" } },
            "statistics": { "videoCount": "42", "subscriberCount": "7" }
        });

        let channel: Channel = serde_json::from_value(json).unwrap();
        assert_eq!(channel.uploads_playlist_id(), "UU123");
        assert_eq!(channel.video_count(), 42);
    }

    #[test]
    fn channel_round_trips_through_storage() {
        // videoCount is a JSON string on the wire; it must survive
        // serialize-then-deserialize so stored snapshots read back.
        let json = serde_json::json!({
            "id": "UC123",
            "snippet": { "title": "My Channel" },
            "contentDetails": { "relatedPlaylists": { "uploads": "UU123" } },
            "statistics": { "videoCount": "3" }
        });

        let channel: Channel = serde_json::from_value(json).unwrap();
        let stored = serde_json::to_value(&channel).unwrap();
        let read_back: Channel = serde_json::from_value(stored).unwrap();
        assert_eq!(read_back.video_count(), 3);
    }

    #[test]
    fn channel_rejects_missing_uploads_playlist() {
        let json = serde_json::json!({
            "id": "UC123",
            "snippet": { "title": "My Channel" },
            "contentDetails": { "relatedPlaylists": {} },
            "statistics": { "videoCount": "1" }
        });

        assert!(serde_json::from_value::<Channel>(json).is_err());
    }

    #[test]
    fn playlist_item_requires_video_id() {
        let json = serde_json::json!({
            "id": "PLI1",
            "snippet": { "title": "Video one" },
            "contentDetails": {}
        });

        assert!(serde_json::from_value::<PlaylistItem>(json).is_err());
    }
}
