//! User record model for storage and API.

use crate::models::video::{Channel, PlaylistItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User record stored in Firestore, one document per Google identity.
///
/// The document ID is the Google subject id, so upserting by id keeps the
/// record unique per identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Google subject id (also used as document ID)
    pub id: String,
    /// Display name from identity claims
    pub name: String,
    /// Profile picture URL from identity claims
    pub profile: Option<String>,
    /// Current OAuth token bundle, overwritten on every login
    pub access: AccessGrant,
    /// Last-synced channel summary (None until first sync)
    #[serde(default)]
    pub channel: Option<Channel>,
    /// Snapshot of the channel's uploads, keyed by playlist-item id.
    /// Replaced wholesale on every sync, never merged.
    #[serde(default)]
    pub uploads: HashMap<String, PlaylistItem>,
    /// Cached id of the channel's "uploads" playlist
    #[serde(default)]
    pub upload_list_id: Option<String>,
    /// Ordered list of saved playlist-item ids; kept a subset of `uploads`
    /// keys, both at insertion and across snapshot rebuilds.
    #[serde(default)]
    pub saved: Vec<String>,
}

impl UserRecord {
    /// Fresh record for a first-time login, before any sync has run.
    pub fn new(id: String, name: String, profile: Option<String>, access: AccessGrant) -> Self {
        Self {
            id,
            name,
            profile,
            access,
            channel: None,
            uploads: HashMap::new(),
            upload_list_id: None,
            saved: Vec::new(),
        }
    }

    /// Whether this record holds a synced channel snapshot.
    pub fn has_snapshot(&self) -> bool {
        self.channel.as_ref().is_some_and(|c| !c.id.is_empty())
    }
}

/// OAuth token bundle issued by Google, stored opaquely on the user record
/// and embedded in the session token for per-request API calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant() -> AccessGrant {
        AccessGrant {
            access_token: "ya29.test".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_in: Some(3599),
            id_token: None,
            scope: None,
            token_type: Some("Bearer".to_string()),
        }
    }

    #[test]
    fn new_record_has_empty_library() {
        let user = UserRecord::new("U1".to_string(), "Test".to_string(), None, grant());
        assert!(user.uploads.is_empty());
        assert!(user.saved.is_empty());
        assert!(!user.has_snapshot());
    }

    #[test]
    fn record_deserializes_without_snapshot_fields() {
        // Records written at login time have no channel/uploads/saved yet;
        // the serde defaults must fill them in on read.
        let json = serde_json::json!({
            "id": "U1",
            "name": "Test",
            "profile": null,
            "access": { "access_token": "ya29.test" }
        });

        let user: UserRecord = serde_json::from_value(json).unwrap();
        assert_eq!(user.id, "U1");
        assert!(user.channel.is_none());
        assert!(user.uploads.is_empty());
        assert!(user.saved.is_empty());
        assert!(user.upload_list_id.is_none());
    }
}
