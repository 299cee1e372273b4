// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations on user records.
//!
//! One document per user, keyed by the Google subject id. Mutations that
//! race per user (save/remove) run inside Firestore transactions so the
//! store's atomicity is the only concurrency mechanism needed.

use crate::db::collections;
use crate::error::AppError;
use crate::models::video::Channel;
use crate::models::{AccessGrant, PlaylistItem, UserRecord};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Deadline applied to every store operation.
const STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Mutation applied to the saved list. Both directions use set semantics:
/// adding a present id and removing an absent id are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedListOp {
    Add,
    Remove,
}

/// Firestore-backed user record store.
#[derive(Clone)]
pub struct UserStore {
    client: Option<firestore::FirestoreDb>,
}

impl UserStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // Emulator connections are unauthenticated to avoid leaking local
        // credentials into test runs.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock store for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Get a user record by Google subject id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        let client = self.get_client()?;
        with_deadline(async {
            client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(user_id)
                .await
                .map_err(|e| AppError::Database(e.to_string()))
        })
        .await
    }

    /// Get a user record, failing if it does not exist.
    pub async fn require_user(&self, user_id: &str) -> Result<UserRecord, AppError> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Database(format!("No record for user {}", user_id)))
    }

    // ─── Login Upsert ────────────────────────────────────────────

    /// Create-or-update a user record at login.
    ///
    /// Overwrites the identity fields and access grant while preserving any
    /// synced snapshot and saved list from a previous session. Runs in a
    /// transaction so a concurrent sync on the same record is not clobbered.
    pub async fn upsert_login(
        &self,
        user_id: &str,
        name: &str,
        profile: Option<String>,
        access: AccessGrant,
    ) -> Result<UserRecord, AppError> {
        let client = self.get_client()?;
        with_deadline(async {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            let existing: Option<UserRecord> = client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(user_id)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            let record = match existing {
                Some(mut user) => {
                    user.name = name.to_string();
                    user.profile = profile;
                    user.access = access;
                    user
                }
                None => UserRecord::new(
                    user_id.to_string(),
                    name.to_string(),
                    profile,
                    access,
                ),
            };

            client
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(user_id)
                .object(&record)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add user to transaction: {}", e))
                })?;

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

            tracing::info!(user_id, "User record upserted at login");
            Ok(record)
        })
        .await
    }

    // ─── Snapshot Writes ─────────────────────────────────────────

    /// Persist a freshly built channel snapshot in one write.
    ///
    /// Replaces `channel`, `uploads` and `upload_list_id` wholesale; stale
    /// upload entries from a previous sync are discarded and `saved` is
    /// pruned to the new keys, so a discarded upload cannot strand an id the
    /// user could never remove.
    pub async fn store_snapshot(
        &self,
        user_id: &str,
        channel: Channel,
        uploads: HashMap<String, PlaylistItem>,
        upload_list_id: String,
    ) -> Result<UserRecord, AppError> {
        self.mutate_user(user_id, move |user| {
            user.channel = Some(channel);
            user.uploads = uploads;
            user.upload_list_id = Some(upload_list_id);
            prune_saved(user);
            Ok(true)
        })
        .await
    }

    /// Replace the uploads snapshot only (forced refresh path). Prunes
    /// `saved` the same way a full snapshot write does.
    pub async fn replace_uploads(
        &self,
        user_id: &str,
        uploads: HashMap<String, PlaylistItem>,
    ) -> Result<UserRecord, AppError> {
        self.mutate_user(user_id, move |user| {
            user.uploads = uploads;
            prune_saved(user);
            Ok(true)
        })
        .await
    }

    /// Store a single fetched video under `uploads.<video_id>`.
    pub async fn store_video(
        &self,
        user_id: &str,
        video_id: &str,
        item: PlaylistItem,
    ) -> Result<UserRecord, AppError> {
        let key = video_id.to_string();
        self.mutate_user(user_id, move |user| {
            user.uploads.insert(key, item);
            Ok(true)
        })
        .await
    }

    // ─── Saved List ──────────────────────────────────────────────

    /// Atomically add or remove a saved video id.
    ///
    /// The membership check against `uploads` and the list mutation happen in
    /// one transaction, so two concurrent calls for the same user cannot lose
    /// an update or let an unknown id slip into `saved`.
    pub async fn update_saved(
        &self,
        user_id: &str,
        video_id: &str,
        op: SavedListOp,
    ) -> Result<UserRecord, AppError> {
        let video_id = video_id.to_string();
        self.mutate_user(user_id, move |user| {
            if !user.uploads.contains_key(&video_id) {
                return Err(AppError::NotFoundInLibrary(video_id.clone()));
            }
            Ok(apply_saved_op(&mut user.saved, &video_id, op))
        })
        .await
    }

    // ─── Transactional Read-Modify-Write ─────────────────────────

    /// Run a read-modify-write cycle on a user record inside a transaction.
    ///
    /// The closure returns `Ok(true)` if the record changed (commit),
    /// `Ok(false)` for a no-op (rollback, record returned as read), or an
    /// error (rollback, error propagated).
    async fn mutate_user<F>(&self, user_id: &str, mutate: F) -> Result<UserRecord, AppError>
    where
        F: FnOnce(&mut UserRecord) -> Result<bool, AppError>,
    {
        let client = self.get_client()?;
        with_deadline(async {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            let mut user: UserRecord = client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(user_id)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .ok_or_else(|| AppError::Database(format!("No record for user {}", user_id)))?;

            let changed = match mutate(&mut user) {
                Ok(changed) => changed,
                Err(e) => {
                    let _ = transaction.rollback().await;
                    return Err(e);
                }
            };

            if !changed {
                let _ = transaction.rollback().await;
                return Ok(user);
            }

            client
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(user_id)
                .object(&user)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add user to transaction: {}", e))
                })?;

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

            Ok(user)
        })
        .await
    }
}

/// Drop saved ids whose upload entry no longer exists after a rebuild,
/// keeping `saved` a subset of `uploads` keys across syncs too.
fn prune_saved(user: &mut UserRecord) {
    let uploads = &user.uploads;
    user.saved.retain(|id| uploads.contains_key(id));
}

/// Apply a saved-list operation with set semantics.
///
/// Returns whether the list changed. Order of prior entries is preserved.
pub fn apply_saved_op(saved: &mut Vec<String>, video_id: &str, op: SavedListOp) -> bool {
    match op {
        SavedListOp::Add => {
            if saved.iter().any(|id| id == video_id) {
                false
            } else {
                saved.push(video_id.to_string());
                true
            }
        }
        SavedListOp::Remove => {
            let before = saved.len();
            saved.retain(|id| id != video_id);
            saved.len() != before
        }
    }
}

/// Bound a store operation with a deadline.
async fn with_deadline<T, F>(fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(STORE_TIMEOUT, fut)
        .await
        .map_err(|_| AppError::Timeout("store operation timed out".to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::video::{PlaylistItemContentDetails, ResourceSnippet};
    use crate::models::AccessGrant;

    #[test]
    fn prune_saved_drops_ids_not_in_uploads() {
        let mut user = UserRecord::new(
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
        user.uploads.insert(
            "V1".to_string(),
            PlaylistItem {
                id: "V1".to_string(),
                snippet: ResourceSnippet {
                    title: "v1".to_string(),
                    description: String::new(),
                    published_at: None,
                    thumbnails: None,
                },
                content_details: PlaylistItemContentDetails {
                    video_id: "V1".to_string(),
                    video_published_at: None,
                },
            },
        );
        user.saved = vec!["V1".to_string(), "VGONE".to_string()];

        prune_saved(&mut user);
        assert_eq!(user.saved, vec!["V1"]);
    }

    #[test]
    fn save_appends_once() {
        let mut saved = vec![];
        assert!(apply_saved_op(&mut saved, "V1", SavedListOp::Add));
        assert_eq!(saved, vec!["V1"]);

        // Saving an already-saved id must not duplicate it.
        assert!(!apply_saved_op(&mut saved, "V1", SavedListOp::Add));
        assert_eq!(saved, vec!["V1"]);
    }

    #[test]
    fn remove_deletes_and_is_idempotent() {
        let mut saved = vec!["V1".to_string(), "V2".to_string()];
        assert!(apply_saved_op(&mut saved, "V1", SavedListOp::Remove));
        assert_eq!(saved, vec!["V2"]);

        // Removing an id not present is a no-op.
        assert!(!apply_saved_op(&mut saved, "V1", SavedListOp::Remove));
        assert_eq!(saved, vec!["V2"]);
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut saved = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        apply_saved_op(&mut saved, "B", SavedListOp::Remove);
        assert_eq!(saved, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn offline_store_reports_database_error() {
        let store = UserStore::new_mock();
        let err = store.get_user("U1").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
