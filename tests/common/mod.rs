// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tubekeep::config::Config;
use tubekeep::db::UserStore;
use tubekeep::routes::create_router;
use tubekeep::services::{GoogleOAuthClient, YouTubeClient};
use tubekeep::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test store connected to the emulator.
#[allow(dead_code)]
pub async fn test_store() -> UserStore {
    UserStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock store (offline).
#[allow(dead_code)]
pub fn test_store_offline() -> UserStore {
    UserStore::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app_with(test_store_offline(), YouTubeClient::new())
}

/// Create a test app around a given store and YouTube client, so tests can
/// combine the emulator store with a stubbed provider.
#[allow(dead_code)]
pub fn create_app_with(store: UserStore, youtube: YouTubeClient) -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let oauth = GoogleOAuthClient::new(&config).expect("OAuth client");

    let state = Arc::new(AppState {
        config,
        store,
        youtube,
        oauth,
    });

    (create_router(state.clone()), state)
}
