// SPDX-License-Identifier: MIT

//! Tubekeep: curate a YouTube channel's uploads into a personal saved list.
//!
//! This crate provides the backend API: Google OAuth login, a one-shot
//! channel/uploads sync into Firestore, and saved-list management.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::UserStore;
use services::{GoogleOAuthClient, YouTubeClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: UserStore,
    pub youtube: YouTubeClient,
    pub oauth: GoogleOAuthClient,
}
