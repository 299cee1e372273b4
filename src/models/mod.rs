// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod user;
pub mod video;

pub use user::{AccessGrant, UserRecord};
pub use video::{Channel, PlaylistItem, Video};
