// SPDX-License-Identifier: MIT

//! Services module - external provider gateways.

pub mod google_auth;
pub mod youtube;

pub use google_auth::{GoogleOAuthClient, IdentityClaims};
pub use youtube::YouTubeClient;
