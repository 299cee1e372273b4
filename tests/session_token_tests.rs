// SPDX-License-Identifier: MIT

//! Session token tests.
//!
//! These tests verify that tokens issued at login can be decoded by the auth
//! middleware, catching compatibility issues early: the claims embed the
//! identity id AND the Google access grant, and both must round-trip.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tubekeep::middleware::auth::{create_session_token, SessionClaims};
use tubekeep::models::AccessGrant;

fn grant() -> AccessGrant {
    AccessGrant {
        access_token: "ya29.a0Af".to_string(),
        refresh_token: Some("1//0refresh".to_string()),
        expires_in: Some(3599),
        id_token: Some("eyJ.header.payload".to_string()),
        scope: Some("https://www.googleapis.com/auth/youtube.readonly".to_string()),
        token_type: Some("Bearer".to_string()),
    }
}

#[test]
fn test_session_token_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";
    let user_id = "110248495921238986420";

    let token = create_session_token(user_id, &grant(), signing_key).expect("token");

    // Decode token (like middleware does)
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<SessionClaims>(&token, &key, &validation)
        .expect("Failed to decode session token - check SessionClaims compatibility");

    // The identity id and the embedded grant must both survive the trip.
    assert_eq!(token_data.claims.sub, user_id);
    assert_eq!(token_data.claims.yt_access.access_token, "ya29.a0Af");
    assert_eq!(
        token_data.claims.yt_access.refresh_token.as_deref(),
        Some("1//0refresh")
    );
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_session_token_rejects_wrong_key() {
    let token = create_session_token("U1", &grant(), b"key_one_32_bytes_long_padding!!!").unwrap();

    let key = DecodingKey::from_secret(b"key_two_32_bytes_long_padding!!!");
    let validation = Validation::new(Algorithm::HS256);

    assert!(decode::<SessionClaims>(&token, &key, &validation).is_err());
}

#[test]
fn test_session_token_expiration_is_future() {
    use std::time::{SystemTime, UNIX_EPOCH};

    let signing_key = b"test_signing_key_32_bytes_long!!";
    let token = create_session_token("U1", &grant(), signing_key).unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false; // We'll check manually

    let token_data = decode::<SessionClaims>(&token, &key, &validation).unwrap();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    // Token should expire at least 29 days in the future
    assert!(
        token_data.claims.exp > now + 86400 * 29,
        "Token expiration should be ~30 days in the future"
    );
}
