// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT session token tests.
//!
//! These tests verify that tokens created by the login flow can be decoded
//! by the auth middleware, catching compatibility issues early.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use urbex_api::middleware::auth::create_jwt;

/// Claims structure that must match what the middleware expects.
/// This is the canonical format - if either create_jwt or the middleware
/// changes, this test should catch the incompatibility.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

#[test]
fn test_jwt_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";
    let user_id = "2c6f3e0e-5f4a-4a88-9d22-test";

    // Create token (like the login handler does)
    let token = create_jwt(user_id, signing_key).expect("Failed to create JWT");

    // Decode token (like the middleware does)
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, user_id);
    assert!(token_data.claims.exp > 0);
    assert!(token_data.claims.iat > 0);
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_jwt_expiration_is_future() {
    use std::time::{SystemTime, UNIX_EPOCH};

    let signing_key = b"test_signing_key_32_bytes_long!!";
    let token = create_jwt("user-1", signing_key).unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false; // We'll check manually

    let token_data = decode::<Claims>(&token, &key, &validation).unwrap();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    // Sessions last 24 hours
    assert!(
        token_data.claims.exp > now + 23 * 60 * 60,
        "Token expiration should be ~24 hours in the future"
    );
    assert!(
        token_data.claims.exp <= now + 25 * 60 * 60,
        "Token expiration should not exceed 24 hours by much"
    );
}

#[test]
fn test_jwt_rejected_with_wrong_key() {
    let token = create_jwt("user-1", b"the_right_signing_key_32_bytes!!").unwrap();

    let key = DecodingKey::from_secret(b"a_different_signing_key_32bytes!");
    let validation = Validation::new(Algorithm::HS256);

    assert!(
        decode::<Claims>(&token, &key, &validation).is_err(),
        "Token signed with a different key must not validate"
    );
}

#[test]
fn test_jwt_rejected_when_expired() {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let signing_key = b"test_signing_key_32_bytes_long!!";
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    // Token that expired an hour ago
    let claims = Claims {
        sub: "user-1".to_string(),
        exp: now - 3600,
        iat: now - 7200,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    assert!(
        decode::<Claims>(&token, &key, &validation).is_err(),
        "Expired token must not validate"
    );
}

#[test]
fn test_jwt_rejected_when_tampered() {
    let token = create_jwt("user-1", b"test_signing_key_32_bytes_long!!").unwrap();

    // Flip a character in the payload section
    let mut parts: Vec<String> = token.split('.').map(|s| s.to_string()).collect();
    assert_eq!(parts.len(), 3);
    parts[1] = format!("X{}", &parts[1][1..]);
    let tampered = parts.join(".");

    let key = DecodingKey::from_secret(b"test_signing_key_32_bytes_long!!");
    let validation = Validation::new(Algorithm::HS256);

    assert!(
        decode::<Claims>(&tampered, &key, &validation).is_err(),
        "Tampered token must not validate"
    );
}
