use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn encode_claims(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_sign_and_validate_round_trip() {
    let user_id = Uuid::new_v4();

    let token = sign_token(
        user_id,
        "test@example.com",
        "PRO",
        ROLE_USER,
        SECRET,
        ACCESS_TOKEN_TTL_SECS,
    )
    .expect("Signing should succeed");

    let claims = validate_token(&token, SECRET, ROLE_USER).expect("Valid token should pass");
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.email, "test@example.com");
    assert_eq!(claims.plan, "PRO");
    assert_eq!(claims.role, ROLE_USER);
}

#[test]
fn test_validate_token_expired() {
    let my_claims = Claims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        email: "test@example.com".to_string(),
        plan: "PRO".to_string(),
        role: ROLE_USER.to_string(),
        exp: 1, // past
        iat: 1,
    };

    let token = encode_claims(&my_claims, SECRET);

    let result = validate_token(&token, SECRET, ROLE_USER);
    assert!(result.is_err());
}

#[test]
fn test_validate_token_invalid_signature() {
    let my_claims = Claims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        email: "test@example.com".to_string(),
        plan: "PRO".to_string(),
        role: ROLE_USER.to_string(),
        exp: 9999999999, // far future
        iat: 1,
    };

    let token = encode_claims(&my_claims, "wrongsecret");

    let result = validate_token(&token, SECRET, ROLE_USER);
    assert!(result.is_err());
}

#[test]
fn test_validate_token_rejects_other_role() {
    let my_claims = Claims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        email: "admin@example.com".to_string(),
        plan: "NOMEMBERSHIP".to_string(),
        role: ROLE_ADMIN.to_string(),
        exp: 9999999999, // far future
        iat: 1,
    };

    let token = encode_claims(&my_claims, SECRET);

    let result = validate_token(&token, SECRET, ROLE_USER);
    assert!(result.is_err());
}

#[test]
fn test_refresh_ttl_outlives_access_ttl() {
    assert!(REFRESH_TOKEN_TTL_SECS > ACCESS_TOKEN_TTL_SECS);
}

#[test]
fn test_hash_and_verify_secret() {
    let hash = hash_secret("hunter2hunter2").unwrap();
    assert_ne!(hash, "hunter2hunter2");
    assert!(verify_secret("hunter2hunter2", &hash));
    assert!(!verify_secret("wrong-password", &hash));
}

#[test]
fn test_verify_secret_rejects_garbage_hash() {
    assert!(!verify_secret("anything", "not-a-phc-string"));
}
