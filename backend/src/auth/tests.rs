use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn set_env_vars() {
    unsafe {
        env::set_var("JWT_SECRET", SECRET);
    }
}

fn sign(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_validate_jwt_success() {
    set_env_vars();
    let my_claims = Claims {
        user_id: 42,
        exp: 9999999999, // far future
        iat: Some(1),
    };

    let token = sign(&my_claims, SECRET);

    let claims = validate_jwt(&token).expect("Valid token should pass");
    assert_eq!(claims.user_id, 42);
}

#[test]
fn test_validate_jwt_expired() {
    set_env_vars();
    let my_claims = Claims {
        user_id: 42,
        exp: 1, // past
        iat: None,
    };

    let token = sign(&my_claims, SECRET);

    assert!(validate_jwt(&token).is_err());
}

#[test]
fn test_validate_jwt_invalid_signature() {
    set_env_vars();
    let my_claims = Claims {
        user_id: 42,
        exp: 9999999999,
        iat: None,
    };

    let token = sign(&my_claims, "wrongsecret");

    assert!(validate_jwt(&token).is_err());
}

#[tokio::test]
async fn test_extractor_reads_bearer_header() {
    set_env_vars();
    let token = sign(
        &Claims {
            user_id: 7,
            exp: 9999999999,
            iat: None,
        },
        SECRET,
    );

    let request = axum::http::Request::builder()
        .header("Authorization", format!("Bearer {token}"))
        .body(())
        .unwrap();
    let (mut parts, _) = request.into_parts();

    let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(user.user_id, 7);
}

#[tokio::test]
async fn test_extractor_rejects_missing_header() {
    let request = axum::http::Request::builder().body(()).unwrap();
    let (mut parts, _) = request.into_parts();

    assert!(AuthUser::from_request_parts(&mut parts, &()).await.is_err());
}

#[test]
fn test_issued_token_validates_for_a_day() {
    set_env_vars();
    let issued_at = Utc::now();

    let token = issue_jwt(SECRET, 3, issued_at).unwrap();
    let claims = validate_jwt(&token).expect("Issued token should pass");

    assert_eq!(claims.user_id, 3);
    assert_eq!(claims.iat, Some(issued_at.timestamp() as usize));
    assert_eq!(claims.exp - issued_at.timestamp() as usize, 24 * 60 * 60);
}
