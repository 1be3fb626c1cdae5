// Common Crate - utils.rs
// common/src/utils.rs
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use jsonwebtoken::{encode, decode, Header, Algorithm, Validation, EncodingKey, DecodingKey};
use serde::{Serialize, Deserialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::UserRecord;

/// Setup tracing for consistent logging across the shell
pub fn setup_tracing(level: &str) {
    let level = Level::from_str(level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,       // session subject
    pub user: UserRecord,  // user record handed to the auth store
    pub exp: usize,        // expiration time
    pub iat: usize,        // issued at time
}

pub fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}

// Generate a JWT carrying the user record, valid for `ttl_seconds`
pub fn generate_jwt_token(
    subject: &str,
    user: &UserRecord,
    ttl_seconds: usize,
    secret: &[u8],
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = unix_now();

    let claims = JwtClaims {
        sub: subject.to_string(),
        user: user.clone(),
        iat: now,
        exp: now + ttl_seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret)
    )
}

// Validate JWT signature and expiry, returning its claims
pub fn validate_jwt_token(token: &str, secret: &[u8]) -> Result<JwtClaims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation
    )?;

    Ok(token_data.claims)
}
