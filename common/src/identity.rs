// common/src/identity.rs
use async_trait::async_trait;

use crate::models::UserRecord;
use crate::utils::validate_jwt_token;

/// What the identity service knows about a presented credential
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityLookup {
    User(UserRecord),
    /// No session exists for the credential
    Absent,
    /// The credential was rejected: expired, tampered or malformed
    Invalid,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a credential to the user it belongs to.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn resolve(&self, credential: &str) -> Result<IdentityLookup, IdentityError>;
}

/// Stateless identity backed by HS256 tokens issued with `generate_jwt_token`
pub struct JwtIdentity {
    secret: Vec<u8>,
}

impl JwtIdentity {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }
}

#[async_trait]
impl IdentityService for JwtIdentity {
    async fn resolve(&self, credential: &str) -> Result<IdentityLookup, IdentityError> {
        match validate_jwt_token(credential, &self.secret) {
            Ok(claims) => Ok(IdentityLookup::User(claims.user)),
            Err(e) => {
                tracing::debug!("Rejected token: {}", e);
                Ok(IdentityLookup::Invalid)
            }
        }
    }
}
