// web-server/src/identity.rs
use actix::Addr;
use async_trait::async_trait;
use common::identity::{IdentityError, IdentityLookup, IdentityService};
use common::models::session::SessionResult;

use crate::session_registry::{ResolveSession, SessionRegistryActor};

/// Identity service answering from the in-process session registry
pub struct RegistryIdentity {
    registry: Addr<SessionRegistryActor>,
}

impl RegistryIdentity {
    pub fn new(registry: Addr<SessionRegistryActor>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl IdentityService for RegistryIdentity {
    async fn resolve(&self, credential: &str) -> Result<IdentityLookup, IdentityError> {
        let result = self.registry
            .send(ResolveSession { session_token: credential.to_string() })
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(match result {
            SessionResult::Success(session) => IdentityLookup::User(session.user),
            SessionResult::NotFound => IdentityLookup::Absent,
            SessionResult::Expired | SessionResult::Invalid => IdentityLookup::Invalid,
        })
    }
}
