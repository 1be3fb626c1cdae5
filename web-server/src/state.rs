// web-server/src/state.rs
use std::sync::Arc;

use actix::{Actor, Addr, MailboxError};
use common::identity::{IdentityService, JwtIdentity};
use common::models::UserRecord;
use common::{generate_jwt_token, AppBootstrap, AuthGuard, Config, IdentityBackend};
use uuid::Uuid;

use crate::identity::RegistryIdentity;
use crate::session_registry::{InvalidateSession, RegisterSession, SessionRegistryActor};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session registry unavailable: {0}")]
    Registry(#[from] MailboxError),
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Where credentials come from and how they are revoked
pub enum Credentials {
    Registry(Addr<SessionRegistryActor>),
    Jwt { secret: String, ttl_seconds: usize },
}

impl Credentials {
    pub fn identity(&self) -> Arc<dyn IdentityService> {
        match self {
            Credentials::Registry(registry) => Arc::new(RegistryIdentity::new(registry.clone())),
            Credentials::Jwt { secret, .. } => Arc::new(JwtIdentity::new(secret.as_bytes())),
        }
    }

    /// Issue a credential for a user the backend has already verified
    pub async fn issue(&self, user: UserRecord) -> Result<String, SessionError> {
        match self {
            Credentials::Registry(registry) => {
                let (_, token) = registry.send(RegisterSession { user }).await?;
                Ok(token)
            },
            Credentials::Jwt { secret, ttl_seconds } => {
                let subject = Uuid::new_v4().to_string();
                Ok(generate_jwt_token(&subject, &user, *ttl_seconds, secret.as_bytes())?)
            }
        }
    }

    /// Revoke a credential. Returns false when no such session exists.
    pub async fn revoke(&self, token: &str) -> Result<bool, SessionError> {
        match self {
            Credentials::Registry(registry) => {
                Ok(registry.send(InvalidateSession { session_token: token.to_string() }).await?)
            },
            // Stateless tokens only go away with the cookie
            Credentials::Jwt { .. } => Ok(true),
        }
    }
}

/// Shared state of the shell server
pub struct AppState {
    pub config: Config,
    pub bootstrap: AppBootstrap,
    pub credentials: Credentials,
}

impl AppState {
    /// Build the state, starting the session registry when the config asks for it.
    /// Must run inside an actix system.
    pub fn from_config(config: Config) -> Self {
        let credentials = match config.identity.backend {
            IdentityBackend::Session => {
                let registry = SessionRegistryActor::new()
                    .with_ttl(config.session.ttl_seconds)
                    .with_cleanup_interval(config.session.cleanup_interval_seconds)
                    .start();
                Credentials::Registry(registry)
            },
            IdentityBackend::Jwt => Credentials::Jwt {
                secret: config.identity.jwt_secret.clone(),
                ttl_seconds: config.session.ttl_seconds.max(0) as usize,
            },
        };

        let guard = AuthGuard::new(credentials.identity())
            .with_timeout(config.identity.timeout());
        let bootstrap = AppBootstrap::new(guard, config.protected_routes.clone());

        tracing::info!(
            "Auth backend: {:?}, protected routes: {:?}",
            config.identity.backend,
            config.protected_routes.prefixes()
        );

        Self { config, bootstrap, credentials }
    }
}
