// common/src/guard.rs
//! Auth guard run once per full page load.
//!
//! The guard only classifies. It reports what it found as a [`GuardResult`]
//! together with the credential effects the caller has to apply to the
//! response; it never writes to the response or redirects on its own.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::identity::{IdentityLookup, IdentityService};
use crate::models::UserRecord;

const DEFAULT_GUARD_TIMEOUT: Duration = Duration::from_secs(3);

/// Incoming side of a full page load
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub credential: Option<String>,
}

impl RequestContext {
    pub fn new(credential: Option<String>) -> Self {
        Self { credential }
    }

    /// The credential, ignoring empty values left behind by cleared cookies
    fn credential(&self) -> Option<&str> {
        self.credential.as_deref().filter(|c| !c.is_empty())
    }
}

/// Outgoing side of a full page load
pub trait ResponseContext {
    fn clear_credential(&mut self);
}

/// How the current page was reached
pub enum LoadContext<'a> {
    /// Initial document fetch with a request/response pair
    FreshLoad {
        request: RequestContext,
        response: &'a mut dyn ResponseContext,
        path: String,
    },
    /// In-app route change; there is nothing to authenticate
    ClientNavigation { path: String },
}

impl<'a> LoadContext<'a> {
    pub fn fresh_load(
        request: RequestContext,
        response: &'a mut dyn ResponseContext,
        path: impl Into<String>,
    ) -> Self {
        LoadContext::FreshLoad { request, response, path: path.into() }
    }

    pub fn client_navigation(path: impl Into<String>) -> Self {
        LoadContext::ClientNavigation { path: path.into() }
    }

    pub fn path(&self) -> &str {
        match self {
            LoadContext::FreshLoad { path, .. } | LoadContext::ClientNavigation { path } => path,
        }
    }
}

/// Why no user could be determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailure {
    /// No credential supplied; the normal case for anonymous visitors
    NoSession,
    /// Credential rejected by the identity service
    InvalidSession,
    /// The identity service failed or timed out; the credential may still be good
    ServiceError,
}

impl AuthFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailure::NoSession => "no_session",
            AuthFailure::InvalidSession => "invalid_session",
            AuthFailure::ServiceError => "service_error",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardResult {
    Authenticated(UserRecord),
    Unauthenticated(AuthFailure),
}

/// Instruction for the response side of the load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEffect {
    Clear,
}

impl CredentialEffect {
    pub fn apply(self, response: &mut dyn ResponseContext) {
        match self {
            CredentialEffect::Clear => response.clear_credential(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuardDecision {
    pub result: GuardResult,
    pub effects: Vec<CredentialEffect>,
}

impl GuardDecision {
    fn authenticated(user: UserRecord) -> Self {
        Self { result: GuardResult::Authenticated(user), effects: Vec::new() }
    }

    fn unauthenticated(reason: AuthFailure) -> Self {
        let effects = match reason {
            AuthFailure::InvalidSession => vec![CredentialEffect::Clear],
            AuthFailure::NoSession | AuthFailure::ServiceError => Vec::new(),
        };
        Self { result: GuardResult::Unauthenticated(reason), effects }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// Client navigation: keep whatever auth state already exists
    Unchanged,
    Decided(GuardDecision),
}

pub struct AuthGuard {
    identity: Arc<dyn IdentityService>,
    timeout: Duration,
}

impl AuthGuard {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self { identity, timeout: DEFAULT_GUARD_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Determine the user behind a page load. Never fails; every outcome is data.
    pub async fn authenticate_user(&self, ctx: &LoadContext<'_>) -> GuardOutcome {
        let (request, path) = match ctx {
            LoadContext::FreshLoad { request, path, .. } => (request, path),
            LoadContext::ClientNavigation { path } => {
                tracing::trace!("Client navigation to {}, skipping auth guard", path);
                return GuardOutcome::Unchanged;
            }
        };

        let Some(credential) = request.credential() else {
            tracing::debug!("No credential on page load of {}", path);
            return GuardOutcome::Decided(GuardDecision::unauthenticated(AuthFailure::NoSession));
        };

        let decision = match tokio::time::timeout(self.timeout, self.identity.resolve(credential)).await {
            Ok(Ok(IdentityLookup::User(user))) => {
                tracing::debug!("Authenticated page load of {}", path);
                GuardDecision::authenticated(user)
            },
            Ok(Ok(IdentityLookup::Absent)) | Ok(Ok(IdentityLookup::Invalid)) => {
                tracing::info!("Rejected credential on page load of {}, clearing it", path);
                GuardDecision::unauthenticated(AuthFailure::InvalidSession)
            },
            Ok(Err(e)) => {
                tracing::error!("Identity lookup failed for {}: {}", path, e);
                GuardDecision::unauthenticated(AuthFailure::ServiceError)
            },
            Err(_) => {
                tracing::error!("Identity lookup for {} timed out after {:?}", path, self.timeout);
                GuardDecision::unauthenticated(AuthFailure::ServiceError)
            }
        };

        GuardOutcome::Decided(decision)
    }
}
