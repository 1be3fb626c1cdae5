// web-server/src/session_registry.rs
use actix::{Actor, Context, Handler, Message, AsyncContext, MessageResult};
use chrono::Utc;
use common::models::session::{is_well_formed_token, SessionResult, UserSession};
use common::models::UserRecord;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use crate::utils::token::create_session_token;

// Default session TTL in seconds (24 hours)
const DEFAULT_SESSION_TTL: i64 = 86400;

/// Actor message: Create a session for a logged in user
#[derive(Message)]
#[rtype(result = "(Uuid, String)")]
pub struct RegisterSession {
    pub user: UserRecord,
}

/// Actor message: Look up a session by token
#[derive(Message)]
#[rtype(result = "SessionResult")]
pub struct ResolveSession {
    pub session_token: String,
}

/// Actor message: Invalidate/remove a session
#[derive(Message)]
#[rtype(result = "bool")]
pub struct InvalidateSession {
    pub session_token: String,
}

/// Session metrics
#[derive(Debug, Clone, Default)]
pub struct SessionMetrics {
    pub total_sessions: usize,
    pub expired_count: usize,
    pub avg_session_age_seconds: f64,
}

/// Owns every live user session, keyed by session token
pub struct SessionRegistryActor {
    sessions: Arc<DashMap<String, UserSession>>,
    // Session TTL in seconds
    session_ttl: i64,
    // Cleanup interval in seconds
    cleanup_interval: u64,
    metrics: SessionMetrics,
}

impl Default for SessionRegistryActor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistryActor {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            session_ttl: DEFAULT_SESSION_TTL,
            cleanup_interval: 3600,
            metrics: SessionMetrics::default(),
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: i64) -> Self {
        self.session_ttl = ttl_seconds;
        self
    }

    pub fn with_cleanup_interval(mut self, interval_seconds: u64) -> Self {
        self.cleanup_interval = interval_seconds;
        self
    }

    fn update_metrics(&mut self) {
        let now = Utc::now();
        let total = self.sessions.len();
        let age_sum: f64 = self.sessions.iter()
            .map(|entry| now.signed_duration_since(entry.value().created_at).num_seconds() as f64)
            .sum();

        self.metrics.total_sessions = total;
        self.metrics.avg_session_age_seconds = if total > 0 { age_sum / total as f64 } else { 0.0 };
    }

    /// Remove expired sessions and update metrics
    fn cleanup_sessions(&mut self) -> usize {
        let expired_tokens: Vec<String> = self.sessions.iter()
            .filter(|entry| entry.value().is_expired(self.session_ttl))
            .map(|entry| entry.key().clone())
            .collect();

        let mut expired_count = 0;
        for token in expired_tokens {
            if self.sessions.remove(&token).is_some() {
                expired_count += 1;
            }
        }

        self.metrics.expired_count += expired_count;
        self.update_metrics();

        expired_count
    }
}

impl Actor for SessionRegistryActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("SessionRegistryActor started with TTL: {}s", self.session_ttl);

        ctx.run_interval(Duration::from_secs(self.cleanup_interval), |act, _ctx| {
            let expired_count = act.cleanup_sessions();
            if expired_count > 0 {
                tracing::info!("Cleaned up {} expired sessions", expired_count);
            }
            tracing::debug!(
                "Session metrics: {} live, {} expired in total, average age {:.0}s",
                act.metrics.total_sessions,
                act.metrics.expired_count,
                act.metrics.avg_session_age_seconds
            );
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            "SessionRegistryActor stopped. Final metrics: {} live sessions, {} expired during lifetime",
            self.sessions.len(),
            self.metrics.expired_count
        );
    }
}

impl Handler<RegisterSession> for SessionRegistryActor {
    type Result = MessageResult<RegisterSession>;

    fn handle(&mut self, msg: RegisterSession, _ctx: &mut Self::Context) -> Self::Result {
        let session_token = create_session_token();
        let session = UserSession::new(session_token.clone(), msg.user);
        let session_id = session.session_id;

        self.sessions.insert(session_token.clone(), session);
        self.metrics.total_sessions = self.sessions.len();

        tracing::info!("Registered session {}", session_id);

        MessageResult((session_id, session_token))
    }
}

impl Handler<ResolveSession> for SessionRegistryActor {
    type Result = MessageResult<ResolveSession>;

    fn handle(&mut self, msg: ResolveSession, _ctx: &mut Self::Context) -> Self::Result {
        if !is_well_formed_token(&msg.session_token) {
            tracing::debug!("Malformed session token");
            return MessageResult(SessionResult::Invalid);
        }

        let result = match self.sessions.get_mut(&msg.session_token) {
            Some(mut entry) => {
                let session = entry.value_mut();
                if session.is_expired(self.session_ttl) {
                    tracing::debug!("Session expired: {}", session.session_id);
                    SessionResult::Expired
                } else {
                    session.update_activity();
                    tracing::debug!("Resolved session: {}", session.session_id);
                    SessionResult::Success(session.clone())
                }
            },
            None => {
                tracing::debug!("Session not found");
                SessionResult::NotFound
            }
        };

        // Expired sessions are dropped right away rather than at the next cleanup
        if matches!(result, SessionResult::Expired) && self.sessions.remove(&msg.session_token).is_some() {
            self.metrics.expired_count += 1;
        }

        MessageResult(result)
    }
}

impl Handler<InvalidateSession> for SessionRegistryActor {
    type Result = MessageResult<InvalidateSession>;

    fn handle(&mut self, msg: InvalidateSession, _ctx: &mut Self::Context) -> Self::Result {
        let result = match self.sessions.remove(&msg.session_token) {
            Some((_, session)) => {
                self.metrics.total_sessions = self.sessions.len();
                tracing::info!("Invalidated session {}", session.session_id);
                true
            },
            None => false,
        };

        MessageResult(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ada() -> UserRecord {
        json!({"id": 1, "name": "Ada"}).as_object().cloned().unwrap()
    }

    #[actix_web::test]
    async fn test_register_then_resolve() {
        let registry = SessionRegistryActor::new().start();

        let (session_id, token) = registry.send(RegisterSession { user: ada() }).await.unwrap();
        match registry.send(ResolveSession { session_token: token }).await.unwrap() {
            SessionResult::Success(session) => {
                assert_eq!(session.session_id, session_id);
                assert_eq!(session.user, ada());
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[actix_web::test]
    async fn test_unknown_and_malformed_tokens() {
        let registry = SessionRegistryActor::new().start();

        let unknown = registry.send(ResolveSession { session_token: "ab".repeat(32) }).await.unwrap();
        assert!(matches!(unknown, SessionResult::NotFound));

        let malformed = registry.send(ResolveSession { session_token: "nope".into() }).await.unwrap();
        assert!(matches!(malformed, SessionResult::Invalid));
    }

    #[actix_web::test]
    async fn test_expired_session_is_dropped() {
        let registry = SessionRegistryActor::new().with_ttl(-1).start();

        let (_, token) = registry.send(RegisterSession { user: ada() }).await.unwrap();
        let first = registry.send(ResolveSession { session_token: token.clone() }).await.unwrap();
        assert!(matches!(first, SessionResult::Expired));

        let second = registry.send(ResolveSession { session_token: token }).await.unwrap();
        assert!(matches!(second, SessionResult::NotFound));
    }

    #[actix_web::test]
    async fn test_invalidate() {
        let registry = SessionRegistryActor::new().start();

        let (_, token) = registry.send(RegisterSession { user: ada() }).await.unwrap();
        assert!(registry.send(InvalidateSession { session_token: token.clone() }).await.unwrap());
        assert!(!registry.send(InvalidateSession { session_token: token.clone() }).await.unwrap());

        let result = registry.send(ResolveSession { session_token: token }).await.unwrap();
        assert!(matches!(result, SessionResult::NotFound));
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let mut registry = SessionRegistryActor::new().with_ttl(60);
        let fresh = UserSession::new("aa".repeat(32), ada());
        let mut stale = UserSession::new("bb".repeat(32), ada());
        stale.last_active = Utc::now() - chrono::Duration::seconds(120);
        registry.sessions.insert(fresh.session_token.clone(), fresh);
        registry.sessions.insert(stale.session_token.clone(), stale);

        assert_eq!(registry.cleanup_sessions(), 1);
        assert_eq!(registry.metrics.total_sessions, 1);
        assert_eq!(registry.metrics.expired_count, 1);
        assert!(registry.sessions.contains_key(&"aa".repeat(32)));
    }
}
