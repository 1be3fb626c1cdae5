// common/src/models/session.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::UserRecord;

/// Length of a session token: hex encoded SHA-256
pub const SESSION_TOKEN_LEN: usize = 64;

/// Server side session created when a user logs in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    /// Unique session identifier
    pub session_id: Uuid,
    /// Secure session token carried in the session cookie
    pub session_token: String,
    /// User record returned to the auth store on every page load
    pub user: UserRecord,
    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of last activity
    pub last_active: DateTime<Utc>,
}

impl UserSession {
    pub fn new(session_token: String, user: UserRecord) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            session_token,
            user,
            created_at: now,
            last_active: now,
        }
    }

    /// Update session activity timestamp
    pub fn update_activity(&mut self) {
        self.last_active = Utc::now();
    }

    /// Check if the session has expired based on TTL
    pub fn is_expired(&self, ttl_seconds: i64) -> bool {
        let age = Utc::now().signed_duration_since(self.last_active);
        age.num_seconds() > ttl_seconds
    }
}

/// Whether `token` has the shape of a token this shell hands out
pub fn is_well_formed_token(token: &str) -> bool {
    token.len() == SESSION_TOKEN_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Result of session operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionResult {
    Success(UserSession),
    NotFound,
    Expired,
    Invalid,
}
