pub mod session;

/// Opaque user data as handed out by the identity service.
pub type UserRecord = serde_json::Map<String, serde_json::Value>;
