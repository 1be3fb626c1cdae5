// common/src/store/actions.rs
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::UserRecord;

/// Actions understood by the auth reducer.
///
/// Serialized as `{"kind": "USER_LOADED", "payload": {...}}`. Any kind not
/// listed here deserializes to [`AuthAction::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    try_from = "RawAction"
)]
pub enum AuthAction {
    AuthSuccess,
    UserLoaded(UserRecord),
    UserLoadedError(String),
    LoginError(String),
    RegisterError(String),
    Unknown,
}

/// Wire form before the kind is looked at
#[derive(Deserialize)]
struct RawAction {
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl TryFrom<RawAction> for AuthAction {
    type Error = serde_json::Error;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        let payload = raw.payload;
        let action = match raw.kind.as_str() {
            "AUTH_SUCCESS" => AuthAction::AuthSuccess,
            "USER_LOADED" => AuthAction::UserLoaded(serde_json::from_value(payload)?),
            "USER_LOADED_ERROR" => AuthAction::UserLoadedError(message(payload)?),
            "LOGIN_ERROR" => AuthAction::LoginError(message(payload)?),
            "REGISTER_ERROR" => AuthAction::RegisterError(message(payload)?),
            // Kinds owned by other reducers, whatever they carry
            _ => AuthAction::Unknown,
        };
        Ok(action)
    }
}

fn message(payload: Value) -> Result<String, serde_json::Error> {
    match payload {
        Value::String(message) => Ok(message),
        other => Err(serde_json::Error::custom(format!("expected a message string, got {}", other))),
    }
}

impl AuthAction {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthAction::AuthSuccess => "AUTH_SUCCESS",
            AuthAction::UserLoaded(_) => "USER_LOADED",
            AuthAction::UserLoadedError(_) => "USER_LOADED_ERROR",
            AuthAction::LoginError(_) => "LOGIN_ERROR",
            AuthAction::RegisterError(_) => "REGISTER_ERROR",
            AuthAction::Unknown => "UNKNOWN",
        }
    }
}
