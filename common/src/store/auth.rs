// common/src/store/auth.rs
use serde::{Deserialize, Serialize};

use super::actions::AuthAction;
use crate::models::UserRecord;

/// Authentication data the UI layer reads: current user, auth status and errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    /// True until the first auth result has been dispatched
    pub loading: bool,
    pub user: UserRecord,
    pub login_error: String,
    pub register_error: String,
    pub auth_error: String,
    pub user_loaded_error: String,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            loading: true,
            user: UserRecord::new(),
            login_error: String::new(),
            register_error: String::new(),
            auth_error: String::new(),
            user_loaded_error: String::new(),
        }
    }
}

impl AuthState {
    /// Compute the state that follows `action`. `self` is left untouched.
    pub fn reduce(&self, action: &AuthAction) -> AuthState {
        match action {
            AuthAction::AuthSuccess => AuthState {
                loading: false,
                is_authenticated: true,
                login_error: String::new(),
                register_error: String::new(),
                ..self.clone()
            },
            AuthAction::UserLoaded(user) => AuthState {
                loading: false,
                is_authenticated: true,
                login_error: String::new(),
                register_error: String::new(),
                user: user.clone(),
                ..self.clone()
            },
            AuthAction::UserLoadedError(reason) => AuthState {
                loading: false,
                is_authenticated: false,
                user_loaded_error: reason.clone(),
                ..self.clone()
            },
            AuthAction::LoginError(message) => AuthState {
                loading: false,
                is_authenticated: false,
                user: UserRecord::new(),
                login_error: message.clone(),
                ..self.clone()
            },
            AuthAction::RegisterError(message) => AuthState {
                loading: false,
                is_authenticated: false,
                user: UserRecord::new(),
                register_error: message.clone(),
                ..self.clone()
            },
            AuthAction::Unknown => self.clone(),
        }
    }
}
