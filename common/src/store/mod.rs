// common/src/store/mod.rs
pub mod actions;
pub mod auth;

pub use actions::AuthAction;
pub use auth::AuthState;

use tokio::sync::watch;

/// Holds the current auth state and applies dispatched actions.
///
/// `dispatch` takes `&mut self`, so there is exactly one writer; readers use
/// [`AuthStore::snapshot`] or a receiver from [`AuthStore::subscribe`].
#[derive(Debug)]
pub struct AuthStore {
    state: watch::Sender<AuthState>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        Self::with_state(AuthState::default())
    }

    pub fn with_state(state: AuthState) -> Self {
        let (state, _) = watch::channel(state);
        Self { state }
    }

    pub fn dispatch(&mut self, action: AuthAction) {
        let next = self.state.borrow().reduce(&action);
        tracing::debug!("Dispatched {}", action.kind());
        self.state.send_replace(next);
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}
