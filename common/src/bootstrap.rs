// common/src/bootstrap.rs
use crate::guard::{AuthGuard, GuardOutcome, GuardResult, LoadContext};
use crate::routes::ProtectedRouteSet;
use crate::store::{AuthAction, AuthStore};

/// What one bootstrap pass did
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapReport {
    pub is_protected: bool,
    /// The single action dispatched, `None` on client navigation
    pub dispatched: Option<AuthAction>,
}

/// Wires the auth guard into the auth store once per full page load.
pub struct AppBootstrap {
    guard: AuthGuard,
    protected_routes: ProtectedRouteSet,
}

impl AppBootstrap {
    pub fn new(guard: AuthGuard, protected_routes: ProtectedRouteSet) -> Self {
        Self { guard, protected_routes }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_routes.is_protected(path)
    }

    /// Footer and other route dependent chrome only render outside protected routes
    pub fn show_footer(&self, path: &str) -> bool {
        !self.is_protected(path)
    }

    pub async fn initialize(&self, mut ctx: LoadContext<'_>, store: &mut AuthStore) -> BootstrapReport {
        let is_protected = self.is_protected(ctx.path());

        let decision = match self.guard.authenticate_user(&ctx).await {
            GuardOutcome::Unchanged => {
                return BootstrapReport { is_protected, dispatched: None };
            },
            GuardOutcome::Decided(decision) => decision,
        };

        if let LoadContext::FreshLoad { response, .. } = &mut ctx {
            for effect in &decision.effects {
                effect.apply(&mut **response);
            }
        }

        let action = match decision.result {
            GuardResult::Authenticated(user) => AuthAction::UserLoaded(user),
            GuardResult::Unauthenticated(reason) => AuthAction::UserLoadedError(reason.to_string()),
        };
        store.dispatch(action.clone());

        BootstrapReport { is_protected, dispatched: Some(action) }
    }
}
