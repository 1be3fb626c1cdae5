pub mod config;
pub mod utils;
pub mod models;
pub mod routes;
pub mod store;
pub mod identity;
pub mod guard;
pub mod bootstrap;

pub use self::config::*;
pub use utils::*;
pub use routes::ProtectedRouteSet;
pub use store::{AuthAction, AuthState, AuthStore};
pub use guard::{AuthFailure, AuthGuard, GuardOutcome, GuardResult, LoadContext};
pub use bootstrap::AppBootstrap;
