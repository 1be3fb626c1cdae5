// web-server/src/pages.rs
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use common::AuthState;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Initial props handed to the page layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProps {
    pub path: String,
    pub is_protected: bool,
    pub show_footer: bool,
    /// Hydrated auth state; `None` when the auth state on the client stays as it is
    pub auth: Option<AuthState>,
}

impl PageProps {
    pub fn fresh_load(path: String, is_protected: bool, auth: AuthState) -> Self {
        Self { path, is_protected, show_footer: !is_protected, auth: Some(auth) }
    }

    pub fn client_navigation(path: String, is_protected: bool) -> Self {
        Self { path, is_protected, show_footer: !is_protected, auth: None }
    }
}

/// Catch-all page handler. The page guard has already resolved the props.
pub async fn page(req: HttpRequest) -> HttpResponse {
    match req.extensions().get::<PageProps>() {
        Some(props) => HttpResponse::Ok().json(props),
        // Not a page load (API miss or non-GET request)
        None => HttpResponse::NotFound().json(json!({
            "error": "Not found"
        })),
    }
}
