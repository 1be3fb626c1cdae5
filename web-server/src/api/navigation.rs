// web-server/src/api/navigation.rs
use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::pages::PageProps;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub path: String,
}

// Client side route change: only route dependent props are recomputed,
// the auth state already on the client stays as it is.
#[get("/navigate")]
pub async fn navigate(
    query: web::Query<NavigateQuery>,
    state: web::Data<AppState>,
) -> impl Responder {
    let path = query.into_inner().path;
    let is_protected = state.bootstrap.is_protected(&path);

    tracing::debug!("Client navigation to {} (protected: {})", path, is_protected);
    HttpResponse::Ok().json(PageProps::client_navigation(path, is_protected))
}
