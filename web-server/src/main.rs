// Web Server - main.rs
// web-server/src/main.rs

/// App factory shared by `main` and the HTTP tests
macro_rules! shell_app {
    ($state:expr) => {
        actix_web::App::new()
            .app_data($state.clone())
            .wrap($crate::middleware::page_guard::PageGuard::new($state.clone()))
            .configure($crate::api::configure)
            .default_service(actix_web::web::route().to($crate::pages::page))
    };
}

mod api;
mod cookies;
mod identity;
mod middleware;
mod pages;
mod session_registry;
mod state;
mod utils;

use actix_web::{web, HttpServer};
use common::{setup_tracing, Config};
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration first, it carries the log level
    let config = Config::from_env();

    setup_tracing(&config.log_level);

    // Save address before moving config into the app state
    let server_addr = config.web_server_addr.clone();

    let state = web::Data::new(AppState::from_config(config));

    tracing::info!("Starting Web Server on {}", server_addr);

    HttpServer::new(move || shell_app!(state))
        .bind(&server_addr)?
        .run()
        .await
}
