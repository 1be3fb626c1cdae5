// web-server/src/api/sessions.rs
use actix_web::{get, post, delete, http::header, web, HttpRequest, HttpResponse, Responder};
use common::guard::{LoadContext, RequestContext};
use common::{AuthAction, AuthStore};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cookies::{clear_cookie, session_cookie, PendingCredential};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// User record as returned by the backend after verifying the login
    pub user: Option<Value>,
}

#[get("/")]
pub async fn api_index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "App Shell API",
        "version": "0.1.0"
    }))
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Whether the caller presented the configured issuer secret as a bearer token
fn is_trusted_issuer(req: &HttpRequest, issuer_secret: &str) -> bool {
    if issuer_secret.is_empty() {
        return false;
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| constant_time_compare(token.as_bytes(), issuer_secret.as_bytes()))
        .unwrap_or(false)
}

// Log a user in: issue a credential and hand back the resulting auth state.
// Only the login backend, holding the issuer secret, may do this.
#[post("/session")]
pub async fn create_session(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let mut store = AuthStore::new();

    if !is_trusted_issuer(&req, &state.config.identity.issuer_secret) {
        tracing::warn!("Session creation attempt without a valid issuer secret");
        store.dispatch(AuthAction::LoginError("untrusted issuer".to_string()));
        return HttpResponse::Unauthorized().json(store.snapshot());
    }

    let user = match body.into_inner().user {
        Some(Value::Object(user)) if !user.is_empty() => user,
        _ => {
            store.dispatch(AuthAction::LoginError("missing user record".to_string()));
            return HttpResponse::BadRequest().json(store.snapshot());
        }
    };

    match state.credentials.issue(user.clone()).await {
        Ok(token) => {
            store.dispatch(AuthAction::AuthSuccess);
            store.dispatch(AuthAction::UserLoaded(user));

            tracing::info!("Created new user session");

            HttpResponse::Ok()
                .cookie(session_cookie(&state.config.session, token))
                .json(store.snapshot())
        },
        Err(e) => {
            tracing::error!("Error creating session: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }))
        }
    }
}

// Log out: revoke the session and drop the cookie
#[delete("/session")]
pub async fn invalidate_session(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> impl Responder {
    let Some(cookie) = req.cookie(&state.config.session.cookie_name) else {
        return HttpResponse::BadRequest().json(json!({
            "error": "No session cookie found"
        }));
    };

    match state.credentials.revoke(cookie.value()).await {
        Ok(true) => {
            tracing::info!("Session invalidated successfully");
            HttpResponse::Ok()
                .cookie(clear_cookie(&state.config.session))
                .json(json!({
                    "status": "success",
                    "message": "Session invalidated"
                }))
        },
        Ok(false) => {
            tracing::info!("Attempt to invalidate non-existent session");
            HttpResponse::NotFound()
                .cookie(clear_cookie(&state.config.session))
                .json(json!({
                    "error": "Session not found"
                }))
        },
        Err(e) => {
            tracing::error!("Error invalidating session: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }))
        }
    }
}

// Current user behind the session cookie, resolved the same way a page load does
#[get("/user")]
pub async fn current_user(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> impl Responder {
    let session = &state.config.session;
    let credential = req.cookie(&session.cookie_name)
        .map(|cookie| cookie.value().to_string());

    let mut pending = PendingCredential::default();
    let mut store = AuthStore::new();
    let ctx = LoadContext::fresh_load(RequestContext::new(credential), &mut pending, req.path());
    state.bootstrap.initialize(ctx, &mut store).await;
    let auth = store.snapshot();

    let mut response = if auth.is_authenticated {
        HttpResponse::Ok()
    } else {
        HttpResponse::Unauthorized()
    };
    if let Some(cookie) = pending.into_cookie(session) {
        response.cookie(cookie);
    }

    if auth.is_authenticated {
        response.json(json!({ "user": auth.user }))
    } else {
        response.json(json!({ "error": auth.user_loaded_error }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{cookie::Cookie, dev::ServiceResponse, http::{header, StatusCode}, test, web};
    use common::{Config, IdentityBackend};
    use serde_json::{json, Value};

    use crate::state::AppState;

    fn config(backend: IdentityBackend) -> Config {
        let mut config = Config::default();
        config.identity.backend = backend;
        config
    }

    fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
        resp.response().cookies().next().expect("session cookie").into_owned()
    }

    // Login as the backend sends it, authorised with the issuer secret
    fn login(state: &AppState, user: Value) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/session")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", state.config.identity.issuer_secret)))
            .set_json(json!({ "user": user }))
    }

    #[actix_web::test]
    async fn test_login_sets_cookie_and_returns_state() {
        let state = web::Data::new(AppState::from_config(config(IdentityBackend::Session)));
        let app = test::init_service(shell_app!(state)).await;

        let req = login(&state, json!({"id": 1, "name": "Ada"})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = session_cookie(&resp);
        assert_eq!(cookie.name(), "shell_session");
        assert_eq!(cookie.value().len(), 64);
        assert_eq!(cookie.http_only(), Some(true));

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["isAuthenticated"], true);
        assert_eq!(body["loading"], false);
        assert_eq!(body["user"]["name"], "Ada");
        assert_eq!(body["loginError"], "");
    }

    #[actix_web::test]
    async fn test_login_without_user_is_login_error() {
        let state = web::Data::new(AppState::from_config(config(IdentityBackend::Jwt)));
        let app = test::init_service(shell_app!(state)).await;

        let req = login(&state, json!({})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["isAuthenticated"], false);
        assert_eq!(body["user"], json!({}));
        assert_eq!(body["loginError"], "missing user record");
    }

    #[actix_web::test]
    async fn test_current_user_lifecycle() {
        let state = web::Data::new(AppState::from_config(config(IdentityBackend::Session)));
        let app = test::init_service(shell_app!(state)).await;

        // Anonymous
        let req = test::TestRequest::get().uri("/api/user").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "no_session");

        // Logged in
        let req = login(&state, json!({"id": 2, "name": "Grace"})).to_request();
        let cookie = session_cookie(&test::call_service(&app, req).await);

        let req = test::TestRequest::get().uri("/api/user").cookie(cookie.clone()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"], json!({"id": 2, "name": "Grace"}));

        // Logged out
        let req = test::TestRequest::delete().uri("/api/session").cookie(cookie.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(session_cookie(&resp).value(), "");

        // The old cookie is now rejected and cleared
        let req = test::TestRequest::get().uri("/api/user").cookie(cookie.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(session_cookie(&resp).value(), "");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_session");

        let req = test::TestRequest::delete().uri("/api/session").cookie(cookie).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_logout_without_cookie() {
        let state = web::Data::new(AppState::from_config(config(IdentityBackend::Jwt)));
        let app = test::init_service(shell_app!(state)).await;

        let req = test::TestRequest::delete().uri("/api/session").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_jwt_backend_current_user() {
        let state = web::Data::new(AppState::from_config(config(IdentityBackend::Jwt)));
        let app = test::init_service(shell_app!(state)).await;

        let req = login(&state, json!({"id": 3})).to_request();
        let cookie = session_cookie(&test::call_service(&app, req).await);

        let req = test::TestRequest::get().uri("/api/user").cookie(cookie).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["id"], 3);

        let tampered = Cookie::new("shell_session", "eyJhbGciOiJIUzI1NiJ9.e30.bad");
        let req = test::TestRequest::get().uri("/api/user").cookie(tampered).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_session");
    }

    #[actix_web::test]
    async fn test_login_requires_issuer_secret() {
        let state = web::Data::new(AppState::from_config(config(IdentityBackend::Jwt)));
        let app = test::init_service(shell_app!(state)).await;
        let admin = json!({"user": {"id": 1, "role": "admin"}});

        let anonymous = test::TestRequest::post().uri("/api/session").set_json(&admin).to_request();
        let wrong = test::TestRequest::post()
            .uri("/api/session")
            .insert_header((header::AUTHORIZATION, "Bearer guessed"))
            .set_json(&admin)
            .to_request();

        for req in [anonymous, wrong] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            assert!(resp.headers().get(header::SET_COOKIE).is_none());
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["isAuthenticated"], false);
            assert_eq!(body["loginError"], "untrusted issuer");
        }

        // Nothing was issued, so the protected page stays anonymous
        let req = test::TestRequest::get().uri("/dashboard").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["auth"]["isAuthenticated"], false);
    }

    #[actix_web::test]
    async fn test_empty_issuer_secret_disables_login() {
        let mut config = config(IdentityBackend::Jwt);
        config.identity.issuer_secret = String::new();
        let state = web::Data::new(AppState::from_config(config));
        let app = test::init_service(shell_app!(state)).await;

        let req = test::TestRequest::post()
            .uri("/api/session")
            .insert_header((header::AUTHORIZATION, "Bearer anything"))
            .set_json(json!({"user": {"id": 1}}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
