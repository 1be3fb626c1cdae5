// web-server/src/middleware/page_guard.rs
use std::fmt;
use std::rc::Rc;
use actix_web::{
    cookie::Cookie,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{header, Method, StatusCode},
    web, Error, HttpMessage, HttpResponse, ResponseError,
};
use common::guard::{LoadContext, RequestContext};
use common::AuthStore;
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::cookies::PendingCredential;
use crate::pages::PageProps;
use crate::state::AppState;

// Anonymous request for a protected page while a login page is configured
#[derive(Debug)]
struct LoginRequired {
    location: String,
    clear_cookie: Option<Cookie<'static>>,
}

impl fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Login required, redirecting to {}", self.location)
    }
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::Found();
        response.append_header((header::LOCATION, self.location.clone()));
        if let Some(cookie) = &self.clear_cookie {
            response.cookie(cookie.clone());
        }
        response.finish()
    }
}

/// Runs the app bootstrap for every full page load.
///
/// The resolved [`PageProps`] are stored in the request extensions for the
/// page handler; stale credentials are cleared on the way out.
#[derive(Clone)]
pub struct PageGuard {
    state: web::Data<AppState>,
}

impl PageGuard {
    pub fn new(state: web::Data<AppState>) -> Self {
        Self { state }
    }
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn is_page_load(req: &ServiceRequest) -> bool {
    *req.method() == Method::GET && !is_api_path(req.path())
}

impl<S, B> Transform<S, ServiceRequest> for PageGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = PageGuardMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PageGuardMiddleware {
            service: Rc::new(service),
            state: self.state.clone(),
        }))
    }
}

pub struct PageGuardMiddleware<S> {
    service: Rc<S>,
    state: web::Data<AppState>,
}

impl<S, B> Service<ServiceRequest> for PageGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !is_page_load(&req) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                fut.await
            });
        }

        let service = Rc::clone(&self.service);
        let state = self.state.clone();

        Box::pin(async move {
            let session = &state.config.session;
            let path = req.path().to_string();
            let credential = req.cookie(&session.cookie_name)
                .map(|cookie| cookie.value().to_string());

            let mut pending = PendingCredential::default();
            let mut store = AuthStore::new();
            let ctx = LoadContext::fresh_load(RequestContext::new(credential), &mut pending, path.as_str());
            let report = state.bootstrap.initialize(ctx, &mut store).await;
            let auth = store.snapshot();
            let clear_cookie = pending.into_cookie(session);

            if report.is_protected && !auth.is_authenticated {
                if let Some(login_path) = state.config.login_path.as_deref() {
                    if path != login_path {
                        tracing::info!("Anonymous request for {}, redirecting to {}", path, login_path);
                        return Err(LoginRequired {
                            location: login_path.to_string(),
                            clear_cookie,
                        }.into());
                    }
                }
            }

            req.extensions_mut().insert(PageProps::fresh_load(path, report.is_protected, auth));

            let mut res = service.call(req).await?;
            if let Some(cookie) = clear_cookie {
                res.response_mut().add_cookie(&cookie)?;
            }
            Ok(res)
        })
    }
}
