// web-server/src/cookies.rs
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use common::guard::ResponseContext;
use common::SessionConfig;

/// Cookie carrying a freshly issued credential
pub fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), token)
        .path("/")
        .secure(config.secure_cookie)
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(config.ttl_seconds))
        .finish()
}

/// Empty, already expired cookie that makes the browser drop the credential
pub fn clear_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .finish()
}

/// Records credential changes the auth guard asked for while a load is handled
#[derive(Debug, Default)]
pub struct PendingCredential {
    cleared: bool,
}

impl PendingCredential {
    /// The cookie that has to go out with the response, if any
    pub fn into_cookie(self, config: &SessionConfig) -> Option<Cookie<'static>> {
        self.cleared.then(|| clear_cookie(config))
    }
}

impl ResponseContext for PendingCredential {
    fn clear_credential(&mut self) {
        self.cleared = true;
    }
}
