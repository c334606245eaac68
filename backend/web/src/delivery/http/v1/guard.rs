use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::domain::guard::{GuardDecision, SESSION_COOKIE, decide};

/// Keeps anonymous visitors out of `/admin/*` and logged-in admins off the
/// login page.
pub async fn admin_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());

    match decide(request.uri().path(), token) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!(path = %request.uri().path(), target, "admin guard redirect");
            metrics::counter!("admin_guard_redirects_total", "target" => target).increment(1);
            Redirect::temporary(target).into_response()
        }
    }
}
