/// Cookie mirrored by the admin client after login.
pub const SESSION_COOKIE: &str = "admin-token";

pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

const ADMIN_ROOT: &str = "/admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Decides access to the admin pages from the request path and the
/// `admin-token` cookie. Only presence of the cookie is checked here; the
/// backend validates the token itself.
pub fn decide(path: &str, token: Option<&str>) -> GuardDecision {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    let is_admin = path == ADMIN_ROOT
        || path
            .strip_prefix(ADMIN_ROOT)
            .is_some_and(|rest| rest.starts_with('/'));
    if !is_admin {
        return GuardDecision::Allow;
    }

    let logged_in = has_token(token);
    match path {
        ADMIN_ROOT if logged_in => GuardDecision::Redirect(DASHBOARD_PATH),
        ADMIN_ROOT => GuardDecision::Redirect(LOGIN_PATH),
        LOGIN_PATH if logged_in => GuardDecision::Redirect(DASHBOARD_PATH),
        LOGIN_PATH => GuardDecision::Allow,
        _ if logged_in => GuardDecision::Allow,
        _ => GuardDecision::Redirect(LOGIN_PATH),
    }
}

/// Client code has been known to store the strings "undefined" and "null".
fn has_token(token: Option<&str>) -> bool {
    token.is_some_and(|token| {
        let token = token.trim();
        !token.is_empty() && token != "undefined" && token != "null"
    })
}
