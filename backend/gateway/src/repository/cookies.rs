use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};

/// Cookie the route guard reads to decide whether an admin is logged in.
pub const SESSION_COOKIE: &str = "admin-token";

/// Mirrors session state into a cookie. Written only through `AuthStore`.
pub trait CookieMirror: Send + Sync {
    fn write(&self, name: &str, value: &str, max_age: Duration);
    fn expire(&self, name: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoCookieMirror;

impl CookieMirror for NoCookieMirror {
    fn write(&self, _name: &str, _value: &str, _max_age: Duration) {}

    fn expire(&self, _name: &str) {}
}

/// Cookie jar scoped to the site origin, shareable with a `reqwest::Client`
/// that browses the admin pages.
#[derive(Debug, Clone)]
pub struct JarCookieMirror {
    jar: Arc<Jar>,
    origin: Url,
}

impl JarCookieMirror {
    pub fn new(origin: Url) -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            origin,
        }
    }

    pub fn jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    pub fn current(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

impl CookieMirror for JarCookieMirror {
    fn write(&self, name: &str, value: &str, max_age: Duration) {
        let cookie = format!("{name}={value}; Path=/; Max-Age={}", max_age.as_secs());
        self.jar.add_cookie_str(&cookie, &self.origin);
    }

    fn expire(&self, name: &str) {
        let cookie = format!("{name}=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        self.jar.add_cookie_str(&cookie, &self.origin);
    }
}
