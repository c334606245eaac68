use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;

use crate::domain::session::{AdminUser, TokenPair, redact};
use crate::repository::cookies::{CookieMirror, NoCookieMirror, SESSION_COOKIE};
use crate::repository::storage::{KeyValueStore, MemoryStore};
use crate::usecase::clock::{Clock, SystemClock};

const ACCESS_TOKEN_KEY: &str = "admin-token";
const REFRESH_TOKEN_KEY: &str = "admin-refresh-token";
const EXPIRY_KEY: &str = "admin-token-expiry";
const USER_KEY: &str = "admin-user";

/// Sole owner of the admin credentials.
///
/// Every write goes through [`AuthStore::set_tokens`] or
/// [`AuthStore::clear_tokens`], which update storage and the session cookie
/// under one lock so readers never see a half-written set.
pub struct AuthStore {
    storage: Arc<dyn KeyValueStore>,
    cookies: Arc<dyn CookieMirror>,
    clock: Arc<dyn Clock>,
    guard: RwLock<()>,
}

impl AuthStore {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        cookies: Arc<dyn CookieMirror>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            cookies,
            clock,
            guard: RwLock::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::default()),
            Arc::new(NoCookieMirror),
            Arc::new(SystemClock),
        )
    }

    /// Returns the access token while it is unexpired. An expired token is
    /// cleared together with the rest of the session.
    pub fn access_token(&self) -> Option<String> {
        {
            let _read = self.guard.read();
            let token = self.storage.get(ACCESS_TOKEN_KEY)?;
            if self.is_live(self.stored_expiry()) {
                return Some(token);
            }
        }

        let _write = self.guard.write();
        // re-check: another writer may have stored a fresh token meanwhile
        if self.storage.get(ACCESS_TOKEN_KEY).is_some() && !self.is_live(self.stored_expiry()) {
            tracing::info!("access token expired, clearing session");
            self.clear_locked();
        }
        None
    }

    pub fn refresh_token(&self) -> Option<String> {
        let _read = self.guard.read();
        self.storage.get(REFRESH_TOKEN_KEY)
    }

    pub fn user(&self) -> Option<AdminUser> {
        let _read = self.guard.read();
        let raw = self.storage.get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let _read = self.guard.read();
        self.stored_expiry()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// True when fewer than `threshold` remain before expiry. False when no
    /// expiry is stored.
    pub fn is_expiring_soon(&self, threshold: Duration) -> bool {
        let Some(expires_at) = self.expires_at() else {
            return false;
        };
        let threshold = TimeDelta::from_std(threshold).unwrap_or(TimeDelta::MAX);
        expires_at - self.clock.now() < threshold
    }

    /// Current token set, if the access token is still live.
    pub fn token_pair(&self) -> Option<TokenPair> {
        let access_token = self.access_token()?;
        let _read = self.guard.read();
        Some(TokenPair {
            access_token,
            refresh_token: self.storage.get(REFRESH_TOKEN_KEY)?,
            expires_at: self.stored_expiry()?,
        })
    }

    /// Stores a new token set. A missing `user` keeps the cached profile.
    pub fn set_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in: Duration,
        user: Option<&AdminUser>,
    ) -> TokenPair {
        let _write = self.guard.write();
        self.set_locked(access_token, refresh_token, expires_in, user)
    }

    /// Like [`AuthStore::set_tokens`], but only while `expected_refresh` is
    /// still the stored refresh token. Returns `None` without writing when the
    /// session was replaced or cleared in the meantime.
    pub fn rotate_tokens(
        &self,
        expected_refresh: &str,
        access_token: &str,
        refresh_token: &str,
        expires_in: Duration,
        user: Option<&AdminUser>,
    ) -> Option<TokenPair> {
        let _write = self.guard.write();
        if self.storage.get(REFRESH_TOKEN_KEY).as_deref() != Some(expected_refresh) {
            return None;
        }
        Some(self.set_locked(access_token, refresh_token, expires_in, user))
    }

    fn set_locked(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in: Duration,
        user: Option<&AdminUser>,
    ) -> TokenPair {
        let lifetime = TimeDelta::from_std(expires_in).unwrap_or(TimeDelta::MAX);
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.storage.set(ACCESS_TOKEN_KEY, access_token);
        self.storage.set(REFRESH_TOKEN_KEY, refresh_token);
        self.storage
            .set(EXPIRY_KEY, &expires_at.timestamp_millis().to_string());
        if let Some(user) = user {
            match serde_json::to_string(user) {
                Ok(raw) => self.storage.set(USER_KEY, &raw),
                Err(e) => tracing::warn!(error = %e, "failed to cache admin profile"),
            }
        }
        self.cookies.write(SESSION_COOKIE, access_token, expires_in);

        tracing::debug!(
            access_token = %redact(access_token),
            %expires_at,
            "tokens stored"
        );

        TokenPair {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at,
        }
    }

    pub fn clear_tokens(&self) {
        let _write = self.guard.write();
        self.clear_locked();
    }

    fn clear_locked(&self) {
        self.storage.remove(ACCESS_TOKEN_KEY);
        self.storage.remove(REFRESH_TOKEN_KEY);
        self.storage.remove(EXPIRY_KEY);
        self.storage.remove(USER_KEY);
        self.cookies.expire(SESSION_COOKIE);
        tracing::debug!("tokens cleared");
    }

    fn stored_expiry(&self) -> Option<DateTime<Utc>> {
        self.storage
            .get(EXPIRY_KEY)?
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    fn is_live(&self, expires_at: Option<DateTime<Utc>>) -> bool {
        expires_at.is_some_and(|expires_at| self.clock.now() < expires_at)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Url;

    use super::*;
    use crate::repository::cookies::JarCookieMirror;
    use crate::repository::storage::{MockKeyValueStore, NullStore};
    use crate::usecase::clock::testing::ManualClock;

    const LIFETIME: Duration = Duration::from_secs(7200);

    fn store_with_clock() -> (AuthStore, Arc<ManualClock>, Arc<JarCookieMirror>) {
        let clock = Arc::new(ManualClock::new());
        let cookies = Arc::new(JarCookieMirror::new(
            Url::parse("http://localhost:3000").unwrap(),
        ));
        let store = AuthStore::new(
            Arc::new(MemoryStore::default()),
            cookies.clone(),
            clock.clone(),
        );
        (store, clock, cookies)
    }

    fn admin() -> AdminUser {
        AdminUser {
            id: 1,
            name: "admin".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_authenticated_until_expiry() {
        let (store, clock, _) = store_with_clock();

        store.set_tokens("access", "refresh", LIFETIME, None);
        assert!(store.is_authenticated());

        clock.advance(TimeDelta::seconds(7199));
        assert!(store.is_authenticated());

        clock.advance(TimeDelta::seconds(2));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_expired_read_clears_everything() {
        let (store, clock, cookies) = store_with_clock();
        store.set_tokens("access", "refresh", LIFETIME, Some(&admin()));

        clock.advance(TimeDelta::seconds(7201));

        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(store.user().is_none());
        assert!(cookies.current(SESSION_COOKIE).is_none());
    }

    #[test]
    fn test_clear_is_total_and_idempotent() {
        let (store, _, cookies) = store_with_clock();
        store.set_tokens("access", "refresh", LIFETIME, Some(&admin()));
        assert_eq!(cookies.current(SESSION_COOKIE).as_deref(), Some("access"));

        store.clear_tokens();
        store.clear_tokens();

        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(!store.is_authenticated());
        assert!(store.expires_at().is_none());
        assert!(cookies.current(SESSION_COOKIE).is_none());
    }

    #[test]
    fn test_rotation_keeps_cached_user() {
        let (store, _, cookies) = store_with_clock();
        store.set_tokens("access-1", "refresh-1", LIFETIME, Some(&admin()));

        store.set_tokens("access-2", "refresh-2", LIFETIME, None);

        assert_eq!(store.access_token().as_deref(), Some("access-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-2"));
        assert_eq!(store.user(), Some(admin()));
        assert_eq!(cookies.current(SESSION_COOKIE).as_deref(), Some("access-2"));
    }

    #[test]
    fn test_expiring_soon() {
        let (store, clock, _) = store_with_clock();
        let threshold = Duration::from_secs(300);
        assert!(!store.is_expiring_soon(threshold));

        store.set_tokens("access", "refresh", LIFETIME, None);
        assert!(!store.is_expiring_soon(threshold));

        clock.advance(TimeDelta::seconds(7200 - 299));
        assert!(store.is_expiring_soon(threshold));
    }

    #[test]
    fn test_token_without_expiry_is_rejected() {
        let storage = Arc::new(MemoryStore::default());
        storage.set(ACCESS_TOKEN_KEY, "orphan");
        let store = AuthStore::new(storage.clone(), Arc::new(NoCookieMirror), Arc::new(SystemClock));

        assert!(store.access_token().is_none());
        assert!(storage.get(ACCESS_TOKEN_KEY).is_none());
    }

    #[test]
    fn test_unavailable_storage_reads_absent() {
        let store = AuthStore::new(Arc::new(NullStore), Arc::new(NoCookieMirror), Arc::new(SystemClock));

        store.set_tokens("access", "refresh", LIFETIME, Some(&admin()));

        assert!(!store.is_authenticated());
        assert!(store.refresh_token().is_none());
        assert!(store.user().is_none());
        store.clear_tokens();
    }

    #[test]
    fn test_rotation_requires_current_refresh_token() {
        let (store, _, _) = store_with_clock();
        store.set_tokens("access-1", "refresh-1", LIFETIME, None);

        let rotated = store.rotate_tokens("refresh-1", "access-2", "refresh-2", LIFETIME, None);
        assert_eq!(rotated.unwrap().access_token, "access-2");

        let stale = store.rotate_tokens("refresh-1", "access-3", "refresh-3", LIFETIME, None);
        assert!(stale.is_none());
        assert_eq!(store.token_pair().unwrap().refresh_token, "refresh-2");

        store.clear_tokens();
        assert!(store.rotate_tokens("refresh-2", "a", "r", LIFETIME, None).is_none());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_clear_removes_every_key() {
        let mut storage = MockKeyValueStore::new();
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRY_KEY, USER_KEY] {
            storage
                .expect_remove()
                .withf(move |removed: &str| removed == key)
                .times(1)
                .return_const(());
        }
        let store = AuthStore::new(Arc::new(storage), Arc::new(NoCookieMirror), Arc::new(SystemClock));

        store.clear_tokens();
    }
}
