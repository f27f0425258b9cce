//! Session Manager - client-held identity state
//!
//! `SessionManager` is the single source of truth for "is the visitor signed in".
//! It owns the persisted `UserSession`, the login timer flag and the cookie set,
//! and publishes every login-state change on a `watch` channel so that the
//! booking wizard and any other observer read the same value.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::models::{AuthMethod, UserSession};
use crate::session::cookie::{CookieExpiry, CookieSet, CookieWrite, LOGIN_COOKIE, PHONE_COOKIE};
use crate::session::store::{KeyValueStore, LOGIN_TIMER_KEY, USER_DETAIL_KEY};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("client storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("client storage holds invalid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("client storage lock poisoned")]
    Poisoned,
}

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    cookies: Mutex<CookieSet>,
    login_state: watch::Sender<bool>,
}

impl SessionManager {
    /// Create a manager over `store`, seeding the login flag from any stored session
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let logged_in = matches!(store.get(USER_DETAIL_KEY), Ok(Some(_)));
        let (login_state, _) = watch::channel(logged_in);
        Self {
            store,
            cookies: Mutex::new(CookieSet::new()),
            login_state,
        }
    }

    /// The stored session, if one exists and parses
    ///
    /// A corrupt entry is logged and treated as signed out.
    #[must_use]
    pub fn current_session(&self) -> Option<UserSession> {
        match self.store.get(USER_DETAIL_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<UserSession>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    log::warn!("Ignoring unreadable stored session: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::error!("Failed to read stored session: {e}");
                None
            }
        }
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        *self.login_state.borrow()
    }

    /// Observe login-state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.login_state.subscribe()
    }

    /// Persist `user` as the active session and mark the visitor signed in
    ///
    /// The phone cookie is written only for mobile logins.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized or stored
    pub fn store_user_session(
        &self,
        user: &UserSession,
        method: AuthMethod,
        phone: Option<&str>,
    ) -> Result<(), SessionError> {
        let serialized = serde_json::to_string(user)?;
        self.store.set(USER_DETAIL_KEY, &serialized)?;
        self.store.set(LOGIN_TIMER_KEY, "false")?;

        {
            let mut cookies = self.lock_cookies()?;
            cookies.set(LOGIN_COOKIE, "true", CookieExpiry::FarFuture);
            if method == AuthMethod::Mobile {
                let phone = phone.unwrap_or_else(|| user.phone());
                cookies.set(PHONE_COOKIE, phone, CookieExpiry::FarFuture);
            }
        }

        self.login_state.send_replace(true);
        log::info!("Stored {method} session for user {}", user.id);
        Ok(())
    }

    /// Sign the visitor out
    ///
    /// # Errors
    ///
    /// Returns an error if the client storage cannot be written
    pub fn clear_user_session(&self) -> Result<(), SessionError> {
        self.store.remove(USER_DETAIL_KEY)?;
        self.store.set(LOGIN_TIMER_KEY, "true")?;

        {
            let mut cookies = self.lock_cookies()?;
            cookies.set(LOGIN_COOKIE, "false", CookieExpiry::Session);
            cookies.set(PHONE_COOKIE, "", CookieExpiry::Session);
        }

        self.login_state.send_replace(false);
        log::info!("Cleared stored session");
        Ok(())
    }

    /// Phone number from the last mobile login, used to prefill the form
    #[must_use]
    pub fn remembered_phone(&self) -> Option<String> {
        self.cookie(PHONE_COOKIE).filter(|phone| !phone.is_empty())
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies
            .lock()
            .ok()
            .and_then(|cookies| cookies.get(name).map(ToString::to_string))
    }

    #[must_use]
    pub fn login_timer(&self) -> Option<String> {
        self.store.get(LOGIN_TIMER_KEY).ok().flatten()
    }

    /// Record a cookie value sent by the browser
    pub fn absorb_cookie(&self, name: &str, value: &str) {
        if let Ok(mut cookies) = self.cookies.lock() {
            cookies.absorb(name, value);
        }
    }

    /// Cookie changes to attach to the next response
    #[must_use]
    pub fn take_cookie_writes(&self) -> Vec<CookieWrite> {
        self.cookies
            .lock()
            .map(|mut cookies| cookies.take_pending())
            .unwrap_or_default()
    }

    fn lock_cookies(&self) -> Result<std::sync::MutexGuard<'_, CookieSet>, SessionError> {
        self.cookies.lock().map_err(|_| SessionError::Poisoned)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}
