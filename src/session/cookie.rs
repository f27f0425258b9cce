use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, Expiration, SameSite};
use actix_web::HttpRequest;
use std::collections::HashMap;

/// `"true"` while a session is stored, `"false"` after logout
pub const LOGIN_COOKIE: &str = "LennyCheck";
/// Phone number of the last mobile login
pub const PHONE_COOKIE: &str = "LennyPhone_number";
/// Keys per-visitor state on the server
pub const VISITOR_COOKIE: &str = "lenny_visitor";

/// 9999-12-31T00:00:00Z
const FAR_FUTURE_UNIX: i64 = 253_402_214_400;

/// How long a written cookie lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieExpiry {
    /// Expires 9999-12-31
    FarFuture,
    /// Dropped when the browser closes
    Session,
}

/// A cookie value waiting to be sent to the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieWrite {
    pub name: String,
    pub value: String,
    pub expiry: CookieExpiry,
}

/// The visitor's cookie jar as the storefront sees it
///
/// Values arrive from request cookies through [`CookieSet::absorb`] and are
/// changed through [`CookieSet::set`]. Changes are queued until the HTTP layer
/// takes them for the response.
#[derive(Debug, Clone, Default)]
pub struct CookieSet {
    values: HashMap<String, String>,
    pending: Vec<CookieWrite>,
}

impl CookieSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value the browser already holds
    pub fn absorb(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn set(&mut self, name: &str, value: &str, expiry: CookieExpiry) {
        self.values.insert(name.to_string(), value.to_string());
        self.pending.retain(|write| write.name != name);
        self.pending.push(CookieWrite {
            name: name.to_string(),
            value: value.to_string(),
            expiry,
        });
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Drain writes not yet sent to the browser
    pub fn take_pending(&mut self) -> Vec<CookieWrite> {
        std::mem::take(&mut self.pending)
    }
}

/// Builds response cookies with the storefront's attributes
#[derive(Debug, Clone, Copy)]
pub struct CookieFactory {
    cookie_secure: bool,
}

impl CookieFactory {
    #[must_use]
    pub const fn new(cookie_secure: bool) -> Self {
        Self { cookie_secure }
    }

    /// Turn a queued write into a browser cookie
    ///
    /// These cookies are read by page scripts, so they are not `HttpOnly`.
    #[must_use]
    pub fn build(&self, write: &CookieWrite) -> Cookie<'static> {
        let expires = match write.expiry {
            CookieExpiry::FarFuture => far_future(),
            CookieExpiry::Session => Expiration::Session,
        };

        Cookie::build(write.name.clone(), write.value.clone())
            .path("/")
            .http_only(false)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .expires(expires)
            .finish()
    }

    /// Long-lived visitor id cookie
    #[must_use]
    pub fn visitor_cookie(&self, visitor_id: &str) -> Cookie<'static> {
        Cookie::build(VISITOR_COOKIE, visitor_id.to_owned())
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .expires(far_future())
            .finish()
    }
}

fn far_future() -> Expiration {
    OffsetDateTime::from_unix_timestamp(FAR_FUTURE_UNIX).map_or(Expiration::Session, Expiration::DateTime)
}

/// Helper function to extract a cookie value from `HttpRequest`
#[must_use]
pub fn extract_cookie_value(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    req.cookie(cookie_name).map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_pending_write_for_same_name() {
        let mut cookies = CookieSet::new();
        cookies.absorb(LOGIN_COOKIE, "false");
        cookies.set(LOGIN_COOKIE, "true", CookieExpiry::FarFuture);
        cookies.set(PHONE_COOKIE, "9876543210", CookieExpiry::FarFuture);
        cookies.set(LOGIN_COOKIE, "false", CookieExpiry::Session);

        assert_eq!(cookies.get(LOGIN_COOKIE), Some("false"));
        let pending = cookies.take_pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1].name, LOGIN_COOKIE);
        assert_eq!(pending[1].expiry, CookieExpiry::Session);
        assert!(cookies.take_pending().is_empty());
    }

    #[test]
    fn test_far_future_cookie_attributes() {
        let factory = CookieFactory::new(false);
        let cookie = factory.build(&CookieWrite {
            name: LOGIN_COOKIE.to_string(),
            value: "true".to_string(),
            expiry: CookieExpiry::FarFuture,
        });

        assert_eq!(cookie.name(), LOGIN_COOKIE);
        assert_eq!(cookie.value(), "true");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        let expires = cookie.expires_datetime().unwrap();
        assert_eq!(expires.year(), 9999);
        assert_eq!(u8::from(expires.month()), 12);
        assert_eq!(expires.day(), 31);
    }

    #[test]
    fn test_session_cookie_has_no_expiry_date() {
        let factory = CookieFactory::new(true);
        let cookie = factory.build(&CookieWrite {
            name: PHONE_COOKIE.to_string(),
            value: String::new(),
            expiry: CookieExpiry::Session,
        });

        assert_eq!(cookie.secure(), Some(true));
        assert!(cookie.expires_datetime().is_none());
    }
}
