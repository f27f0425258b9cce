//! Session Management Module
//!
//! Client-held identity state for a storefront visitor.
//!
//! # Modules
//!
//! - [`manager`] - `SessionManager`, the injected login-state authority
//! - [`store`] - Persistent key-value storage and its well-known keys
//! - [`cookie`] - The visitor cookie set and response cookie construction

pub mod cookie;
pub mod manager;
pub mod store;

// Re-export commonly used items for convenience
pub use cookie::{
    extract_cookie_value, CookieExpiry, CookieFactory, CookieSet, CookieWrite, LOGIN_COOKIE,
    PHONE_COOKIE, VISITOR_COOKIE,
};
pub use manager::{SessionError, SessionManager};
pub use store::{
    FileStore, KeyValueStore, MemoryStore, LOGIN_TIMER_KEY, REGISTERED_USERS_KEY, USER_DETAIL_KEY,
};
