//! Placeholder email account registry
//!
//! Stands in for a backend account service. Accounts live as a JSON array
//! under `registeredUsers` in a key-value store. Only a SHA-256 digest of
//! each password is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex};

use crate::models::AuthMethod;
use crate::session::{KeyValueStore, SessionError, REGISTERED_USERS_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: i64,
    pub email: String,
    pub password_digest: String,
    pub full_name: String,
    pub auth_method: AuthMethod,
    pub created_at: DateTime<Utc>,
}

/// Email account lookup and creation
pub trait UserRegistry: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the registry cannot be read
    fn find_by_email(&self, email: &str) -> Result<Option<RegisteredUser>, SessionError>;

    /// # Errors
    ///
    /// Returns an error if the registry cannot be written
    fn create(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<RegisteredUser, SessionError>;

    fn password_matches(&self, user: &RegisteredUser, password: &str) -> bool;
}

/// Registry over a [`KeyValueStore`]
pub struct LocalUserRegistry {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write of the array
    write_lock: Mutex<()>,
}

impl LocalUserRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<RegisteredUser>, SessionError> {
        match self.store.get(REGISTERED_USERS_KEY)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }
}

#[must_use]
pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

impl UserRegistry for LocalUserRegistry {
    fn find_by_email(&self, email: &str) -> Result<Option<RegisteredUser>, SessionError> {
        Ok(self.load()?.into_iter().find(|user| user.email == email))
    }

    fn create(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<RegisteredUser, SessionError> {
        let _guard = self.write_lock.lock().map_err(|_| SessionError::Poisoned)?;
        let mut users = self.load()?;

        let now = Utc::now();
        let last_id = users.iter().map(|user| user.id).max().unwrap_or(0);
        let user = RegisteredUser {
            id: now.timestamp_millis().max(last_id + 1),
            email: email.to_string(),
            password_digest: password_digest(password),
            full_name: full_name.to_string(),
            auth_method: AuthMethod::Email,
            created_at: now,
        };

        users.push(user.clone());
        self.store
            .set(REGISTERED_USERS_KEY, &serde_json::to_string(&users)?)?;
        log::info!("Registered email account {}", user.id);
        Ok(user)
    }

    fn password_matches(&self, user: &RegisteredUser, password: &str) -> bool {
        user.password_digest == password_digest(password)
    }
}
