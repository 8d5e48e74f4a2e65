//! Expiry-aware bearer token cache keyed by `(issuer, scope)`

use std::collections::HashMap;
use std::sync::Mutex;

use crate::auth::AccessToken;

/// Seconds before `expires_at` after which a cached token is no longer handed out
pub const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Default)]
pub struct TokenCache {
    entries: Mutex<HashMap<(String, String), AccessToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for `(issuer, scope)` if it stays valid past `now + skew`
    pub fn get(&self, issuer: &str, scope: &str, now: i64) -> Option<AccessToken> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let key = (issuer.to_string(), scope.to_string());
        match entries.get(&key) {
            Some(token) if token.is_fresh(now, EXPIRY_SKEW_SECS) => Some(token.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, issuer: &str, scope: &str, token: AccessToken) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert((issuer.to_string(), scope.to_string()), token);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
