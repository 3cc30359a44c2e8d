use super::*;
use std::time::SystemTime;

/// Server-side record of the one token an account may currently present.
/// Only kept in [`SessionMode::Stored`]; a new login overwrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    hash: Vec<u8>,
    expires: SystemTime,
}

impl Session {
    pub fn new(hash: Vec<u8>, expires: SystemTime) -> Self {
        Self { hash, expires }
    }
    /// Session for a freshly issued token.
    pub fn of(token: &str, claims: &Claims) -> Self {
        Self::new(Crypto::hash(token), claims.expires_at())
    }
    pub fn hash(&self) -> &[u8] {
        &self.hash
    }
    pub fn expires_at(&self) -> SystemTime {
        self.expires
    }
    pub fn expired(&self) -> bool {
        self.expires <= SystemTime::now()
    }
    /// Exact fingerprint match and unexpired.
    pub fn admits(&self, token: &str) -> bool {
        !self.expired() && Crypto::matches(&self.hash, token)
    }
}
