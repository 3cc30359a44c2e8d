use super::*;
use mis_core::ID;

/// Signed payload of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub eml: String,
    pub jti: uuid::Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: ID<Account>, email: String, ttl: std::time::Duration) -> Self {
        let now = mis_core::now();
        Self {
            sub: user.inner(),
            eml: email,
            jti: uuid::Uuid::now_v7(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
        }
    }
    pub fn user(&self) -> ID<Account> {
        ID::from(self.sub)
    }
    pub fn email(&self) -> &str {
        &self.eml
    }
    /// Absolute expiry, for server-side session bookkeeping.
    pub fn expires_at(&self) -> std::time::SystemTime {
        std::time::UNIX_EPOCH + std::time::Duration::from_secs(self.exp.max(0) as u64)
    }
}
