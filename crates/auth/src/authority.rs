use super::*;
use mis_core::Unique;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Registration, login, and logout over a record store.
///
/// Transport-free: the actix handlers are thin wrappers, and tests drive
/// this directly.
pub struct Authority {
    resolver: Resolver,
    ttl: Duration,
}

impl Authority {
    pub fn new(users: Arc<dyn Users>, crypto: Crypto, mode: SessionMode) -> Self {
        Self {
            resolver: Resolver::new(users, crypto, mode),
            ttl: mis_core::TOKEN_DURATION,
        }
    }
    pub fn with_ttl(self, ttl: Duration) -> Self {
        Self { ttl, ..self }
    }
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            resolver: self.resolver.with_timeout(timeout),
            ..self
        }
    }
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
    pub fn users(&self) -> &dyn Users {
        self.resolver.users()
    }
    pub fn mode(&self) -> SessionMode {
        self.resolver.mode()
    }

    /// Creates an account and signs it in. The pre-checks only produce the
    /// friendlier error; the store's constraint on insert is authoritative.
    pub async fn register(&self, req: RegisterRequest) -> Result<(Account, String), AuthError> {
        req.validate()?;
        let email = normalize(&req.email);
        let handle = normalize(&req.handle);
        if self.within(self.users().find_by_email(&email)).await?.is_some() {
            log::info!("registration refused: email in use");
            return Err(AuthError::Conflict(Field::Email));
        }
        if self.within(self.users().find_by_handle(&handle)).await?.is_some() {
            log::info!("registration refused: handle {} in use", handle);
            return Err(AuthError::Conflict(Field::Handle));
        }
        let hashword = hashed(req.password.clone()).await?;
        let mut account = Account::new(&email, &handle, hashword, req.profile());
        let token = self.issue(&mut account)?;
        self.within(self.users().insert(&account)).await?;
        log::info!(target: "access", "{} registered as {}", account.id(), account.handle());
        Ok((account, token))
    }

    /// Unknown email and wrong password are indistinguishable to the caller,
    /// in outcome and in cost. `peer` is only recorded in the access log.
    pub async fn login(
        &self,
        req: LoginRequest,
        peer: Option<SocketAddr>,
    ) -> Result<(Account, String), AuthError> {
        req.validate()?;
        let email = normalize(&req.email);
        let account = self.within(self.users().find_by_email(&email)).await?;
        let hashword = account.as_ref().map(|a| a.hashword().to_string());
        let verified = checked(req.password.clone(), hashword).await?;
        let mut account = match account {
            Some(account) if verified => account,
            _ => {
                log::info!("login refused from {}", origin(peer));
                return Err(AuthError::InvalidCredentials);
            }
        };
        let token = self.issue(&mut account)?;
        if let Some(session) = account.session() {
            self.within(self.users().stamp(account.id(), Some(session)))
                .await?;
        }
        log::info!(target: "access", "{} logged in from {}", account.id(), origin(peer));
        Ok((account, token))
    }

    /// Returns whether the credential was actually revoked. In stateless
    /// mode it was not: the token remains valid until it expires.
    pub async fn logout(&self, identity: &Identity) -> Result<bool, AuthError> {
        match self.mode() {
            SessionMode::Stateless => Ok(false),
            SessionMode::Stored => {
                self.within(self.users().stamp(identity.id(), None)).await?;
                log::info!(target: "access", "{} logged out", identity.id());
                Ok(true)
            }
        }
    }

    /// Signs a token for `account`; in stored mode also records its session
    /// on the account (the caller persists it).
    fn issue(&self, account: &mut Account) -> Result<String, AuthError> {
        let (token, claims) = self
            .resolver
            .crypto()
            .issue(account.id(), account.email(), self.ttl)?;
        if self.mode() == SessionMode::Stored {
            account.sign_in(Session::of(&token, &claims));
        }
        Ok(token)
    }

    /// Runs one store call under the configured timeout.
    pub async fn within<T, F>(&self, call: F) -> Result<T, AuthError>
    where
        F: std::future::Future<Output = Result<T, StoreError>>,
    {
        Ok(bounded(self.resolver.timeout(), call).await?)
    }
}

/// Argon2 is deliberately slow; keep it off the async workers.
async fn hashed(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash(&password))
        .await
        .map_err(|e| {
            log::error!("hashing task failed: {}", e);
            AuthError::Internal
        })?
        .map_err(|e| {
            log::error!("password hashing failed: {}", e);
            AuthError::Internal
        })
}

/// Verifies against the decoy when there is no stored hash. The decoy is
/// built lazily with a full Argon2 hash, so it is fetched on the blocking pool.
async fn checked(password: String, hashword: Option<String>) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || match hashword {
        Some(ref hashword) => password::verify(&password, hashword),
        None => password::verify(&password, password::decoy()),
    })
    .await
        .map_err(|e| {
            log::error!("verification task failed: {}", e);
            AuthError::Internal
        })
}

fn origin(peer: Option<SocketAddr>) -> String {
    peer.map(|p| p.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
