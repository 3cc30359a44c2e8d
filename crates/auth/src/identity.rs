use super::*;
use mis_core::ID;
use mis_core::Unique;
use std::sync::Arc;
use std::time::Duration;

/// The resolved caller of a protected request. Lives in the request's
/// extensions for the remainder of that request and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    account: Account,
}

impl Identity {
    pub fn account(&self) -> &Account {
        &self.account
    }
    pub fn id(&self) -> ID<Account> {
        self.account.id()
    }
    pub fn into_inner(self) -> Account {
        self.account
    }
}

impl From<Account> for Identity {
    fn from(account: Account) -> Self {
        Self { account }
    }
}

/// Maps a presented bearer credential to the account it names, if any.
pub struct Resolver {
    users: Arc<dyn Users>,
    crypto: Crypto,
    mode: SessionMode,
    timeout: Duration,
}

impl Resolver {
    pub fn new(users: Arc<dyn Users>, crypto: Crypto, mode: SessionMode) -> Self {
        Self {
            users,
            crypto,
            mode,
            timeout: mis_core::STORE_TIMEOUT,
        }
    }
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
    pub fn users(&self) -> &dyn Users {
        self.users.as_ref()
    }
    pub fn crypto(&self) -> &Crypto {
        &self.crypto
    }
    pub fn mode(&self) -> SessionMode {
        self.mode
    }
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `Ok(None)` for any credential that does not name a live account:
    /// undecodable, expired, foreign-signed, subject deleted, or (in stored
    /// mode) superseded or logged out. Undecodable credentials never reach
    /// the store. Store failures are the only `Err`.
    pub async fn resolve(&self, token: &str) -> Result<Option<Account>, StoreError> {
        let claims = match self.crypto.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                log::debug!("rejected token ...{}: {}", suffix(token), e);
                return Ok(None);
            }
        };
        let account = bounded(self.timeout, self.users.find_by_id(claims.user())).await?;
        let account = account.filter(|account| match self.mode {
            SessionMode::Stateless => true,
            SessionMode::Stored => account.session().is_some_and(|s| s.admits(token)),
        });
        match account {
            Some(ref a) => log::debug!("resolved token ...{} to {}", suffix(token), a.id()),
            None => log::debug!("token ...{} names no live account", suffix(token)),
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    /// Counts lookups so tests can prove the store was never consulted.
    #[derive(Default)]
    struct Counted {
        inner: MemoryStore,
        lookups: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Users for Counted {
        async fn find_by_id(&self, id: ID<Account>) -> Result<Option<Account>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(id).await
        }
        async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
            self.inner.find_by_email(email).await
        }
        async fn find_by_handle(&self, handle: &str) -> Result<Option<Account>, StoreError> {
            self.inner.find_by_handle(handle).await
        }
        async fn insert(&self, account: &Account) -> Result<(), StoreError> {
            self.inner.insert(account).await
        }
        async fn update(&self, account: &Account) -> Result<(), StoreError> {
            self.inner.update(account).await
        }
        async fn stamp(&self, id: ID<Account>, s: Option<&Session>) -> Result<(), StoreError> {
            self.inner.stamp(id, s).await
        }
        async fn delete(&self, id: ID<Account>) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// A store that never answers.
    struct Stalled;

    #[async_trait::async_trait]
    impl Users for Stalled {
        async fn find_by_id(&self, _: ID<Account>) -> Result<Option<Account>, StoreError> {
            std::future::pending().await
        }
        async fn find_by_email(&self, _: &str) -> Result<Option<Account>, StoreError> {
            std::future::pending().await
        }
        async fn find_by_handle(&self, _: &str) -> Result<Option<Account>, StoreError> {
            std::future::pending().await
        }
        async fn insert(&self, _: &Account) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn update(&self, _: &Account) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn stamp(&self, _: ID<Account>, _: Option<&Session>) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn delete(&self, _: ID<Account>) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            std::future::pending().await
        }
    }

    const SECRET: &[u8] = b"resolver secret";

    async fn seeded(mode: SessionMode) -> (Arc<Counted>, Resolver, Account) {
        let counted = Arc::new(Counted::default());
        let account = Account::new("a@x.com", "abc", "hash".into(), Profile::default());
        counted.insert(&account).await.unwrap();
        let resolver = Resolver::new(counted.clone(), Crypto::new(SECRET), mode);
        (counted, resolver, account)
    }

    fn token(account: &Account) -> (String, Claims) {
        Crypto::new(SECRET)
            .issue(account.id(), account.email(), mis_core::TOKEN_DURATION)
            .unwrap()
    }

    #[tokio::test]
    async fn valid_token_resolves_to_its_subject() {
        let (_, resolver, account) = seeded(SessionMode::Stateless).await;
        let (token, _) = token(&account);
        assert_eq!(resolver.resolve(&token).await.unwrap(), Some(account));
    }

    #[tokio::test]
    async fn undecodable_tokens_skip_the_store() {
        let (counted, resolver, account) = seeded(SessionMode::Stateless).await;
        let (foreign, _) = Crypto::new(b"other")
            .issue(account.id(), account.email(), mis_core::TOKEN_DURATION)
            .unwrap();
        for bad in ["", "garbage", foreign.as_str()] {
            assert_eq!(resolver.resolve(bad).await.unwrap(), None);
        }
        assert_eq!(counted.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deleted_subject_resolves_to_none() {
        let (counted, resolver, account) = seeded(SessionMode::Stateless).await;
        let (token, _) = token(&account);
        counted.delete(account.id()).await.unwrap();
        assert_eq!(resolver.resolve(&token).await.unwrap(), None);
        assert_eq!(counted.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stored_mode_requires_matching_session() {
        let (counted, resolver, account) = seeded(SessionMode::Stored).await;
        let (first, claims) = token(&account);
        assert_eq!(resolver.resolve(&first).await.unwrap(), None);
        counted
            .stamp(account.id(), Some(&Session::of(&first, &claims)))
            .await
            .unwrap();
        assert!(resolver.resolve(&first).await.unwrap().is_some());
        let (second, claims) = token(&account);
        counted
            .stamp(account.id(), Some(&Session::of(&second, &claims)))
            .await
            .unwrap();
        assert_eq!(resolver.resolve(&first).await.unwrap(), None);
        assert!(resolver.resolve(&second).await.unwrap().is_some());
        counted.stamp(account.id(), None).await.unwrap();
        assert_eq!(resolver.resolve(&second).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stored_mode_honours_stored_expiry() {
        let (counted, resolver, account) = seeded(SessionMode::Stored).await;
        let (token, _) = token(&account);
        let stale = Session::new(
            Crypto::hash(&token),
            std::time::SystemTime::now() - Duration::from_secs(1),
        );
        counted.stamp(account.id(), Some(&stale)).await.unwrap();
        assert_eq!(resolver.resolve(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn stalled_store_times_out() {
        let resolver = Resolver::new(Arc::new(Stalled), Crypto::new(SECRET), SessionMode::Stateless)
            .with_timeout(Duration::from_millis(10));
        let account = Account::new("a@x.com", "abc", "hash".into(), Profile::default());
        let (token, _) = token(&account);
        assert!(matches!(resolver.resolve(&token).await, Err(StoreError::Timeout)));
    }
}
