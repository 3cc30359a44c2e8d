use super::*;
use mis_core::ID;
use mis_core::Unique;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Record store consumed by the identity core.
///
/// `insert` is the authoritative uniqueness check for email and handle:
/// implementations must reject a duplicate atomically with
/// [`StoreError::Conflict`], whatever any earlier lookup said.
#[async_trait::async_trait]
pub trait Users: Send + Sync {
    async fn find_by_id(&self, id: ID<Account>) -> Result<Option<Account>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Account>, StoreError>;
    async fn insert(&self, account: &Account) -> Result<(), StoreError>;
    /// Persists profile fields and `updated_at`. Session fields are untouched.
    async fn update(&self, account: &Account) -> Result<(), StoreError>;
    /// Replaces the server-side session in one write.
    async fn stamp(&self, id: ID<Account>, session: Option<&Session>) -> Result<(), StoreError>;
    async fn delete(&self, id: ID<Account>) -> Result<(), StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Runs a store call with an upper bound on its duration.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| {
            log::warn!("store call exceeded {:?}", limit);
            Err(StoreError::Timeout)
        })
}

/// In-process store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: tokio::sync::RwLock<HashMap<ID<Account>, Account>>,
}

impl MemoryStore {
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait::async_trait]
impl Users for MemoryStore {
    async fn find_by_id(&self, id: ID<Account>) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email() == email)
            .cloned())
    }
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.handle() == handle)
            .cloned())
    }
    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email() == account.email()) {
            return Err(StoreError::Conflict(Field::Email));
        }
        if accounts.values().any(|a| a.handle() == account.handle()) {
            return Err(StoreError::Conflict(Field::Handle));
        }
        accounts.insert(account.id(), account.clone());
        Ok(())
    }
    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts.get_mut(&account.id()).ok_or(StoreError::NotFound)?;
        stored.profile = account.profile.clone();
        stored.updated = account.updated;
        Ok(())
    }
    async fn stamp(&self, id: ID<Account>, session: Option<&Session>) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.session = session.cloned();
        Ok(())
    }
    async fn delete(&self, id: ID<Account>) -> Result<(), StoreError> {
        self.accounts
            .write()
            .await
            .remove(&id)
            .map(std::mem::drop)
            .ok_or(StoreError::NotFound)
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn account(email: &str, handle: &str) -> Account {
        Account::new(email, handle, "hash".into(), Profile::default())
    }

    #[tokio::test]
    async fn lookups_by_every_key() {
        let store = MemoryStore::default();
        let a = account("a@x.com", "abc");
        store.insert(&a).await.unwrap();
        assert_eq!(store.find_by_id(a.id()).await.unwrap(), Some(a.clone()));
        assert_eq!(store.find_by_email("a@x.com").await.unwrap(), Some(a.clone()));
        assert_eq!(store.find_by_handle("abc").await.unwrap(), Some(a));
        assert_eq!(store.find_by_email("b@x.com").await.unwrap(), None);
        assert_eq!(store.find_by_id(ID::default()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn insert_enforces_both_constraints() {
        let store = MemoryStore::default();
        store.insert(&account("a@x.com", "abc")).await.unwrap();
        assert!(matches!(
            store.insert(&account("a@x.com", "other")).await,
            Err(StoreError::Conflict(Field::Email))
        ));
        assert!(matches!(
            store.insert(&account("b@x.com", "abc")).await,
            Err(StoreError::Conflict(Field::Handle))
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_duplicates_admit_exactly_one() {
        let store = Arc::new(MemoryStore::default());
        let attempts = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(&account("race@x.com", &format!("racer{}", i)))
                        .await
                        .is_ok()
                })
            })
            .collect::<Vec<_>>();
        let mut wins = 0;
        for attempt in attempts {
            wins += attempt.await.unwrap() as usize;
        }
        assert_eq!(wins, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_keeps_session_and_stamp_keeps_profile() {
        let store = MemoryStore::default();
        let mut a = account("a@x.com", "abc");
        store.insert(&a).await.unwrap();
        let session = Session::new(vec![1, 2, 3], std::time::SystemTime::now());
        store.stamp(a.id(), Some(&session)).await.unwrap();
        a.revise(ProfilePatch {
            bio: Some("hi".into()),
            ..ProfilePatch::default()
        });
        store.update(&a).await.unwrap();
        let stored = store.find_by_id(a.id()).await.unwrap().unwrap();
        assert_eq!(stored.session(), Some(&session));
        assert_eq!(stored.profile().bio.as_deref(), Some("hi"));
        store.stamp(a.id(), None).await.unwrap();
        let stored = store.find_by_id(a.id()).await.unwrap().unwrap();
        assert_eq!(stored.session(), None);
        assert_eq!(stored.profile().bio.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = MemoryStore::default();
        let a = account("a@x.com", "abc");
        assert!(matches!(store.update(&a).await, Err(StoreError::NotFound)));
        assert!(matches!(store.stamp(a.id(), None).await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete(a.id()).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn bounded_times_out() {
        let slow = std::future::pending::<Result<(), StoreError>>();
        let result = bounded(Duration::from_millis(10), slow).await;
        assert!(matches!(result, Err(StoreError::Timeout)));
        let fast = async { Ok::<_, StoreError>(7) };
        assert_eq!(bounded(Duration::from_secs(1), fast).await.unwrap(), 7);
    }
}
