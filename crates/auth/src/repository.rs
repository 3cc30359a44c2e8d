use super::*;
use mis_core::ID;
use mis_core::Unique;
use mis_database::*;
use tokio_postgres::Client;
use tokio_postgres::error::SqlState;

/// Column order shared by every SELECT and [`hydrate`].
const COLUMNS: &str = "id, email, handle, hashword, first_name, last_name, education_level, \
     profile_type, bio, occupation, website, interests, organization_name, avatar_uri, \
     token_hash, token_expires, created_at, updated_at";

/// Unique violations on a known key become conflicts on that field;
/// anything else is a backend failure.
fn fault(e: PgErr) -> StoreError {
    let field = match e.as_db_error() {
        Some(db) if db.code() == &SqlState::UNIQUE_VIOLATION => conflict(db.constraint()),
        _ => None,
    };
    match field {
        Some(field) => StoreError::Conflict(field),
        None => StoreError::Backend(e.to_string()),
    }
}

fn conflict(constraint: Option<&str>) -> Option<Field> {
    match constraint {
        Some(EMAIL_KEY) => Some(Field::Email),
        Some(HANDLE_KEY) => Some(Field::Handle),
        _ => None,
    }
}

fn hydrate(row: &tokio_postgres::Row) -> Result<Account, PgErr> {
    let token_hash = row.try_get::<_, Option<Vec<u8>>>(14)?;
    let token_expires = row.try_get::<_, Option<std::time::SystemTime>>(15)?;
    Ok(Account {
        id: ID::from(row.try_get::<_, uuid::Uuid>(0)?),
        email: row.try_get(1)?,
        handle: row.try_get(2)?,
        hashword: row.try_get(3)?,
        profile: Profile {
            first_name: row.try_get(4)?,
            last_name: row.try_get(5)?,
            education_level: row.try_get(6)?,
            profile_type: row.try_get(7)?,
            bio: row.try_get(8)?,
            occupation: row.try_get(9)?,
            website: row.try_get(10)?,
            interests: row.try_get(11)?,
            organization_name: row.try_get(12)?,
            avatar_uri: row.try_get(13)?,
        },
        session: token_hash.zip(token_expires).map(|(h, e)| Session::new(h, e)),
        created: row.try_get(16)?,
        updated: row.try_get(17)?,
    })
}

/// Single-row lookup on one column.
async fn lookup(
    client: &Client,
    sql: &str,
    param: &(dyn tokio_postgres::types::ToSql + Sync),
) -> Result<Option<Account>, StoreError> {
    client
        .query_opt(sql, &[param])
        .await
        .map_err(fault)?
        .map(|row| hydrate(&row).map_err(fault))
        .transpose()
}

/// Fails with `NotFound` when no row was touched.
fn touched(rows: u64) -> Result<(), StoreError> {
    match rows {
        0 => Err(StoreError::NotFound),
        _ => Ok(()),
    }
}

#[async_trait::async_trait]
impl Users for Client {
    async fn find_by_id(&self, id: ID<Account>) -> Result<Option<Account>, StoreError> {
        lookup(
            self,
            const_format::concatcp!("SELECT ", COLUMNS, " FROM ", ACCOUNTS, " WHERE id = $1"),
            &id.inner(),
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        lookup(
            self,
            const_format::concatcp!("SELECT ", COLUMNS, " FROM ", ACCOUNTS, " WHERE email = $1"),
            &email,
        )
        .await
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Account>, StoreError> {
        lookup(
            self,
            const_format::concatcp!("SELECT ", COLUMNS, " FROM ", ACCOUNTS, " WHERE handle = $1"),
            &handle,
        )
        .await
    }

    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let p = account.profile();
        let session = account.session();
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                ACCOUNTS,
                " (",
                COLUMNS,
                ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"
            ),
            &[
                &account.id().inner(),
                &account.email(),
                &account.handle(),
                &account.hashword(),
                &p.first_name,
                &p.last_name,
                &p.education_level,
                &p.profile_type,
                &p.bio,
                &p.occupation,
                &p.website,
                &p.interests,
                &p.organization_name,
                &p.avatar_uri,
                &session.map(|s| s.hash().to_vec()),
                &session.map(|s| s.expires_at()),
                &account.created_at(),
                &account.updated_at(),
            ],
        )
        .await
        .map(|_| ())
        .map_err(fault)
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        let p = account.profile();
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                ACCOUNTS,
                " SET first_name = $2, last_name = $3, education_level = $4, profile_type = $5,
                      bio = $6, occupation = $7, website = $8, interests = $9,
                      organization_name = $10, avatar_uri = $11, updated_at = $12
                  WHERE id = $1"
            ),
            &[
                &account.id().inner(),
                &p.first_name,
                &p.last_name,
                &p.education_level,
                &p.profile_type,
                &p.bio,
                &p.occupation,
                &p.website,
                &p.interests,
                &p.organization_name,
                &p.avatar_uri,
                &account.updated_at(),
            ],
        )
        .await
        .map_err(fault)
        .and_then(touched)
    }

    async fn stamp(&self, id: ID<Account>, session: Option<&Session>) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                ACCOUNTS,
                " SET token_hash = $2, token_expires = $3 WHERE id = $1"
            ),
            &[
                &id.inner(),
                &session.map(|s| s.hash().to_vec()),
                &session.map(|s| s.expires_at()),
            ],
        )
        .await
        .map_err(fault)
        .and_then(touched)
    }

    async fn delete(&self, id: ID<Account>) -> Result<(), StoreError> {
        self.execute(
            const_format::concatcp!("DELETE FROM ", ACCOUNTS, " WHERE id = $1"),
            &[&id.inner()],
        )
        .await
        .map_err(fault)
        .and_then(touched)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.execute("SELECT 1", &[])
            .await
            .map(|_| ())
            .map_err(fault)
    }
}
