//! PostgreSQL connectivity for account storage.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection from a connection URL
//! - [`migrate()`] — Creates a [`Schema`] table and its indices
//!
//! ## Table Names
//!
//! Constants for all persistent entities.
mod traits;

pub use traits::*;

use std::sync::Arc;
use tokio_postgres::Client;

/// Establishes a database connection.
///
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
/// The connection driver is spawned onto the current runtime.
pub async fn db(url: &str) -> Result<Arc<Client>, PgErr> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}

/// Creates the table described by `S` along with its indices.
pub async fn migrate<S: Schema>(client: &Client) -> Result<(), PgErr> {
    log::info!("creating table ({})", S::name());
    client.batch_execute(S::creates()).await?;
    log::info!("indexing table ({})", S::name());
    client.batch_execute(S::indices()).await
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Table for registered user accounts.
#[rustfmt::skip]
pub const ACCOUNTS:    &str = "accounts";
/// Unique constraint over account emails.
#[rustfmt::skip]
pub const EMAIL_KEY:   &str = "accounts_email_key";
/// Unique constraint over account handles.
#[rustfmt::skip]
pub const HANDLE_KEY:  &str = "accounts_handle_key";
