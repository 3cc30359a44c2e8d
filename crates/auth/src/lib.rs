//! Accounts, credentials, and request identity.
//!
//! Argon2 password hashing, HS256 bearer tokens, and a gate that resolves
//! every protected request to exactly one account before any handler runs.
//!
//! ## Records
//!
//! - [`Account`] — Registered user with profile and optional session
//! - [`Session`] — Fingerprint of the one live token in stored mode
//! - [`Users`] — Record store seam ([`MemoryStore`], or Postgres with `database`)
//!
//! ## Security
//!
//! - [`Crypto`] — Token signing and verification
//! - [`Claims`] — Token payload
//! - [`password`] — Argon2 hashing and verification
//! - [`Resolver`] — Token to [`Identity`]
//! - [`Authority`] — Register, login, logout
//!
//! With `server`, [`gate`] and the [`Auth`] extractor enforce identity on
//! actix routes, and the handlers expose the `/auth` endpoints.
mod account;
mod authority;
mod claims;
mod crypto;
mod dto;
mod error;
mod header;
mod identity;
mod mode;
pub mod password;
mod session;
mod store;

pub use account::*;
pub use authority::*;
pub use claims::*;
pub use crypto::*;
pub use dto::*;
pub use error::*;
pub use header::*;
pub use identity::*;
pub use mode::*;
pub use session::*;
pub use store::*;

#[cfg(feature = "database")]
mod repository;
#[cfg(feature = "database")]
pub use repository::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;
