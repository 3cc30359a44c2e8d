//! Account authentication and session identity for a social backend.
//!
//! This facade crate re-exports the workspace crates for convenient access.
//!
//! ## Crate Organization
//!
//! - [`core`] — Typed IDs, constants, and runtime utilities
//! - [`database`] — PostgreSQL connectivity and schema
//! - [`auth`] — Hashing, tokens, identity resolution, and the request gate
//! - [`server`] — Configuration and the actix-web backend

pub use mis_core        as core;
pub use mis_database    as database;
pub use mis_auth        as auth;
#[cfg(feature = "server")]
pub use mis_server      as server;

// Re-export commonly used types at the root
pub use mis_core::*;
