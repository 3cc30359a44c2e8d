//! Backend Binary
//!
//! Serves the account, profile, and meeting API.
//! Configured from the environment (see `backend --help`).

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mis_core::log();
    mis_core::kys();
    mis_server::run(mis_server::Config::parse()).await
}
