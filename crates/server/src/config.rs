use clap::Parser;
use mis_auth::SessionMode;
use std::time::Duration;

/// Process configuration. Every option can come from the environment.
///
/// Deliberately not `Debug`: two fields are signing secrets.
#[derive(Parser, Clone)]
#[command(author, version, about = "myintellectualspace backend", long_about = None)]
pub struct Config {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8888")]
    pub bind: String,
    /// PostgreSQL connection URL. Accounts are kept in memory when absent.
    #[arg(long = "db-url", env = "DB_URL", hide_env_values = true)]
    pub database: Option<String>,
    /// HS256 signing secret for bearer tokens.
    #[arg(long = "jwt-secret", env = "JWT_SECRET", hide_env_values = true)]
    pub secret: String,
    #[arg(long = "session-mode", env = "SESSION_MODE", default_value = "stateless")]
    pub session: SessionMode,
    #[arg(long = "token-ttl", env = "TOKEN_TTL", default_value = "24h", value_parser = duration)]
    pub ttl: Duration,
    #[arg(long = "store-timeout", env = "STORE_TIMEOUT", default_value = "5s", value_parser = duration)]
    pub timeout: Duration,
    #[arg(long, env = "WORKERS", default_value_t = 6)]
    pub workers: usize,
    #[arg(long = "videosdk-api-key", env = "VIDEOSDK_API_KEY")]
    pub videosdk_key: Option<String>,
    #[arg(long = "videosdk-api-secret", env = "VIDEOSDK_API_SECRET", hide_env_values = true)]
    pub videosdk_secret: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        if self.ttl.is_zero() {
            anyhow::bail!("TOKEN_TTL must be positive");
        }
        if self.timeout.is_zero() {
            anyhow::bail!("STORE_TIMEOUT must be positive");
        }
        if self.workers == 0 {
            anyhow::bail!("WORKERS must be positive");
        }
        if self.videosdk_key.is_some() != self.videosdk_secret.is_some() {
            anyhow::bail!("VIDEOSDK_API_KEY and VIDEOSDK_API_SECRET must be set together");
        }
        Ok(())
    }
}

fn duration(s: &str) -> Result<Duration, String> {
    mis_core::parse_duration(s).ok_or_else(|| format!("invalid duration {:?} (e.g. 30s, 5m, 2h, 1d)", s))
}
