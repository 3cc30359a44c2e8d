//! Core identifiers, constants, and runtime utilities for myintellectualspace.
//!
//! This crate provides the foundational types and configuration parameters
//! shared by the store, authentication, and server crates.

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;
use std::str::FromStr;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

/// Path segments and token subjects arrive as text.
impl<T> FromStr for ID<T> {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self::from)
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// SESSION PARAMETERS
// ============================================================================
/// Lifetime of an issued bearer token.
pub const TOKEN_DURATION: std::time::Duration = std::time::Duration::from_secs(24 * 3600);
/// Lifetime of a third-party meeting token.
pub const MEETING_DURATION: std::time::Duration = std::time::Duration::from_secs(24 * 3600);
/// Upper bound on any single record-store call.
pub const STORE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

// ============================================================================
// ACCOUNT PARAMETERS
// ============================================================================
/// Shortest accepted public handle.
pub const HANDLE_MIN: usize = 3;
/// Longest accepted public handle.
pub const HANDLE_MAX: usize = 32;
/// Longest accepted email address.
pub const EMAIL_MAX: usize = 120;
/// Longest accepted name, education level, profile type, or occupation.
pub const NAME_MAX: usize = 50;
/// Longest accepted biography.
pub const BIO_MAX: usize = 500;
/// Longest accepted website, interests, or organization name.
pub const LINE_MAX: usize = 120;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Seconds since the unix epoch. Clocks set before 1970 read as zero.
pub fn unix(time: std::time::SystemTime) -> i64 {
    time.duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Seconds since the unix epoch, now.
pub fn now() -> i64 {
    unix(std::time::SystemTime::now())
}

/// Parse duration string like "30s", "5m", "2h", "1d" into Duration.
pub fn parse_duration(s: &str) -> Option<std::time::Duration> {
    let s = s.trim();
    let (num, unit) = s.split_at(s.len().saturating_sub(1));
    let value: u64 = num.parse().ok()?;
    match unit {
        "s" => Some(std::time::Duration::from_secs(value)),
        "m" => Some(std::time::Duration::from_secs(value * 60)),
        "h" => Some(std::time::Duration::from_secs(value * 3600)),
        "d" => Some(std::time::Duration::from_secs(value * 86400)),
        _ => None,
    }
}

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Error)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", now())).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("30s"), Some(std::time::Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Some(std::time::Duration::from_secs(300)));
        assert_eq!(parse_duration(" 24h "), Some(TOKEN_DURATION));
        assert_eq!(parse_duration("1d"), Some(std::time::Duration::from_secs(86400)));
        assert_eq!(parse_duration("1w"), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn id_text_roundtrip() {
        let id = ID::<Thing>::default();
        assert_eq!(id, id.to_string().parse::<ID<Thing>>().unwrap());
        assert!("not-a-uuid".parse::<ID<Thing>>().is_err());
    }

    #[test]
    fn epoch_clamps() {
        let before = std::time::UNIX_EPOCH - std::time::Duration::from_secs(10);
        assert_eq!(unix(before), 0);
        assert!(now() > 0);
    }
}
