/// How issued tokens are validated. Chosen once per deployment.
///
/// - `Stateless`: the signed token is the whole credential. Logout cannot
///   revoke it; it stays valid until its `exp` passes.
/// - `Stored`: the account additionally keeps the fingerprint and expiry of
///   its latest token. A token is honoured only while it matches. Logout
///   clears the record, and each login replaces it (last login wins).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionMode {
    #[default]
    Stateless,
    Stored,
}

impl std::str::FromStr for SessionMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stateless" => Ok(Self::Stateless),
            "stored" => Ok(Self::Stored),
            other => Err(format!("unknown session mode {:?} (stateless | stored)", other)),
        }
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stateless => write!(f, "stateless"),
            Self::Stored => write!(f, "stored"),
        }
    }
}
