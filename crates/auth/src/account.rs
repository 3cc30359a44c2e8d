use super::*;
use mis_core::ID;
use mis_core::Unique;
use std::time::SystemTime;

/// Free-form profile attributes. None of these are identity-bearing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub education_level: String,
    pub profile_type: String,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub website: Option<String>,
    pub interests: Option<String>,
    pub organization_name: Option<String>,
    pub avatar_uri: Option<String>,
}

/// Registered user record.
///
/// `email` and `handle` are lower-cased on construction and never change
/// afterwards. `hashword` is an Argon2 PHC string and is never serialised
/// toward clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub(crate) id: ID<Self>,
    pub(crate) email: String,
    pub(crate) handle: String,
    pub(crate) hashword: String,
    pub(crate) profile: Profile,
    pub(crate) session: Option<Session>,
    pub(crate) created: SystemTime,
    pub(crate) updated: SystemTime,
}

impl Account {
    pub fn new(email: &str, handle: &str, hashword: String, profile: Profile) -> Self {
        let now = SystemTime::now();
        Self {
            id: ID::default(),
            email: normalize(email),
            handle: normalize(handle),
            hashword,
            profile,
            session: None,
            created: now,
            updated: now,
        }
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn handle(&self) -> &str {
        &self.handle
    }
    pub fn hashword(&self) -> &str {
        &self.hashword
    }
    pub fn profile(&self) -> &Profile {
        &self.profile
    }
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
    pub fn created_at(&self) -> SystemTime {
        self.created
    }
    pub fn updated_at(&self) -> SystemTime {
        self.updated
    }
    /// Applies whitelisted profile changes and bumps `updated_at`.
    pub fn revise(&mut self, patch: ProfilePatch) {
        let p = &mut self.profile;
        if let Some(v) = patch.first_name {
            p.first_name = capitalize(&v);
        }
        if let Some(v) = patch.last_name {
            p.last_name = capitalize(&v);
        }
        if let Some(v) = patch.education_level {
            p.education_level = capitalize(&v);
        }
        if let Some(v) = patch.profile_type {
            p.profile_type = capitalize(&v);
        }
        p.bio = patch.bio.or(p.bio.take());
        p.occupation = patch.occupation.or(p.occupation.take());
        p.website = patch.website.or(p.website.take());
        p.interests = patch.interests.or(p.interests.take());
        p.organization_name = patch.organization_name.or(p.organization_name.take());
        self.updated = SystemTime::now();
    }
    pub(crate) fn sign_in(&mut self, session: Session) {
        self.session = Some(session);
    }
}

impl Unique for Account {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// Case-normalized form of an email or handle.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// First letter upper-cased, remainder lower-cased.
pub fn capitalize(s: &str) -> String {
    let s = s.trim();
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use mis_database::*;

    /// Session columns are nullable: they are only populated in stored mode.
    impl Schema for Account {
        fn name() -> &'static str {
            ACCOUNTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                ACCOUNTS,
                " (
                    id                UUID PRIMARY KEY,
                    email             VARCHAR(120) NOT NULL,
                    handle            VARCHAR(32)  NOT NULL,
                    hashword          TEXT         NOT NULL,
                    first_name        VARCHAR(50)  NOT NULL,
                    last_name         VARCHAR(50)  NOT NULL,
                    education_level   VARCHAR(50)  NOT NULL,
                    profile_type      VARCHAR(50)  NOT NULL,
                    bio               VARCHAR(500),
                    occupation        VARCHAR(50),
                    website           VARCHAR(120),
                    interests         VARCHAR(120),
                    organization_name VARCHAR(120),
                    avatar_uri        TEXT,
                    token_hash        BYTEA,
                    token_expires     TIMESTAMPTZ,
                    created_at        TIMESTAMPTZ  NOT NULL,
                    updated_at        TIMESTAMPTZ  NOT NULL,
                    CONSTRAINT ",
                EMAIL_KEY,
                " UNIQUE (email),
                    CONSTRAINT ",
                HANDLE_KEY,
                " UNIQUE (handle)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_accounts_created ON ",
                ACCOUNTS,
                " (created_at);"
            )
        }
    }
}
