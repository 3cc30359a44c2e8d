use super::*;
use mis_core::Unique;
use serde::Deserialize;
use serde::Serialize;

/// Registration body. Absent fields deserialize empty and fail validation.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub education_level: String,
    pub profile_type: String,
    pub handle: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        let required = [
            ("email", &self.email),
            ("password", &self.password),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("education_level", &self.education_level),
            ("profile_type", &self.profile_type),
            ("handle", &self.handle),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AuthError::Validation(format!("missing {}", name)));
        }
        widths(&[
            ("first_name", Some(&self.first_name), mis_core::NAME_MAX),
            ("last_name", Some(&self.last_name), mis_core::NAME_MAX),
            ("education_level", Some(&self.education_level), mis_core::NAME_MAX),
            ("profile_type", Some(&self.profile_type), mis_core::NAME_MAX),
        ])?;
        let email = normalize(&self.email);
        if email.len() > mis_core::EMAIL_MAX || !valid_email(&email) {
            return Err(AuthError::Validation("invalid email".into()));
        }
        let handle = normalize(&self.handle);
        if handle.len() < mis_core::HANDLE_MIN
            || handle.len() > mis_core::HANDLE_MAX
            || !handle
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(AuthError::Validation(format!(
                "handle must be {}-{} characters of letters, digits, '_', '.', '-'",
                mis_core::HANDLE_MIN,
                mis_core::HANDLE_MAX
            )));
        }
        Ok(())
    }
    pub fn profile(&self) -> Profile {
        Profile {
            first_name: capitalize(&self.first_name),
            last_name: capitalize(&self.last_name),
            education_level: capitalize(&self.education_level),
            profile_type: capitalize(&self.profile_type),
            ..Profile::default()
        }
    }
}

/// Rejects any present value longer than its column allows.
fn widths(fields: &[(&str, Option<&String>, usize)]) -> Result<(), AuthError> {
    match fields
        .iter()
        .find(|(_, v, max)| v.is_some_and(|v| v.chars().count() > *max))
    {
        Some((name, _, max)) => Err(AuthError::Validation(format!(
            "{} must be at most {} characters",
            name, max
        ))),
        None => Ok(()),
    }
}

fn valid_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'))
        && !email.chars().any(char::is_whitespace)
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::Validation("missing data".into()));
        }
        Ok(())
    }
}

/// Whitelisted profile changes. Anything else in the body is ignored.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub education_level: Option<String>,
    pub profile_type: Option<String>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub website: Option<String>,
    pub interests: Option<String>,
    pub organization_name: Option<String>,
}

impl ProfilePatch {
    /// Required profile fields may change but not become blank, and no
    /// field may outgrow its column.
    pub fn validate(&self) -> Result<(), AuthError> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("education_level", &self.education_level),
            ("profile_type", &self.profile_type),
        ];
        if let Some((name, _)) = required
            .iter()
            .find(|(_, v)| v.as_deref().is_some_and(|v| v.trim().is_empty()))
        {
            return Err(AuthError::Validation(format!("{} cannot be blank", name)));
        }
        widths(&[
            ("first_name", self.first_name.as_ref(), mis_core::NAME_MAX),
            ("last_name", self.last_name.as_ref(), mis_core::NAME_MAX),
            ("education_level", self.education_level.as_ref(), mis_core::NAME_MAX),
            ("profile_type", self.profile_type.as_ref(), mis_core::NAME_MAX),
            ("occupation", self.occupation.as_ref(), mis_core::NAME_MAX),
            ("bio", self.bio.as_ref(), mis_core::BIO_MAX),
            ("website", self.website.as_ref(), mis_core::LINE_MAX),
            ("interests", self.interests.as_ref(), mis_core::LINE_MAX),
            ("organization_name", self.organization_name.as_ref(), mis_core::LINE_MAX),
        ])
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub success: &'static str,
    pub token: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: &'static str,
    pub revoked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// Client-facing view of an account. Never carries the hash or session.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: String,
    pub email: String,
    pub handle: String,
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
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        let p = account.profile().clone();
        Self {
            id: account.id().to_string(),
            email: account.email().to_string(),
            handle: account.handle().to_string(),
            first_name: p.first_name,
            last_name: p.last_name,
            education_level: p.education_level,
            profile_type: p.profile_type,
            bio: p.bio,
            occupation: p.occupation,
            website: p.website,
            interests: p.interests,
            organization_name: p.organization_name,
            avatar_uri: p.avatar_uri,
            created_at: mis_core::unix(account.created_at()),
            updated_at: mis_core::unix(account.updated_at()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            email: "a@x.com".into(),
            password: "p".into(),
            first_name: "ada".into(),
            last_name: "lovelace".into(),
            education_level: "doctorate".into(),
            profile_type: "personal".into(),
            handle: "abc".into(),
        }
    }

    #[test]
    fn complete_request_validates() {
        assert!(request().validate().is_ok());
        assert_eq!(request().profile().first_name, "Ada");
        assert_eq!(request().profile().profile_type, "Personal");
    }

    #[test]
    fn each_missing_field_is_named() {
        let mut r = request();
        r.education_level = " ".into();
        match r.validate() {
            Err(AuthError::Validation(m)) => assert_eq!(m, "missing education_level"),
            _ => panic!("expected validation error"),
        }
        let mut r = request();
        r.password = String::new();
        assert!(matches!(r.validate(), Err(AuthError::Validation(_))));
    }

    #[test]
    fn bad_emails_and_handles() {
        for email in ["ax.com", "@x.com", "a@", "a b@x.com", "a@b@c"] {
            let mut r = request();
            r.email = email.into();
            assert!(r.validate().is_err(), "{}", email);
        }
        let long = "x".repeat(33);
        for handle in ["ab", "has space", "semi;colon", long.as_str()] {
            let mut r = request();
            r.handle = handle.to_string();
            assert!(r.validate().is_err(), "{}", handle);
        }
        let mut r = request();
        r.handle = "Mixed.Case_ok-1".into();
        assert!(r.validate().is_ok());
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let mut r = request();
        r.first_name = "a".repeat(mis_core::NAME_MAX + 1);
        match r.validate() {
            Err(AuthError::Validation(m)) => assert_eq!(m, "first_name must be at most 50 characters"),
            _ => panic!("expected validation error"),
        }
        let mut r = request();
        r.profile_type = "é".repeat(mis_core::NAME_MAX);
        assert!(r.validate().is_ok());
        let patch = ProfilePatch {
            bio: Some("b".repeat(mis_core::BIO_MAX + 1)),
            ..ProfilePatch::default()
        };
        assert!(matches!(patch.validate(), Err(AuthError::Validation(_))));
        let patch = ProfilePatch {
            bio: Some("b".repeat(mis_core::BIO_MAX)),
            website: Some("w".repeat(mis_core::LINE_MAX + 1)),
            ..ProfilePatch::default()
        };
        assert!(matches!(patch.validate(), Err(AuthError::Validation(m)) if m.starts_with("website")));
    }

    #[test]
    fn missing_json_fields_default_empty() {
        let r: LoginRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert!(r.validate().is_err());
        let r: LoginRequest = serde_json::from_str(r#"{"email":"a@x.com","password":"p"}"#).unwrap();
        assert!(r.validate().is_ok());
    }

    #[test]
    fn patch_ignores_protected_fields() {
        let patch: ProfilePatch = serde_json::from_str(
            r#"{"email":"evil@x.com","hashword":"x","id":"1","created_at":0,"bio":"hi"}"#,
        )
        .unwrap();
        assert_eq!(patch.bio.as_deref(), Some("hi"));
        assert!(patch.first_name.is_none());
        assert!(patch.validate().is_ok());
        let blank: ProfilePatch = serde_json::from_str(r#"{"last_name":"  "}"#).unwrap();
        assert!(matches!(blank.validate(), Err(AuthError::Validation(_))));
    }

    #[test]
    fn info_omits_secrets() {
        let account = Account::new("a@x.com", "abc", "$argon2id$secret".into(), request().profile());
        let json = serde_json::to_string(&AccountInfo::from(&account)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"handle\":\"abc\""));
    }
}
