/// Uniquely constrained account fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Email,
    Handle,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Handle => write!(f, "handle"),
        }
    }
}

/// Outcomes of a record-store call other than success.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("{0} already in use")]
    Conflict(Field),
    #[error("store call timed out")]
    Timeout,
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Reasons a presented token does not decode. Callers see all of them as
/// [`AuthError::InvalidToken`]; the distinction is kept for logs.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token signature mismatch")]
    Signature,
    #[error("malformed token")]
    Malformed,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Every failure a client can observe. Each variant has a stable
/// machine-readable [`kind`](AuthError::kind) and a human message that
/// never carries internal detail.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} already in use")]
    Conflict(Field),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing authorization header")]
    MissingHeader,
    #[error("invalid authorization format")]
    MalformedHeader,
    #[error("missing bearer credential")]
    EmptyCredential,
    #[error("invalid token")]
    InvalidToken,
    #[error("not authorized to {0}")]
    NotAuthorized(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("service temporarily unavailable")]
    StoreUnavailable,
    #[error("{0} is not configured")]
    Unconfigured(&'static str),
    #[error("internal error")]
    Internal,
}

impl AuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::InvalidCredentials => "invalid_credentials",
            Self::MissingHeader => "missing_header",
            Self::MalformedHeader => "malformed_header",
            Self::EmptyCredential => "empty_credential",
            Self::InvalidToken => "invalid_token",
            Self::NotAuthorized(_) => "not_authorized",
            Self::NotFound(_) => "not_found",
            Self::StoreUnavailable => "store_unavailable",
            Self::Unconfigured(_) => "unconfigured",
            Self::Internal => "internal",
        }
    }
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Conflict(_) => 400,
            Self::InvalidCredentials
            | Self::MissingHeader
            | Self::MalformedHeader
            | Self::EmptyCredential
            | Self::InvalidToken => 401,
            Self::NotAuthorized(_) => 403,
            Self::NotFound(_) => 404,
            Self::Internal => 500,
            Self::StoreUnavailable | Self::Unconfigured(_) => 503,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(field) => Self::Conflict(field),
            StoreError::NotFound => Self::NotFound("account"),
            StoreError::Timeout | StoreError::Backend(_) => {
                log::error!("record store unavailable: {}", e);
                Self::StoreUnavailable
            }
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Encoding(_) => {
                log::error!("{}", e);
                Self::Internal
            }
            _ => Self::InvalidToken,
        }
    }
}

#[cfg(feature = "server")]
mod response {
    use super::*;
    use actix_web::HttpResponse;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    impl ResponseError for AuthError {
        fn status_code(&self) -> StatusCode {
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        fn error_response(&self) -> HttpResponse {
            HttpResponse::build(self.status_code()).json(serde_json::json!({
                "error": self.to_string(),
                "kind": self.kind(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_hide_detail() {
        let e = AuthError::from(StoreError::Backend("connection refused at 10.0.0.3".into()));
        assert_eq!(e.kind(), "store_unavailable");
        assert_eq!(e.status(), 503);
        assert!(!e.to_string().contains("10.0.0.3"));
        assert_eq!(AuthError::from(StoreError::Timeout).kind(), "store_unavailable");
    }

    #[test]
    fn conflicts_name_the_field() {
        let e = AuthError::from(StoreError::Conflict(Field::Handle));
        assert_eq!(e.to_string(), "handle already in use");
        assert_eq!(e.status(), 400);
    }

    #[test]
    fn token_failures_collapse() {
        for e in [TokenError::Expired, TokenError::Signature, TokenError::Malformed] {
            let e = AuthError::from(e);
            assert_eq!(e.kind(), "invalid_token");
            assert_eq!(e.status(), 401);
        }
        assert_eq!(AuthError::from(TokenError::Encoding("x".into())).status(), 500);
    }

    #[test]
    fn header_rejections_are_distinct_but_unauthorized() {
        let kinds = [
            AuthError::MissingHeader,
            AuthError::MalformedHeader,
            AuthError::EmptyCredential,
        ]
        .map(|e| (e.kind(), e.status()));
        assert_eq!(kinds[0], ("missing_header", 401));
        assert_eq!(kinds[1], ("malformed_header", 401));
        assert_eq!(kinds[2], ("empty_credential", 401));
    }
}
