use super::*;
use mis_core::ID;

/// HS256 token codec keyed by the server secret.
pub struct Crypto {
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
    validation: jsonwebtoken::Validation,
}

impl Crypto {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: jsonwebtoken::EncodingKey::from_secret(secret),
            decoding: jsonwebtoken::DecodingKey::from_secret(secret),
            validation,
        }
    }
    /// Signs fresh claims for `user` valid for `ttl`.
    pub fn issue(
        &self,
        user: ID<Account>,
        email: &str,
        ttl: std::time::Duration,
    ) -> Result<(String, Claims), TokenError> {
        let claims = Claims::new(user, email.to_string(), ttl);
        self.encode(&claims).map(|token| (token, claims))
    }
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            claims,
            &self.encoding,
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))
    }
    /// Signature is verified before expiry, so a forged token never
    /// reports as merely expired.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        use jsonwebtoken::errors::ErrorKind;
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::Signature,
                _ => TokenError::Malformed,
            })
    }
    /// SHA-256 fingerprint of a token, the only form a server-side session keeps.
    pub fn hash(token: &str) -> Vec<u8> {
        use sha2::Digest;
        sha2::Sha256::digest(token.as_bytes()).to_vec()
    }
    /// Constant-time fingerprint comparison.
    pub fn matches(fingerprint: &[u8], token: &str) -> bool {
        let ref presented = Self::hash(token);
        fingerprint.len() == presented.len()
            && fingerprint
                .iter()
                .zip(presented.iter())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

/// Last few characters of a token, safe to log.
pub fn suffix(token: &str) -> &str {
    let cut = token
        .char_indices()
        .rev()
        .nth(4)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &token[cut..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crypto() -> Crypto {
        Crypto::new(b"test secret")
    }

    #[test]
    fn issued_token_decodes_to_subject() {
        let user = ID::default();
        let (token, issued) = crypto()
            .issue(user, "a@x.com", mis_core::TOKEN_DURATION)
            .unwrap();
        let claims = crypto().decode(&token).unwrap();
        assert_eq!(claims.user(), user);
        assert_eq!(claims.email(), "a@x.com");
        assert_eq!(claims, issued);
    }

    #[test]
    fn expired_token_is_expired_not_forged() {
        let mut claims = Claims::new(ID::default(), "a@x.com".into(), mis_core::TOKEN_DURATION);
        claims.iat -= 100;
        claims.exp = claims.iat + 10;
        let token = crypto().encode(&claims).unwrap();
        assert!(matches!(crypto().decode(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn foreign_key_is_rejected() {
        let (token, _) = Crypto::new(b"someone else")
            .issue(ID::default(), "a@x.com", mis_core::TOKEN_DURATION)
            .unwrap();
        assert!(matches!(crypto().decode(&token), Err(TokenError::Signature)));
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let (genuine, _) = crypto()
            .issue(ID::default(), "a@x.com", mis_core::TOKEN_DURATION)
            .unwrap();
        let (other, _) = crypto()
            .issue(ID::default(), "b@x.com", mis_core::TOKEN_DURATION)
            .unwrap();
        let signature = genuine.rsplit('.').next().unwrap();
        let (payload, _) = other.rsplit_once('.').unwrap();
        let forged = format!("{}.{}", payload, signature);
        assert!(matches!(crypto().decode(&forged), Err(TokenError::Signature)));
    }

    #[test]
    fn garbage_is_malformed() {
        for token in ["", "abc", "a.b.c", "Bearer x"] {
            assert!(matches!(crypto().decode(token), Err(TokenError::Malformed)));
        }
    }

    #[test]
    fn fingerprints_match_only_their_token() {
        let fingerprint = Crypto::hash("one");
        assert!(Crypto::matches(&fingerprint, "one"));
        assert!(!Crypto::matches(&fingerprint, "two"));
        assert!(!Crypto::matches(&[], "one"));
    }

    #[test]
    fn suffix_is_short() {
        assert_eq!(suffix("abcdefghij"), "fghij");
        assert_eq!(suffix("abc"), "abc");
        assert_eq!(suffix(""), "");
    }
}
