//! Join tokens for the third-party video meeting provider.
use actix_web::HttpResponse;
use actix_web::web;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use mis_auth::Auth;
use mis_auth::AuthError;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
pub struct MeetingClaims {
    pub apikey: String,
    pub permissions: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Signs provider tokens with the provider's own secret, which is unrelated
/// to the bearer-token secret.
pub struct Meetings {
    apikey: String,
    key: EncodingKey,
    ttl: Duration,
}

impl Meetings {
    pub fn new(apikey: &str, secret: &[u8]) -> Self {
        Self {
            apikey: apikey.to_string(),
            key: EncodingKey::from_secret(secret),
            ttl: mis_core::MEETING_DURATION,
        }
    }
    pub fn claims(&self) -> MeetingClaims {
        let iat = mis_core::now();
        MeetingClaims {
            apikey: self.apikey.clone(),
            permissions: vec!["allow_join".to_string()],
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        }
    }
    pub fn sign(&self) -> Result<String, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(&Header::default(), &self.claims(), &self.key)
    }
}

pub async fn token(meetings: Option<web::Data<Meetings>>, auth: Auth) -> Result<HttpResponse, AuthError> {
    let meetings = meetings.ok_or(AuthError::Unconfigured("meeting provider"))?;
    let token = meetings.sign().map_err(|e| {
        log::error!("meeting token signing failed: {}", e);
        AuthError::Internal
    })?;
    log::debug!("meeting token issued for {}", auth.identity().id());
    Ok(HttpResponse::Ok().json(serde_json::json!({ "token": token })))
}
