use super::*;
use actix_web::FromRequest;
use actix_web::HttpMessage;
use actix_web::HttpRequest;
use actix_web::body::EitherBody;
use actix_web::body::MessageBody;
use actix_web::dev::Payload;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::web;
use std::future::Future;
use std::pin::Pin;

/// Resolves the caller of `req` or rejects it.
///
/// The resolved [`Identity`] is cached in the request extensions, so the
/// scope [`gate`] and any [`Auth`] extractors behind it cost one store read
/// per request in total. Nothing is written anywhere.
pub async fn require(req: &HttpRequest) -> Result<Identity, AuthError> {
    if let Some(identity) = req.extensions().get::<Identity>().cloned() {
        return Ok(identity);
    }
    let authority = req
        .app_data::<web::Data<Authority>>()
        .cloned()
        .ok_or_else(|| {
            log::error!("authority not registered as app data");
            AuthError::Internal
        })?;
    let value = req.headers().get(header::AUTHORIZATION);
    let value = match value {
        Some(v) => Some(v.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };
    let token = bearer(value)?.to_string();
    let account = authority
        .resolver()
        .resolve(&token)
        .await?
        .ok_or(AuthError::InvalidToken)?;
    let identity = Identity::from(account);
    req.extensions_mut().insert(identity.clone());
    Ok(identity)
}

/// Scope middleware: every request is resolved before the inner service
/// runs, and rejected requests never reach it.
///
/// ```ignore
/// web::scope("/api/user").wrap(from_fn(mis_auth::gate))
/// ```
pub async fn gate<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error>
where
    B: MessageBody + 'static,
{
    let outcome = require(req.request()).await;
    match outcome {
        Ok(_) => next.call(req).await.map(ServiceResponse::map_into_left_body),
        Err(e) => {
            log::debug!("gate rejected {} {}: {}", req.method(), req.path(), e.kind());
            Ok(req.error_response(e).map_into_right_body())
        }
    }
}

/// Extractor for authenticated requests.
pub struct Auth(pub Identity);

impl Auth {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
    pub fn account(&self) -> &Account {
        self.0.account()
    }
}

impl FromRequest for Auth {
    type Error = AuthError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { require(&req).await.map(Auth) })
    }
}
