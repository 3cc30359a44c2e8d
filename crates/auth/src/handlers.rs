use super::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::error::JsonPayloadError;
use actix_web::web;

pub async fn register(
    authority: web::Data<Authority>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AuthError> {
    let (_, token) = authority.register(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(TokenResponse {
        success: "User created",
        token,
    }))
}

pub async fn login(
    authority: web::Data<Authority>,
    http: HttpRequest,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    let (_, token) = authority.login(req.into_inner(), http.peer_addr()).await?;
    Ok(HttpResponse::Ok().json(TokenResponse {
        success: "User logged in",
        token,
    }))
}

pub async fn logout(authority: web::Data<Authority>, auth: Auth) -> Result<HttpResponse, AuthError> {
    let revoked = authority.logout(auth.identity()).await?;
    Ok(HttpResponse::Ok().json(LogoutResponse {
        success: "User logged out",
        revoked,
        note: match revoked {
            true => None,
            false => Some("token remains valid until it expires"),
        },
    }))
}

pub async fn me(auth: Auth) -> HttpResponse {
    HttpResponse::Ok().json(AccountInfo::from(auth.account()))
}

/// Malformed or missing JSON bodies become validation errors instead of
/// actix's plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|e: JsonPayloadError, _: &HttpRequest| {
        AuthError::Validation(format!("invalid body: {}", e)).into()
    })
}
