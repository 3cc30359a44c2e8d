//! Profile routes. Every handler here sits behind the identity gate.
use actix_web::HttpResponse;
use actix_web::web;
use mis_auth::*;
use mis_core::ID;
use mis_core::Unique;

pub async fn me(auth: Auth) -> HttpResponse {
    HttpResponse::Ok().json(AccountInfo::from(auth.account()))
}

pub async fn by_handle(
    authority: web::Data<Authority>,
    path: web::Path<String>,
) -> Result<HttpResponse, AuthError> {
    let handle = normalize(&path.into_inner());
    authority
        .within(authority.users().find_by_handle(&handle))
        .await?
        .map(|account| HttpResponse::Ok().json(AccountInfo::from(&account)))
        .ok_or(AuthError::NotFound("user"))
}

pub async fn by_id(
    authority: web::Data<Authority>,
    path: web::Path<String>,
) -> Result<HttpResponse, AuthError> {
    let id = parse(&path)?;
    authority
        .within(authority.users().find_by_id(id))
        .await?
        .map(|account| HttpResponse::Ok().json(AccountInfo::from(&account)))
        .ok_or(AuthError::NotFound("user"))
}

/// Only whitelisted profile fields are applied. Email, password, session
/// and timestamps in the body are ignored.
pub async fn update(
    authority: web::Data<Authority>,
    auth: Auth,
    patch: web::Json<ProfilePatch>,
) -> Result<HttpResponse, AuthError> {
    let patch = patch.into_inner();
    patch.validate()?;
    let mut account = auth.0.into_inner();
    account.revise(patch);
    authority.within(authority.users().update(&account)).await?;
    log::info!("{} updated profile", account.id());
    Ok(HttpResponse::Ok().json(AccountInfo::from(&account)))
}

/// Deletes the caller's own account.
pub async fn delete(authority: web::Data<Authority>, auth: Auth) -> Result<HttpResponse, AuthError> {
    remove(&authority, auth.identity().id()).await
}

/// Deletes an account by id, permitted only to its owner.
pub async fn delete_by_id(
    authority: web::Data<Authority>,
    auth: Auth,
    path: web::Path<String>,
) -> Result<HttpResponse, AuthError> {
    let id = parse(&path)?;
    if id != auth.identity().id() {
        log::warn!("{} attempted to delete {}", auth.identity().id(), id);
        return Err(AuthError::NotAuthorized("delete this account"));
    }
    remove(&authority, id).await
}

async fn remove(authority: &Authority, id: ID<Account>) -> Result<HttpResponse, AuthError> {
    authority.within(authority.users().delete(id)).await?;
    log::info!(target: "access", "{} deleted", id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": "User deleted" })))
}

fn parse(raw: &str) -> Result<ID<Account>, AuthError> {
    raw.parse()
        .map_err(|_| AuthError::Validation("invalid user id".into()))
}
