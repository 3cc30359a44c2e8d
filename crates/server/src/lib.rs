//! myintellectualspace HTTP backend.
//!
//! Assembles the account authority, the identity gate, and the profile and
//! meeting routes into one actix-web server.
//!
//! ## Submodules
//!
//! - [`config`] — Environment-driven process configuration
//! - [`users`] — Profile lookup, update, and deletion
//! - [`meetings`] — Video meeting join tokens

mod config;
pub mod meetings;
pub mod users;

pub use config::Config;
pub use meetings::Meetings;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::middleware::from_fn;
use actix_web::web;
use mis_auth::Account;
use mis_auth::Authority;
use mis_auth::Crypto;
use mis_auth::MemoryStore;
use mis_auth::Users;
use std::sync::Arc;

async fn health(authority: web::Data<Authority>) -> HttpResponse {
    match authority.within(authority.users().ping()).await {
        Ok(()) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("store unavailable"),
    }
}

/// Every route of the API. Expects a `web::Data<Authority>` and, for
/// meeting tokens, an optional `web::Data<Meetings>` in app data.
#[rustfmt::skip]
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(
            web::scope("/api/auth")
                .service(web::resource("/register").route(web::post().to(mis_auth::register)))
                .service(web::resource("/login").route(web::post().to(mis_auth::login)))
                .service(web::resource("/logout").route(web::post().to(mis_auth::logout)))
                .service(web::resource("/me").route(web::get().to(mis_auth::me))),
        )
        .service(
            web::scope("/api/user")
                .wrap(from_fn(mis_auth::gate))
                .service(web::resource("/me").route(web::get().to(users::me)))
                .service(web::resource("/update").route(web::post().to(users::update)))
                .service(web::resource("/delete").route(web::delete().to(users::delete)))
                .service(web::resource("/handle/{handle}").route(web::get().to(users::by_handle)))
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(users::by_id))
                        .route(web::delete().to(users::delete_by_id)),
                ),
        )
        .service(
            web::scope("/api/meetings")
                .wrap(from_fn(mis_auth::gate))
                .service(web::resource("/jwt").route(web::get().to(meetings::token))),
        );
}

/// Connects the record store and serves until the process is stopped.
pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;
    let users = match config.database.as_deref() {
        Some(url) => {
            let client = mis_database::db(url).await?;
            mis_database::migrate::<Account>(&client).await?;
            client as Arc<dyn Users>
        }
        None => {
            log::warn!("DB_URL not set, accounts are kept in memory and lost on exit");
            Arc::new(MemoryStore::default()) as Arc<dyn Users>
        }
    };
    let authority = Authority::new(users, Crypto::new(config.secret.as_bytes()), config.session)
        .with_ttl(config.ttl)
        .with_timeout(config.timeout);
    let authority = web::Data::new(authority);
    let meetings = match (&config.videosdk_key, &config.videosdk_secret) {
        (Some(key), Some(secret)) => Some(web::Data::new(Meetings::new(key, secret.as_bytes()))),
        _ => {
            log::warn!("video meeting provider not configured");
            None
        }
    };
    log::info!("starting server on {} ({} sessions)", config.bind, config.session);
    HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(authority.clone())
            .app_data(mis_auth::json_config());
        let app = match meetings.clone() {
            Some(meetings) => app.app_data(meetings),
            None => app,
        };
        app.configure(configure)
    })
    .workers(config.workers)
    .bind(&config.bind)?
    .run()
    .await?;
    Ok(())
}
