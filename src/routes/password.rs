use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::domain::user::{ChangeUserPassword, RecoverUserPassword, RequestUserPasswordRecovery};
use crate::error::AppError;
use crate::response::ok_result;
use crate::routes::{require, require_email};
use crate::services::email;
use crate::store::db::{DbPasswordRecoveryStore, DbUserStore};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/password").route(web::post().to(change_password)))
        .service(web::resource("/password/recovery").route(web::post().to(request_recovery)))
        .service(
            web::resource("/password/recovery/{identifier}").route(web::post().to(recover)),
        );
}

#[derive(Deserialize)]
struct ChangeUserPasswordRequest {
    old_password: Option<String>,
    new_password: Option<String>,
}

#[derive(Deserialize)]
struct RequestPasswordRecoveryRequest {
    email: Option<String>,
}

async fn change_password(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    payload: web::Json<ChangeUserPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let old_password = require(payload.old_password.clone(), "old_password")?;
    let new_password = require(payload.new_password.clone(), "new_password")?;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    ChangeUserPassword::new(&user_store)
        .execute(&auth.email, &old_password, &new_password)
        .await?;

    Ok(ok_result("Password has been changed."))
}

async fn request_recovery(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    payload: web::Json<RequestPasswordRecoveryRequest>,
) -> Result<HttpResponse, AppError> {
    let email_address = require_email(payload.email.clone())?;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let recovery_store = DbPasswordRecoveryStore::new(db.get_ref().clone());

    let identifier = RequestUserPasswordRecovery::new(&user_store, &recovery_store)
        .execute(&email_address)
        .await?;

    email::send_async(
        &config,
        email_address,
        email::RECOVER_PASSWORD_SUBJECT.to_string(),
        email::password_recovery_request_body(&config, &identifier),
    );

    Ok(ok_result(
        "Recovery link has been sent to the specified e-mail address.",
    ))
}

async fn recover(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let identifier = path.into_inner();

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let recovery_store = DbPasswordRecoveryStore::new(db.get_ref().clone());

    let (email_address, new_password) = RecoverUserPassword::new(&user_store, &recovery_store)
        .execute(&identifier)
        .await?;

    email::send_async(
        &config,
        email_address,
        email::RECOVER_PASSWORD_SUBJECT.to_string(),
        email::password_recovery_body(&new_password),
    );

    Ok(ok_result("New password has been sent to e-mail address."))
}
