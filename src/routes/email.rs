use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::domain::user::{ChangeUserEmail, ConfirmUserEmail, RequestUserEmailConfirm};
use crate::error::{AppError, AuthorityError};
use crate::guard::ensure_same_user;
use crate::response::ok_result;
use crate::routes::require_email;
use crate::services::email;
use crate::store::db::{DbEmailConfirmStore, DbUserStore};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/email/confirm").route(web::post().to(request_confirm)))
        .service(web::resource("/email/confirm/{identifier}").route(web::post().to(confirm)))
        .service(web::resource("/{username}/email").route(web::post().to(change_email)));
}

#[derive(Deserialize)]
struct ChangeUserEmailRequest {
    new_email: Option<String>,
}

#[derive(Deserialize)]
struct RequestEmailConfirmRequest {
    email: Option<String>,
}

async fn change_email(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    path: web::Path<String>,
    payload: web::Json<ChangeUserEmailRequest>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    ensure_same_user(&auth, &username, AuthorityError::UpdateProfile)?;
    let new_email = require_email(payload.new_email.clone())?;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    ChangeUserEmail::new(&user_store)
        .execute(&username, &new_email)
        .await?;

    Ok(ok_result("E-mail has been changed."))
}

async fn request_confirm(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    payload: web::Json<RequestEmailConfirmRequest>,
) -> Result<HttpResponse, AppError> {
    let email_address = require_email(payload.email.clone())?;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let confirm_store = DbEmailConfirmStore::new(db.get_ref().clone());

    let identifier = RequestUserEmailConfirm::new(&user_store, &confirm_store)
        .execute(&email_address)
        .await?;

    email::send_async(
        &config,
        email_address,
        email::CONFIRM_REGISTRATION_SUBJECT.to_string(),
        email::email_confirm_body(&config, &identifier),
    );

    Ok(ok_result(
        "Message with confirmed registration link has been sent to the specified e-mail address.",
    ))
}

async fn confirm(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let identifier = path.into_inner();

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let confirm_store = DbEmailConfirmStore::new(db.get_ref().clone());

    ConfirmUserEmail::new(&user_store, &confirm_store)
        .execute(&identifier)
        .await?;

    Ok(ok_result(
        "Registration is confirmed by the specified identifier.",
    ))
}
