use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::domain::user::RegisterUser;
use crate::error::AppError;
use crate::response::ok_result;
use crate::routes::{max_length, require, require_email};
use crate::store::db::DbUserStore;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/registration").route(web::post().to(register)));
}

#[derive(Deserialize)]
struct RegisterUserRequest {
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

async fn register(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    payload: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    let email = require_email(payload.email.clone())?;
    let username = require(payload.username.clone(), "username")?;
    max_length(&username, "username", 25)?;
    let password = require(payload.password.clone(), "password")?;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    RegisterUser::new(&user_store)
        .by_credentials(&email, &username, &password)
        .await?;

    Ok(ok_result("User has been created."))
}
