use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::domain::user::{GetUserProfile, UpdateUserProfile};
use crate::error::AppError;
use crate::response::ok_result;
use crate::store::db::{DbProfileStore, DbUserStore};
use crate::store::ProfilePatch;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/profile").route(web::post().to(update_profile)))
        .service(web::resource("/{username}/profile").route(web::get().to(get_profile)));
}

#[derive(Deserialize)]
struct UpdateProfileRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    location: Option<String>,
    avatar_url: Option<String>,
    additional_information: Option<String>,
    website_url: Option<String>,
    linkedin_url: Option<String>,
    twitter_url: Option<String>,
    medium_url: Option<String>,
    github_url: Option<String>,
    facebook_url: Option<String>,
    telegram_url: Option<String>,
    steemit_url: Option<String>,
}

async fn update_profile(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let patch = ProfilePatch {
        first_name: payload.first_name.clone(),
        last_name: payload.last_name.clone(),
        location: payload.location.clone(),
        avatar_url: payload.avatar_url.clone(),
        additional_information: payload.additional_information.clone(),
        website_url: payload.website_url.clone(),
        linkedin_url: payload.linkedin_url.clone(),
        twitter_url: payload.twitter_url.clone(),
        medium_url: payload.medium_url.clone(),
        github_url: payload.github_url.clone(),
        facebook_url: payload.facebook_url.clone(),
        telegram_url: payload.telegram_url.clone(),
        steemit_url: payload.steemit_url.clone(),
    };

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let profile_store = DbProfileStore::new(db.get_ref().clone());

    UpdateUserProfile::new(&user_store, &profile_store)
        .execute(&auth.email, &patch)
        .await?;

    Ok(ok_result("User profile has been updated."))
}

async fn get_profile(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let profile_store = DbProfileStore::new(db.get_ref().clone());

    let profile = GetUserProfile::new(&user_store, &profile_store)
        .execute(&username)
        .await?;

    Ok(ok_result(profile))
}
