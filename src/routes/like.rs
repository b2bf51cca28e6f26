use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::domain::block_producer::{
    GetBlockProducerLikes, GetBlockProducerLikesNumber, LikeBlockProducer,
};
use crate::error::AppError;
use crate::response::ok_result;
use crate::store::db::{DbBlockProducerLikeStore, DbBlockProducerStore, DbUserStore};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/likes/numbers").route(web::get().to(numbers)))
        .service(
            web::resource("/{id:\\d+}/likes")
                .route(web::put().to(toggle))
                .route(web::get().to(list)),
        );
}

async fn toggle(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());
    let like_store = DbBlockProducerLikeStore::new(db.get_ref().clone());

    LikeBlockProducer::new(&user_store, &bp_store, &like_store)
        .execute(&auth.email, *path)
        .await?;

    Ok(ok_result("Block producer liking has been handled."))
}

async fn list(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());
    let like_store = DbBlockProducerLikeStore::new(db.get_ref().clone());

    let likes = GetBlockProducerLikes::new(&user_store, &bp_store, &like_store)
        .execute(*path)
        .await?;
    Ok(ok_result(likes))
}

async fn numbers(
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let like_store = DbBlockProducerLikeStore::new(db.get_ref().clone());

    let counts = GetBlockProducerLikesNumber::new(&like_store).execute().await?;
    Ok(ok_result(counts))
}
