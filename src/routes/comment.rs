use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::domain::block_producer::{
    CommentBlockProducer, GetBlockProducerComments, GetBlockProducerCommentsNumber,
};
use crate::error::AppError;
use crate::response::ok_result;
use crate::routes::{max_length, require};
use crate::store::db::{DbBlockProducerCommentStore, DbBlockProducerStore, DbUserStore};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/comments/numbers").route(web::get().to(numbers)))
        .service(
            web::resource("/{id:\\d+}/comments")
                .route(web::put().to(comment))
                .route(web::get().to(list)),
        );
}

#[derive(Deserialize)]
struct CommentBlockProducerRequest {
    text: Option<String>,
}

async fn comment(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    path: web::Path<i32>,
    payload: web::Json<CommentBlockProducerRequest>,
) -> Result<HttpResponse, AppError> {
    let text = require(payload.text.clone(), "text")?;
    max_length(&text, "text", 200)?;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());
    let comment_store = DbBlockProducerCommentStore::new(db.get_ref().clone());

    CommentBlockProducer::new(&user_store, &bp_store, &comment_store)
        .execute(&auth.email, *path, &text)
        .await?;

    Ok(ok_result("Block producer has been commented."))
}

async fn list(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());
    let comment_store = DbBlockProducerCommentStore::new(db.get_ref().clone());

    let comments = GetBlockProducerComments::new(&user_store, &bp_store, &comment_store)
        .execute(*path)
        .await?;
    Ok(ok_result(comments))
}

async fn numbers(
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let comment_store = DbBlockProducerCommentStore::new(db.get_ref().clone());

    let counts = GetBlockProducerCommentsNumber::new(&comment_store)
        .execute()
        .await?;
    Ok(ok_result(counts))
}
