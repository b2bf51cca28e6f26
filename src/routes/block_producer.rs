use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::domain::block_producer::{
    CreateBlockProducer, DeleteBlockProducer, GetBlockProducer, GetBlockProducers,
    GetUserLastBlockProducer, SearchBlockProducer, UpdateBlockProducer,
};
use crate::error::{AppError, AuthorityError, DomainError};
use crate::guard::ensure_block_producer_owner;
use crate::response::ok_result;
use crate::routes::{max_length, require};
use crate::services::telegram;
use crate::store::db::{DbBlockProducerStore, DbUserStore};
use crate::store::{BlockProducerPatch, BlockProducerStore, NewBlockProducer};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::put().to(create))
            .route(web::get().to(get_all)),
    )
    .service(web::resource("/search").route(web::get().to(search)))
    .service(web::resource("/last").route(web::get().to(get_last)))
    .service(
        web::resource("/{id:\\d+}")
            .route(web::get().to(get_single))
            .route(web::post().to(update))
            .route(web::delete().to(remove)),
    );
}

#[derive(Deserialize)]
struct BlockProducerInfoRequest {
    name: Option<String>,
    website_url: Option<String>,
    location: Option<String>,
    short_description: Option<String>,
    full_description: Option<String>,
    logo_url: Option<String>,
    linkedin_url: Option<String>,
    twitter_url: Option<String>,
    medium_url: Option<String>,
    github_url: Option<String>,
    facebook_url: Option<String>,
    telegram_url: Option<String>,
    reddit_url: Option<String>,
    slack_url: Option<String>,
    wikipedia_url: Option<String>,
    steemit_url: Option<String>,
}

#[derive(Deserialize)]
struct SearchQuery {
    phrase: Option<String>,
}

async fn create(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    payload: web::Json<BlockProducerInfoRequest>,
) -> Result<HttpResponse, AppError> {
    let name = require(payload.name.clone(), "name")?;
    max_length(&name, "name", 50)?;
    let website_url = require(payload.website_url.clone(), "website_url")?;
    max_length(&website_url, "website_url", 200)?;
    let short_description = require(payload.short_description.clone(), "short_description")?;
    max_length(&short_description, "short_description", 100)?;

    let info = NewBlockProducer {
        name,
        website_url,
        short_description,
        location: payload.location.clone(),
        full_description: payload.full_description.clone(),
        logo_url: payload.logo_url.clone(),
        linkedin_url: payload.linkedin_url.clone(),
        twitter_url: payload.twitter_url.clone(),
        medium_url: payload.medium_url.clone(),
        github_url: payload.github_url.clone(),
        facebook_url: payload.facebook_url.clone(),
        telegram_url: payload.telegram_url.clone(),
        reddit_url: payload.reddit_url.clone(),
        slack_url: payload.slack_url.clone(),
        wikipedia_url: payload.wikipedia_url.clone(),
        steemit_url: payload.steemit_url.clone(),
    };

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());

    CreateBlockProducer::new(&user_store, &bp_store)
        .execute(&auth.email, &info)
        .await?;

    // The create path returns no id; the freshly created record is found by
    // re-reading the owner's most recent one.
    if let Ok(last) = GetUserLastBlockProducer::new(&user_store, &bp_store)
        .execute(&auth.email)
        .await
    {
        telegram::notify_block_producer_creation_async(&config, last.id);
    }

    Ok(ok_result("Block producer has been created."))
}

async fn get_all(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());

    let block_producers = GetBlockProducers::new(&bp_store).execute().await?;
    Ok(ok_result(block_producers))
}

async fn search(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let phrase = query.phrase.clone().unwrap_or_default();
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());

    let block_producers = SearchBlockProducer::new(&bp_store).execute(&phrase).await?;
    Ok(ok_result(block_producers))
}

async fn get_last(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
) -> Result<HttpResponse, AppError> {
    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());

    let last = GetUserLastBlockProducer::new(&user_store, &bp_store)
        .execute(&auth.email)
        .await?;
    Ok(ok_result(last))
}

async fn get_single(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());

    let block_producer = GetBlockProducer::new(&bp_store).execute(*path).await?;
    Ok(ok_result(block_producer))
}

async fn update(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    path: web::Path<i32>,
    payload: web::Json<BlockProducerInfoRequest>,
) -> Result<HttpResponse, AppError> {
    let block_producer_id = *path;

    if let Some(name) = &payload.name {
        max_length(name, "name", 50)?;
    }
    if let Some(website_url) = &payload.website_url {
        max_length(website_url, "website_url", 200)?;
    }
    if let Some(short_description) = &payload.short_description {
        max_length(short_description, "short_description", 100)?;
    }

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());

    let target = bp_store
        .get(block_producer_id)
        .await?
        .ok_or(DomainError::BlockProducerDoesNotExist)?;
    ensure_block_producer_owner(&auth, &target, AuthorityError::UpdateBlockProducer)?;

    let patch = BlockProducerPatch {
        name: payload.name.clone(),
        website_url: payload.website_url.clone(),
        short_description: payload.short_description.clone(),
        location: payload.location.clone(),
        full_description: payload.full_description.clone(),
        logo_url: payload.logo_url.clone(),
        linkedin_url: payload.linkedin_url.clone(),
        twitter_url: payload.twitter_url.clone(),
        medium_url: payload.medium_url.clone(),
        github_url: payload.github_url.clone(),
        facebook_url: payload.facebook_url.clone(),
        telegram_url: payload.telegram_url.clone(),
        reddit_url: payload.reddit_url.clone(),
        slack_url: payload.slack_url.clone(),
        wikipedia_url: payload.wikipedia_url.clone(),
        steemit_url: payload.steemit_url.clone(),
    };

    UpdateBlockProducer::new(&user_store, &bp_store)
        .execute(&auth.email, block_producer_id, &patch)
        .await?;

    telegram::notify_block_producer_update_async(&config, block_producer_id);

    Ok(ok_result("Block producer has been updated."))
}

async fn remove(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let block_producer_id = *path;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());

    let target = bp_store
        .get(block_producer_id)
        .await?
        .ok_or(DomainError::BlockProducerDoesNotExist)?;
    ensure_block_producer_owner(&auth, &target, AuthorityError::DeleteBlockProducer)?;

    DeleteBlockProducer::new(&user_store, &bp_store)
        .execute(&auth.email, block_producer_id)
        .await?;

    Ok(ok_result("Block producer has been deleted."))
}
