use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use sea_orm::DatabaseConnection;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::domain::block_producer::UpdateBlockProducer;
use crate::domain::user::UpdateUserProfile;
use crate::error::{AppError, AuthorityError, DomainError};
use crate::guard::{ensure_block_producer_owner, ensure_same_user};
use crate::response::ok_result;
use crate::services::storage;
use crate::store::db::{DbBlockProducerStore, DbProfileStore, DbUserStore};
use crate::store::{BlockProducerPatch, BlockProducerStore, ProfilePatch};

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{username}/avatar").route(web::post().to(upload_user_avatar)));
}

pub fn block_producer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{id:\\d+}/avatar").route(web::post().to(upload_block_producer_avatar)),
    );
}

async fn upload_user_avatar(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    ensure_same_user(&auth, &username, AuthorityError::UpdateProfile)?;

    let (data, content_type) = read_image_field(payload).await?;
    let key = format!("avatars/user/{}", auth.user_id);
    let url = storage::upload(&config.storage, &key, data, &content_type).await?;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let profile_store = DbProfileStore::new(db.get_ref().clone());
    UpdateUserProfile::new(&user_store, &profile_store)
        .execute(
            &auth.email,
            &ProfilePatch {
                avatar_url: Some(url),
                ..Default::default()
            },
        )
        .await?;

    Ok(ok_result("User avatar has been uploaded."))
}

async fn upload_block_producer_avatar(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    path: web::Path<i32>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let block_producer_id = *path;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());

    let target = bp_store
        .get(block_producer_id)
        .await?
        .ok_or(DomainError::BlockProducerDoesNotExist)?;
    ensure_block_producer_owner(&auth, &target, AuthorityError::UpdateBlockProducer)?;

    let (data, content_type) = read_image_field(payload).await?;
    let key = format!("avatars/block-producer/{}", block_producer_id);
    let url = storage::upload(&config.storage, &key, data, &content_type).await?;

    UpdateBlockProducer::new(&user_store, &bp_store)
        .execute(
            &auth.email,
            block_producer_id,
            &BlockProducerPatch {
                logo_url: Some(url),
                ..Default::default()
            },
        )
        .await?;

    Ok(ok_result("Block producer avatar has been uploaded."))
}

async fn read_image_field(mut payload: Multipart) -> Result<(Vec<u8>, String), AppError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|_| AppError::validation("Upload is not valid."))?;
        if field.name() != "file" {
            continue;
        }
        let filename = field
            .content_disposition()
            .get_filename()
            .map(|s| s.to_string())
            .unwrap_or_default();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|_| AppError::validation("Upload is not valid."))?;
            data.extend_from_slice(&chunk);
        }
        if data.is_empty() {
            break;
        }

        let content_type = infer::get(&data)
            .map(|kind| kind.mime_type().to_string())
            .or_else(|| {
                mime_guess::from_path(&filename)
                    .first()
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());
        if !content_type.starts_with("image/") {
            return Err(AppError::validation("File must be an image."));
        }
        return Ok((data, content_type));
    }
    Err(AppError::validation("Field file is required."))
}
