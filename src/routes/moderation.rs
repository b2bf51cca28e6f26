use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::error::{AppError, AuthorityError, DomainError};
use crate::response::ok_result;
use crate::routes::require;
use crate::store::db::DbBlockProducerStore;
use crate::store::BlockProducerStore;

// Status transitions are administrative; they write through the store
// directly instead of the owner-scoped use cases.
const STATUSES: [&str; 3] = ["moderation", "declined", "active"];

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{id:\\d+}/status").route(web::post().to(set_status)));
}

#[derive(Deserialize)]
struct SetStatusRequest {
    status: Option<String>,
    description: Option<String>,
}

async fn set_status(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    path: web::Path<i32>,
    payload: web::Json<SetStatusRequest>,
) -> Result<HttpResponse, AppError> {
    if !auth.is_staff {
        return Err(AuthorityError::ModerateBlockProducer.into());
    }

    let status = require(payload.status.clone(), "status")?;
    if !STATUSES.contains(&status.as_str()) {
        return Err(AppError::validation(
            "Status must be one of: moderation, declined, active.",
        ));
    }

    let bp_store = DbBlockProducerStore::new(db.get_ref().clone(), config.defaults.clone());
    if !bp_store.does_exist(*path).await? {
        return Err(DomainError::BlockProducerDoesNotExist.into());
    }

    bp_store
        .set_status(*path, &status, payload.description.as_deref())
        .await?;

    Ok(ok_result("Block producer status has been updated."))
}
