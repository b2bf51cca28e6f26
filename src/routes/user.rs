use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::domain::user::{DeleteUser, GetUser};
use crate::error::{AppError, AuthorityError};
use crate::guard::ensure_same_user;
use crate::response::ok_result;
use crate::store::db::DbUserStore;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{username}")
            .route(web::get().to(get_user))
            .route(web::delete().to(delete_user)),
    );
}

async fn get_user(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());

    let user = GetUser::new(&user_store).execute(&username).await?;
    Ok(ok_result(user))
}

async fn delete_user(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    ensure_same_user(&auth, &username, AuthorityError::DeleteAccount)?;

    let user_store = DbUserStore::new(db.get_ref().clone(), config.defaults.clone());
    DeleteUser::new(&user_store).execute(&username).await?;

    Ok(ok_result("User has been deleted."))
}
