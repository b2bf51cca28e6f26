use actix_web::{web, HttpResponse};
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::auth::{decode_token, Claims};
use crate::config::AppConfig;
use crate::entity::user;
use crate::error::AppError;
use crate::response::ok_result;
use crate::routes::require;

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/token/obtaining").route(web::post().to(obtain)))
        .service(web::resource("/token/refreshing").route(web::post().to(refresh)))
        .service(web::resource("/token/verification").route(web::post().to(verification)));
}

#[derive(Deserialize)]
struct ObtainTokenRequest {
    username_or_email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct TokenRequest {
    token: Option<String>,
}

#[derive(Serialize)]
struct TokenDto {
    token: String,
}

async fn obtain(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    payload: web::Json<ObtainTokenRequest>,
) -> Result<HttpResponse, AppError> {
    let login = require(payload.username_or_email.clone(), "username_or_email")?;
    let password = require(payload.password.clone(), "password")?;

    let user_model = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(login.clone()))
                .add(user::Column::Username.eq(login)),
        )
        .one(db.get_ref())
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::validation(BAD_CREDENTIALS))?;

    let matched =
        verify(&password, &user_model.password_hash).map_err(|_| AppError::Internal)?;
    if !matched {
        return Err(AppError::validation(BAD_CREDENTIALS));
    }

    user::Entity::update_many()
        .col_expr(user::Column::LastLogin, Expr::value(Some(Utc::now())))
        .filter(user::Column::Id.eq(user_model.id))
        .exec(db.get_ref())
        .await?;

    let token = generate_token(&config, user_model.id)?;
    Ok(ok_result(TokenDto { token }))
}

async fn refresh(
    config: web::Data<AppConfig>,
    payload: web::Json<TokenRequest>,
) -> Result<HttpResponse, AppError> {
    let token = require(payload.token.clone(), "token")?;
    let claims = decode_token(&config, &token)?;

    let token = generate_token(&config, claims.user_id)?;
    Ok(ok_result(TokenDto { token }))
}

async fn verification(
    config: web::Data<AppConfig>,
    payload: web::Json<TokenRequest>,
) -> Result<HttpResponse, AppError> {
    let token = require(payload.token.clone(), "token")?;
    decode_token(&config, &token)?;

    Ok(ok_result(TokenDto { token }))
}

fn generate_token(config: &AppConfig, user_id: i32) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::days(config.token_ttl_days)).timestamp() as usize;
    let claims = Claims { user_id, exp };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|_| AppError::Internal)
}
