use actix_web::{error::JsonPayloadError, HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;

use crate::error::AppError;

#[derive(Serialize)]
pub struct ResultDto<T: Serialize> {
    pub result: T,
}

#[derive(Serialize)]
struct ErrorDto {
    error: String,
}

pub fn ok_result<T: Serialize>(result: T) -> HttpResponse {
    HttpResponse::Ok().json(ResultDto { result })
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let app_err = match err {
        JsonPayloadError::ContentType => AppError::validation("Request body must be JSON."),
        JsonPayloadError::Deserialize(e) => AppError::validation(e.to_string()),
        _ => AppError::validation("Request body is not valid."),
    };
    app_err.into()
}

pub fn response_from_error(err: &AppError) -> HttpResponse {
    HttpResponse::build(err.status_code()).json(ErrorDto {
        error: err.to_string(),
    })
}
