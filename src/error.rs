use actix_web::{http::StatusCode, ResponseError};
use log::error;
use thiserror::Error;

use crate::response::response_from_error;

// Fixed, user-facing message strings; external clients match on them, so
// changing any of them is a breaking change.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("User with specified e-mail address does not exist.")]
    UserEmailDoesNotExist,
    #[error("User with specified username does not exist.")]
    UserUsernameDoesNotExist,
    #[error("User with specified identifier does not exist.")]
    UserIdentifierDoesNotExist,
    #[error("User with specified e-mail address already exists.")]
    UserEmailAlreadyExists,
    #[error("User with specified username already exists.")]
    UserUsernameAlreadyExists,
    #[error("The specified user password is incorrect.")]
    PasswordIncorrect,
    #[error("Recovery password has been already sent to e-mail address.")]
    RecoveryPasswordAlreadySent,
    #[error("User with specified identifier has been already confirmed.")]
    EmailAlreadyConfirmed,
    #[error("Block producer with specified identifier does not exist.")]
    BlockProducerDoesNotExist,
    #[error("Block producer does not exist for specified username.")]
    NoBlockProducerForUser,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AuthorityError {
    #[error("User has no authority to delete this account.")]
    DeleteAccount,
    #[error("User has no authority to update this user profile.")]
    UpdateProfile,
    #[error("User has no authority to update this block producer.")]
    UpdateBlockProducer,
    #[error("User has no authority to delete this block producer.")]
    DeleteBlockProducer,
    #[error("User has no authority to moderate this block producer.")]
    ModerateBlockProducer,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    NotAuthorized(#[from] AuthorityError),
    #[error("{0}")]
    Validation(String),
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,
    #[error("Internal server error.")]
    Internal,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        error!("store failure: {}", err);
        Self::Internal
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Domain(err) => match err {
                DomainError::UserEmailDoesNotExist
                | DomainError::UserUsernameDoesNotExist
                | DomainError::UserIdentifierDoesNotExist
                | DomainError::BlockProducerDoesNotExist
                | DomainError::NoBlockProducerForUser => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::NotAuthorized(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        response_from_error(self)
    }
}
