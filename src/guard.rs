use crate::auth::AuthUser;
use crate::entity::block_producer;
use crate::error::{AppError, AuthorityError};

// Identity-match checks run by handlers before a mutating use case is
// invoked; the use cases themselves verify existence only.

pub fn ensure_same_user(
    auth: &AuthUser,
    username: &str,
    denied: AuthorityError,
) -> Result<(), AppError> {
    if auth.username != username {
        return Err(denied.into());
    }
    Ok(())
}

pub fn ensure_block_producer_owner(
    auth: &AuthUser,
    block_producer: &block_producer::Model,
    denied: AuthorityError,
) -> Result<(), AppError> {
    if auth.user_id != block_producer.user_id {
        return Err(denied.into());
    }
    Ok(())
}
