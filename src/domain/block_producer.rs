use crate::dto::{
    BlockProducerCommentDto, BlockProducerCommentNumberDto, BlockProducerDto,
    BlockProducerLikeDto, BlockProducerLikeNumberDto,
};
use crate::error::{AppError, DomainError};
use crate::store::{
    BlockProducerCommentStore, BlockProducerLikeStore, BlockProducerPatch, BlockProducerStore,
    NewBlockProducer, UserStore,
};

pub struct CreateBlockProducer<'a, U, B> {
    user: &'a U,
    block_producer: &'a B,
}

impl<'a, U: UserStore, B: BlockProducerStore> CreateBlockProducer<'a, U, B> {
    pub fn new(user: &'a U, block_producer: &'a B) -> Self {
        Self {
            user,
            block_producer,
        }
    }

    pub async fn execute(&self, user_email: &str, info: &NewBlockProducer) -> Result<(), AppError> {
        let owner = self
            .user
            .get_by_email(user_email)
            .await?
            .ok_or(DomainError::UserEmailDoesNotExist)?;

        self.block_producer.create(owner.id, info).await?;
        Ok(())
    }
}

pub struct UpdateBlockProducer<'a, U, B> {
    user: &'a U,
    block_producer: &'a B,
}

impl<'a, U: UserStore, B: BlockProducerStore> UpdateBlockProducer<'a, U, B> {
    pub fn new(user: &'a U, block_producer: &'a B) -> Self {
        Self {
            user,
            block_producer,
        }
    }

    // Owner existence is checked before the target, the ordering is part of
    // the contract. The update itself is scoped to (owner, id).
    pub async fn execute(
        &self,
        user_email: &str,
        block_producer_id: i32,
        patch: &BlockProducerPatch,
    ) -> Result<(), AppError> {
        let owner = self
            .user
            .get_by_email(user_email)
            .await?
            .ok_or(DomainError::UserEmailDoesNotExist)?;
        if !self.block_producer.does_exist(block_producer_id).await? {
            return Err(DomainError::BlockProducerDoesNotExist.into());
        }

        self.block_producer
            .update(owner.id, block_producer_id, patch)
            .await?;
        Ok(())
    }
}

pub struct DeleteBlockProducer<'a, U, B> {
    user: &'a U,
    block_producer: &'a B,
}

impl<'a, U: UserStore, B: BlockProducerStore> DeleteBlockProducer<'a, U, B> {
    pub fn new(user: &'a U, block_producer: &'a B) -> Self {
        Self {
            user,
            block_producer,
        }
    }

    pub async fn execute(&self, user_email: &str, block_producer_id: i32) -> Result<(), AppError> {
        let owner = self
            .user
            .get_by_email(user_email)
            .await?
            .ok_or(DomainError::UserEmailDoesNotExist)?;
        if !self.block_producer.does_exist(block_producer_id).await? {
            return Err(DomainError::BlockProducerDoesNotExist.into());
        }

        self.block_producer.delete(owner.id, block_producer_id).await?;
        Ok(())
    }
}

pub struct GetBlockProducer<'a, B> {
    block_producer: &'a B,
}

impl<'a, B: BlockProducerStore> GetBlockProducer<'a, B> {
    pub fn new(block_producer: &'a B) -> Self {
        Self { block_producer }
    }

    pub async fn execute(&self, block_producer_id: i32) -> Result<BlockProducerDto, AppError> {
        let model = self
            .block_producer
            .get(block_producer_id)
            .await?
            .ok_or(DomainError::BlockProducerDoesNotExist)?;
        Ok(model.into())
    }
}

pub struct GetBlockProducers<'a, B> {
    block_producer: &'a B,
}

impl<'a, B: BlockProducerStore> GetBlockProducers<'a, B> {
    pub fn new(block_producer: &'a B) -> Self {
        Self { block_producer }
    }

    pub async fn execute(&self) -> Result<Vec<BlockProducerDto>, AppError> {
        let all = self.block_producer.get_all().await?;
        Ok(all.into_iter().map(Into::into).collect())
    }
}

pub struct SearchBlockProducer<'a, B> {
    block_producer: &'a B,
}

impl<'a, B: BlockProducerStore> SearchBlockProducer<'a, B> {
    pub fn new(block_producer: &'a B) -> Self {
        Self { block_producer }
    }

    pub async fn execute(&self, phrase: &str) -> Result<Vec<BlockProducerDto>, AppError> {
        let matched = self.block_producer.search(phrase).await?;
        Ok(matched.into_iter().map(Into::into).collect())
    }
}

pub struct GetUserLastBlockProducer<'a, U, B> {
    user: &'a U,
    block_producer: &'a B,
}

impl<'a, U: UserStore, B: BlockProducerStore> GetUserLastBlockProducer<'a, U, B> {
    pub fn new(user: &'a U, block_producer: &'a B) -> Self {
        Self {
            user,
            block_producer,
        }
    }

    pub async fn execute(&self, user_email: &str) -> Result<BlockProducerDto, AppError> {
        let owner = match self.user.get_by_email(user_email).await? {
            Some(owner) => owner,
            None => return Err(DomainError::NoBlockProducerForUser.into()),
        };

        let last = self
            .block_producer
            .get_last(owner.id)
            .await?
            .ok_or(DomainError::NoBlockProducerForUser)?;
        Ok(last.into())
    }
}

pub struct LikeBlockProducer<'a, U, B, L> {
    user: &'a U,
    block_producer: &'a B,
    block_producer_like: &'a L,
}

impl<'a, U, B, L> LikeBlockProducer<'a, U, B, L>
where
    U: UserStore,
    B: BlockProducerStore,
    L: BlockProducerLikeStore,
{
    pub fn new(user: &'a U, block_producer: &'a B, block_producer_like: &'a L) -> Self {
        Self {
            user,
            block_producer,
            block_producer_like,
        }
    }

    // A single toggle with no separate like/unlike verb: present -> removed,
    // absent -> created. The check and the flip are two store calls;
    // concurrent toggles by the same user may land in either order.
    pub async fn execute(&self, user_email: &str, block_producer_id: i32) -> Result<(), AppError> {
        let liker = self
            .user
            .get_by_email(user_email)
            .await?
            .ok_or(DomainError::UserEmailDoesNotExist)?;
        if !self.block_producer.does_exist(block_producer_id).await? {
            return Err(DomainError::BlockProducerDoesNotExist.into());
        }

        if self
            .block_producer_like
            .does_exist(liker.id, block_producer_id)
            .await?
        {
            self.block_producer_like
                .delete(liker.id, block_producer_id)
                .await?;
        } else {
            self.block_producer_like
                .create(liker.id, block_producer_id)
                .await?;
        }
        Ok(())
    }
}

pub struct CommentBlockProducer<'a, U, B, C> {
    user: &'a U,
    block_producer: &'a B,
    block_producer_comment: &'a C,
}

impl<'a, U, B, C> CommentBlockProducer<'a, U, B, C>
where
    U: UserStore,
    B: BlockProducerStore,
    C: BlockProducerCommentStore,
{
    pub fn new(user: &'a U, block_producer: &'a B, block_producer_comment: &'a C) -> Self {
        Self {
            user,
            block_producer,
            block_producer_comment,
        }
    }

    pub async fn execute(
        &self,
        user_email: &str,
        block_producer_id: i32,
        text: &str,
    ) -> Result<(), AppError> {
        let author = self
            .user
            .get_by_email(user_email)
            .await?
            .ok_or(DomainError::UserEmailDoesNotExist)?;
        if !self.block_producer.does_exist(block_producer_id).await? {
            return Err(DomainError::BlockProducerDoesNotExist.into());
        }

        self.block_producer_comment
            .create(author.id, block_producer_id, text)
            .await?;
        Ok(())
    }
}

pub struct GetBlockProducerLikes<'a, U, B, L> {
    user: &'a U,
    block_producer: &'a B,
    block_producer_like: &'a L,
}

impl<'a, U, B, L> GetBlockProducerLikes<'a, U, B, L>
where
    U: UserStore,
    B: BlockProducerStore,
    L: BlockProducerLikeStore,
{
    pub fn new(user: &'a U, block_producer: &'a B, block_producer_like: &'a L) -> Self {
        Self {
            user,
            block_producer,
            block_producer_like,
        }
    }

    pub async fn execute(
        &self,
        block_producer_id: i32,
    ) -> Result<Vec<BlockProducerLikeDto>, AppError> {
        if !self.block_producer.does_exist(block_producer_id).await? {
            return Err(DomainError::BlockProducerDoesNotExist.into());
        }

        let likes = self
            .block_producer_like
            .get_for_block_producer(block_producer_id)
            .await?;

        let mut dtos = Vec::with_capacity(likes.len());
        for like in likes {
            if let Some(user_model) = self.user.get_by_id(like.user_id).await? {
                dtos.push(BlockProducerLikeDto::from_parts(like, user_model));
            }
        }
        Ok(dtos)
    }
}

pub struct GetBlockProducerLikesNumber<'a, L> {
    block_producer_like: &'a L,
}

impl<'a, L: BlockProducerLikeStore> GetBlockProducerLikesNumber<'a, L> {
    pub fn new(block_producer_like: &'a L) -> Self {
        Self {
            block_producer_like,
        }
    }

    pub async fn execute(&self) -> Result<Vec<BlockProducerLikeNumberDto>, AppError> {
        let counts = self.block_producer_like.count_per_block_producer().await?;
        Ok(counts
            .into_iter()
            .map(|c| BlockProducerLikeNumberDto {
                block_producer_id: c.block_producer_id,
                likes_number: c.count,
            })
            .collect())
    }
}

pub struct GetBlockProducerComments<'a, U, B, C> {
    user: &'a U,
    block_producer: &'a B,
    block_producer_comment: &'a C,
}

impl<'a, U, B, C> GetBlockProducerComments<'a, U, B, C>
where
    U: UserStore,
    B: BlockProducerStore,
    C: BlockProducerCommentStore,
{
    pub fn new(user: &'a U, block_producer: &'a B, block_producer_comment: &'a C) -> Self {
        Self {
            user,
            block_producer,
            block_producer_comment,
        }
    }

    pub async fn execute(
        &self,
        block_producer_id: i32,
    ) -> Result<Vec<BlockProducerCommentDto>, AppError> {
        if !self.block_producer.does_exist(block_producer_id).await? {
            return Err(DomainError::BlockProducerDoesNotExist.into());
        }

        let comments = self
            .block_producer_comment
            .get_for_block_producer(block_producer_id)
            .await?;

        let mut dtos = Vec::with_capacity(comments.len());
        for comment in comments {
            if let Some(user_model) = self.user.get_by_id(comment.user_id).await? {
                dtos.push(BlockProducerCommentDto::from_parts(comment, user_model));
            }
        }
        Ok(dtos)
    }
}

pub struct GetBlockProducerCommentsNumber<'a, C> {
    block_producer_comment: &'a C,
}

impl<'a, C: BlockProducerCommentStore> GetBlockProducerCommentsNumber<'a, C> {
    pub fn new(block_producer_comment: &'a C) -> Self {
        Self {
            block_producer_comment,
        }
    }

    pub async fn execute(&self) -> Result<Vec<BlockProducerCommentNumberDto>, AppError> {
        let counts = self
            .block_producer_comment
            .count_per_block_producer()
            .await?;
        Ok(counts
            .into_iter()
            .map(|c| BlockProducerCommentNumberDto {
                block_producer_id: c.block_producer_id,
                comments_number: c.count,
            })
            .collect())
    }
}
