pub mod db;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use sea_orm::DbErr;

use crate::entity::{block_producer, block_producer_comment, block_producer_like, profile, user};

#[derive(Clone, Debug, Default)]
pub struct NewBlockProducer {
    pub name: String,
    pub website_url: String,
    pub short_description: String,
    pub location: Option<String>,
    pub full_description: Option<String>,
    pub logo_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub medium_url: Option<String>,
    pub github_url: Option<String>,
    pub facebook_url: Option<String>,
    pub telegram_url: Option<String>,
    pub reddit_url: Option<String>,
    pub slack_url: Option<String>,
    pub wikipedia_url: Option<String>,
    pub steemit_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct BlockProducerPatch {
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub short_description: Option<String>,
    pub location: Option<String>,
    pub full_description: Option<String>,
    pub logo_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub medium_url: Option<String>,
    pub github_url: Option<String>,
    pub facebook_url: Option<String>,
    pub telegram_url: Option<String>,
    pub reddit_url: Option<String>,
    pub slack_url: Option<String>,
    pub wikipedia_url: Option<String>,
    pub steemit_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub additional_information: Option<String>,
    pub website_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub medium_url: Option<String>,
    pub github_url: Option<String>,
    pub facebook_url: Option<String>,
    pub telegram_url: Option<String>,
    pub steemit_url: Option<String>,
}

// Outcome of the single-shot token claim: check-active-and-deactivate is
// one conditional store operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Claim {
    Missing,
    AlreadyUsed,
    Claimed { email: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationCount {
    pub block_producer_id: i32,
    pub count: i64,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn does_exist_by_email(&self, email: &str) -> Result<bool, DbErr>;
    async fn does_exist_by_username(&self, username: &str) -> Result<bool, DbErr>;
    /// Creates the user together with its empty profile.
    async fn create_with_email(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<(), DbErr>;
    async fn verify_password(&self, email: &str, password: &str) -> Result<bool, DbErr>;
    async fn set_new_password(&self, email: &str, password: &str) -> Result<(), DbErr>;
    async fn set_new_email(&self, username: &str, email: &str) -> Result<(), DbErr>;
    async fn get_by_id(&self, id: i32) -> Result<Option<user::Model>, DbErr>;
    async fn get_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr>;
    async fn get_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr>;
    /// Deletes the user and every record it owns.
    async fn delete_by_username(&self, username: &str) -> Result<(), DbErr>;
    async fn is_email_confirmed(&self, email: &str) -> Result<bool, DbErr>;
    async fn set_email_as_confirmed(&self, email: &str) -> Result<(), DbErr>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: i32) -> Result<Option<profile::Model>, DbErr>;
    async fn update(&self, user_id: i32, patch: &ProfilePatch) -> Result<(), DbErr>;
}

#[async_trait]
pub trait BlockProducerStore: Send + Sync {
    async fn does_exist(&self, id: i32) -> Result<bool, DbErr>;
    async fn get(&self, id: i32) -> Result<Option<block_producer::Model>, DbErr>;
    async fn get_all(&self) -> Result<Vec<block_producer::Model>, DbErr>;
    async fn get_last(&self, user_id: i32) -> Result<Option<block_producer::Model>, DbErr>;
    async fn search(&self, phrase: &str) -> Result<Vec<block_producer::Model>, DbErr>;
    async fn create(&self, user_id: i32, info: &NewBlockProducer) -> Result<(), DbErr>;
    /// Partial update scoped to (owner, id); an id owned by someone else is
    /// a no-op at this level, ownership is the caller's guard.
    async fn update(&self, user_id: i32, id: i32, patch: &BlockProducerPatch)
        -> Result<(), DbErr>;
    async fn delete(&self, user_id: i32, id: i32) -> Result<(), DbErr>;
    async fn set_status(
        &self,
        id: i32,
        status: &str,
        description: Option<&str>,
    ) -> Result<(), DbErr>;
}

#[async_trait]
pub trait BlockProducerLikeStore: Send + Sync {
    async fn does_exist(&self, user_id: i32, block_producer_id: i32) -> Result<bool, DbErr>;
    async fn create(&self, user_id: i32, block_producer_id: i32) -> Result<(), DbErr>;
    async fn delete(&self, user_id: i32, block_producer_id: i32) -> Result<(), DbErr>;
    async fn get_for_block_producer(
        &self,
        block_producer_id: i32,
    ) -> Result<Vec<block_producer_like::Model>, DbErr>;
    async fn count_per_block_producer(&self) -> Result<Vec<RelationCount>, DbErr>;
}

#[async_trait]
pub trait BlockProducerCommentStore: Send + Sync {
    async fn create(&self, user_id: i32, block_producer_id: i32, text: &str)
        -> Result<(), DbErr>;
    async fn get_for_block_producer(
        &self,
        block_producer_id: i32,
    ) -> Result<Vec<block_producer_comment::Model>, DbErr>;
    async fn count_per_block_producer(&self) -> Result<Vec<RelationCount>, DbErr>;
}

#[async_trait]
pub trait RecoveryStateStore: Send + Sync {
    async fn create(&self, email: &str, identifier: &str) -> Result<(), DbErr>;
    async fn claim(&self, identifier: &str) -> Result<Claim, DbErr>;
}
