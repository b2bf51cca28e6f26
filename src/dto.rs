use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::entity::{block_producer, block_producer_comment, block_producer_like, profile, user};

// Projections crossing the API boundary. Password hashes, raw token
// identifiers and the user's internal creation timestamp never appear here.

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub last_login: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl From<user::Model> for UserDto {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            last_login: model.last_login.map(to_rfc3339),
            is_active: model.is_active,
            is_staff: model.is_staff,
            is_superuser: model.is_superuser,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserProfileDto {
    pub user: UserDto,
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub avatar_url: String,
    pub additional_information: String,
    pub website_url: String,
    pub linkedin_url: String,
    pub twitter_url: String,
    pub medium_url: String,
    pub github_url: String,
    pub facebook_url: String,
    pub telegram_url: String,
    pub steemit_url: String,
}

impl UserProfileDto {
    pub fn from_parts(profile: profile::Model, user: user::Model) -> Self {
        Self {
            user: user.into(),
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            location: profile.location,
            avatar_url: profile.avatar_url,
            additional_information: profile.additional_information,
            website_url: profile.website_url,
            linkedin_url: profile.linkedin_url,
            twitter_url: profile.twitter_url,
            medium_url: profile.medium_url,
            github_url: profile.github_url,
            facebook_url: profile.facebook_url,
            telegram_url: profile.telegram_url,
            steemit_url: profile.steemit_url,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockProducerDto {
    pub user_id: i32,
    pub id: i32,
    pub name: String,
    pub website_url: String,
    pub location: String,
    pub short_description: String,
    pub full_description: String,
    pub logo_url: String,
    pub linkedin_url: String,
    pub twitter_url: String,
    pub medium_url: String,
    pub github_url: String,
    pub facebook_url: String,
    pub telegram_url: String,
    pub reddit_url: String,
    pub slack_url: String,
    pub wikipedia_url: String,
    pub steemit_url: String,
    pub status: String,
    pub status_description: Option<String>,
}

impl From<block_producer::Model> for BlockProducerDto {
    fn from(model: block_producer::Model) -> Self {
        Self {
            user_id: model.user_id,
            id: model.id,
            name: model.name,
            website_url: model.website_url,
            location: model.location,
            short_description: model.short_description,
            full_description: model.full_description,
            logo_url: model.logo_url,
            linkedin_url: model.linkedin_url,
            twitter_url: model.twitter_url,
            medium_url: model.medium_url,
            github_url: model.github_url,
            facebook_url: model.facebook_url,
            telegram_url: model.telegram_url,
            reddit_url: model.reddit_url,
            slack_url: model.slack_url,
            wikipedia_url: model.wikipedia_url,
            steemit_url: model.steemit_url,
            status: model.status,
            status_description: model.status_description,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockProducerLikeDto {
    pub id: i32,
    pub user_id: i32,
    pub block_producer_id: i32,
    pub user: UserDto,
}

impl BlockProducerLikeDto {
    pub fn from_parts(like: block_producer_like::Model, user: user::Model) -> Self {
        Self {
            id: like.id,
            user_id: like.user_id,
            block_producer_id: like.block_producer_id,
            user: user.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockProducerCommentDto {
    pub id: i32,
    pub user_id: i32,
    pub block_producer_id: i32,
    pub user: UserDto,
    pub text: String,
    pub created_at: Option<String>,
}

impl BlockProducerCommentDto {
    pub fn from_parts(comment: block_producer_comment::Model, user: user::Model) -> Self {
        Self {
            id: comment.id,
            user_id: comment.user_id,
            block_producer_id: comment.block_producer_id,
            user: user.into(),
            text: comment.text,
            created_at: comment.created.map(to_rfc3339),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockProducerLikeNumberDto {
    pub block_producer_id: i32,
    pub likes_number: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockProducerCommentNumberDto {
    pub block_producer_id: i32,
    pub comments_number: i64,
}

fn to_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, false)
}
