use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "t_block_producer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
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
    pub created: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
