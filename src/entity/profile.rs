use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "t_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
