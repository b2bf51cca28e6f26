use async_trait::async_trait;
use bcrypt::{hash, verify};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, Statement, TransactionError, TransactionTrait,
};

use crate::config::StoreDefaults;
use crate::entity::{
    block_producer, block_producer_comment, block_producer_like, email_confirm_state,
    password_recovery_state, profile, user,
};
use crate::store::{
    BlockProducerCommentStore, BlockProducerLikeStore, BlockProducerPatch, BlockProducerStore,
    Claim, NewBlockProducer, ProfilePatch, ProfileStore, RecoveryStateStore, RelationCount,
    UserStore,
};

const BCRYPT_COST: u32 = 10;

#[derive(Clone)]
pub struct DbUserStore {
    db: DatabaseConnection,
    defaults: StoreDefaults,
}

impl DbUserStore {
    pub fn new(db: DatabaseConnection, defaults: StoreDefaults) -> Self {
        Self { db, defaults }
    }
}

fn hash_password(password: &str) -> Result<String, DbErr> {
    hash(password, BCRYPT_COST).map_err(|e| DbErr::Custom(format!("password hash failed: {}", e)))
}

fn flatten_tx(err: TransactionError<DbErr>) -> DbErr {
    match err {
        TransactionError::Connection(e) => e,
        TransactionError::Transaction(e) => e,
    }
}

#[async_trait]
impl UserStore for DbUserStore {
    async fn does_exist_by_email(&self, email: &str) -> Result<bool, DbErr> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .is_some())
    }

    async fn does_exist_by_username(&self, username: &str) -> Result<bool, DbErr> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .is_some())
    }

    async fn create_with_email(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<(), DbErr> {
        let password_hash = hash_password(password)?;
        let email = email.to_string();
        let username = username.to_string();
        let avatar_url = self.defaults.avatar_url.clone();

        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    let user_model = user::ActiveModel {
                        email: Set(email),
                        username: Set(username),
                        password_hash: Set(password_hash),
                        is_active: Set(true),
                        is_staff: Set(false),
                        is_superuser: Set(false),
                        is_email_confirmed: Set(false),
                        created: Set(Some(Utc::now())),
                        ..Default::default()
                    };
                    let inserted = user_model.insert(txn).await?;

                    let profile_model = profile::ActiveModel {
                        user_id: Set(inserted.id),
                        avatar_url: Set(avatar_url),
                        ..Default::default()
                    };
                    profile_model.insert(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_tx)
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<bool, DbErr> {
        let user_model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        let user_model = match user_model {
            Some(u) => u,
            None => return Ok(false),
        };
        verify(password, &user_model.password_hash)
            .map_err(|e| DbErr::Custom(format!("password verify failed: {}", e)))
    }

    async fn set_new_password(&self, email: &str, password: &str) -> Result<(), DbErr> {
        let password_hash = hash_password(password)?;
        user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .filter(user::Column::Email.eq(email))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn set_new_email(&self, username: &str, email: &str) -> Result<(), DbErr> {
        user::Entity::update_many()
            .col_expr(user::Column::Email, Expr::value(email))
            .filter(user::Column::Username.eq(username))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find_by_id(id).one(&self.db).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    async fn delete_by_username(&self, username: &str) -> Result<(), DbErr> {
        let username = username.to_string();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    let user_model = user::Entity::find()
                        .filter(user::Column::Username.eq(username))
                        .one(txn)
                        .await?;
                    let user_model = match user_model {
                        Some(u) => u,
                        None => return Ok(()),
                    };

                    let owned: Vec<i32> = block_producer::Entity::find()
                        .filter(block_producer::Column::UserId.eq(user_model.id))
                        .all(txn)
                        .await?
                        .into_iter()
                        .map(|bp| bp.id)
                        .collect();

                    block_producer_like::Entity::delete_many()
                        .filter(block_producer_like::Column::UserId.eq(user_model.id))
                        .exec(txn)
                        .await?;
                    block_producer_comment::Entity::delete_many()
                        .filter(block_producer_comment::Column::UserId.eq(user_model.id))
                        .exec(txn)
                        .await?;
                    if !owned.is_empty() {
                        block_producer_like::Entity::delete_many()
                            .filter(
                                block_producer_like::Column::BlockProducerId
                                    .is_in(owned.clone()),
                            )
                            .exec(txn)
                            .await?;
                        block_producer_comment::Entity::delete_many()
                            .filter(
                                block_producer_comment::Column::BlockProducerId
                                    .is_in(owned.clone()),
                            )
                            .exec(txn)
                            .await?;
                        block_producer::Entity::delete_many()
                            .filter(block_producer::Column::Id.is_in(owned))
                            .exec(txn)
                            .await?;
                    }
                    profile::Entity::delete_by_id(user_model.id).exec(txn).await?;
                    user::Entity::delete_by_id(user_model.id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_tx)
    }

    async fn is_email_confirmed(&self, email: &str) -> Result<bool, DbErr> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(|u| u.is_email_confirmed)
            .unwrap_or(false))
    }

    async fn set_email_as_confirmed(&self, email: &str) -> Result<(), DbErr> {
        user::Entity::update_many()
            .col_expr(user::Column::IsEmailConfirmed, Expr::value(true))
            .filter(user::Column::Email.eq(email))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct DbProfileStore {
    db: DatabaseConnection,
}

impl DbProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for DbProfileStore {
    async fn get(&self, user_id: i32) -> Result<Option<profile::Model>, DbErr> {
        profile::Entity::find_by_id(user_id).one(&self.db).await
    }

    async fn update(&self, user_id: i32, patch: &ProfilePatch) -> Result<(), DbErr> {
        let mut update = profile::Entity::update_many();
        let mut changed = false;

        macro_rules! apply {
            ($field:ident, $column:ident) => {
                if let Some(value) = patch.$field.clone() {
                    update = update.col_expr(profile::Column::$column, Expr::value(value));
                    changed = true;
                }
            };
        }

        apply!(first_name, FirstName);
        apply!(last_name, LastName);
        apply!(location, Location);
        apply!(avatar_url, AvatarUrl);
        apply!(additional_information, AdditionalInformation);
        apply!(website_url, WebsiteUrl);
        apply!(linkedin_url, LinkedinUrl);
        apply!(twitter_url, TwitterUrl);
        apply!(medium_url, MediumUrl);
        apply!(github_url, GithubUrl);
        apply!(facebook_url, FacebookUrl);
        apply!(telegram_url, TelegramUrl);
        apply!(steemit_url, SteemitUrl);

        if !changed {
            return Ok(());
        }
        update
            .filter(profile::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct DbBlockProducerStore {
    db: DatabaseConnection,
    defaults: StoreDefaults,
}

impl DbBlockProducerStore {
    pub fn new(db: DatabaseConnection, defaults: StoreDefaults) -> Self {
        Self { db, defaults }
    }
}

#[async_trait]
impl BlockProducerStore for DbBlockProducerStore {
    async fn does_exist(&self, id: i32) -> Result<bool, DbErr> {
        Ok(block_producer::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .is_some())
    }

    async fn get(&self, id: i32) -> Result<Option<block_producer::Model>, DbErr> {
        block_producer::Entity::find_by_id(id).one(&self.db).await
    }

    async fn get_all(&self) -> Result<Vec<block_producer::Model>, DbErr> {
        block_producer::Entity::find()
            .order_by_desc(block_producer::Column::Created)
            .order_by_desc(block_producer::Column::Id)
            .all(&self.db)
            .await
    }

    async fn get_last(&self, user_id: i32) -> Result<Option<block_producer::Model>, DbErr> {
        block_producer::Entity::find()
            .filter(block_producer::Column::UserId.eq(user_id))
            .order_by_desc(block_producer::Column::Created)
            .order_by_desc(block_producer::Column::Id)
            .one(&self.db)
            .await
    }

    async fn search(&self, phrase: &str) -> Result<Vec<block_producer::Model>, DbErr> {
        let tokens: Vec<String> = phrase
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut where_sql = Vec::new();
        let mut values: Vec<sea_orm::Value> = Vec::new();
        for token in &tokens {
            where_sql.push(
                "(lower(name) like ? or lower(location) like ? \
                 or lower(short_description) like ? or lower(full_description) like ?)",
            );
            let pattern = format!("%{}%", token);
            for _ in 0..4 {
                values.push(pattern.clone().into());
            }
        }

        let sql = format!(
            "select * from t_block_producer where {} order by created desc, id desc",
            where_sql.join(" and ")
        );
        let backend = self.db.get_database_backend();
        block_producer::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(backend, &sql, values))
            .all(&self.db)
            .await
    }

    async fn create(&self, user_id: i32, info: &NewBlockProducer) -> Result<(), DbErr> {
        let logo_url = info
            .logo_url
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.defaults.logo_url.clone());

        let model = block_producer::ActiveModel {
            user_id: Set(user_id),
            name: Set(info.name.clone()),
            website_url: Set(info.website_url.clone()),
            short_description: Set(info.short_description.clone()),
            location: Set(info.location.clone().unwrap_or_default()),
            full_description: Set(info.full_description.clone().unwrap_or_default()),
            logo_url: Set(logo_url),
            linkedin_url: Set(info.linkedin_url.clone().unwrap_or_default()),
            twitter_url: Set(info.twitter_url.clone().unwrap_or_default()),
            medium_url: Set(info.medium_url.clone().unwrap_or_default()),
            github_url: Set(info.github_url.clone().unwrap_or_default()),
            facebook_url: Set(info.facebook_url.clone().unwrap_or_default()),
            telegram_url: Set(info.telegram_url.clone().unwrap_or_default()),
            reddit_url: Set(info.reddit_url.clone().unwrap_or_default()),
            slack_url: Set(info.slack_url.clone().unwrap_or_default()),
            wikipedia_url: Set(info.wikipedia_url.clone().unwrap_or_default()),
            steemit_url: Set(info.steemit_url.clone().unwrap_or_default()),
            status: Set(self.defaults.block_producer_status.clone()),
            created: Set(Some(Utc::now())),
            ..Default::default()
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        patch: &BlockProducerPatch,
    ) -> Result<(), DbErr> {
        let mut update = block_producer::Entity::update_many();
        let mut changed = false;

        macro_rules! apply {
            ($field:ident, $column:ident) => {
                if let Some(value) = patch.$field.clone() {
                    update = update.col_expr(block_producer::Column::$column, Expr::value(value));
                    changed = true;
                }
            };
        }

        apply!(name, Name);
        apply!(website_url, WebsiteUrl);
        apply!(short_description, ShortDescription);
        apply!(location, Location);
        apply!(full_description, FullDescription);
        apply!(logo_url, LogoUrl);
        apply!(linkedin_url, LinkedinUrl);
        apply!(twitter_url, TwitterUrl);
        apply!(medium_url, MediumUrl);
        apply!(github_url, GithubUrl);
        apply!(facebook_url, FacebookUrl);
        apply!(telegram_url, TelegramUrl);
        apply!(reddit_url, RedditUrl);
        apply!(slack_url, SlackUrl);
        apply!(wikipedia_url, WikipediaUrl);
        apply!(steemit_url, SteemitUrl);

        if !changed {
            return Ok(());
        }
        update
            .filter(block_producer::Column::UserId.eq(user_id))
            .filter(block_producer::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), DbErr> {
        let result = block_producer::Entity::delete_many()
            .filter(block_producer::Column::UserId.eq(user_id))
            .filter(block_producer::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Ok(());
        }
        block_producer_like::Entity::delete_many()
            .filter(block_producer_like::Column::BlockProducerId.eq(id))
            .exec(&self.db)
            .await?;
        block_producer_comment::Entity::delete_many()
            .filter(block_producer_comment::Column::BlockProducerId.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn set_status(
        &self,
        id: i32,
        status: &str,
        description: Option<&str>,
    ) -> Result<(), DbErr> {
        block_producer::Entity::update_many()
            .col_expr(block_producer::Column::Status, Expr::value(status))
            .col_expr(
                block_producer::Column::StatusDescription,
                Expr::value(description.map(|d| d.to_string())),
            )
            .filter(block_producer::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct DbBlockProducerLikeStore {
    db: DatabaseConnection,
}

impl DbBlockProducerLikeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlockProducerLikeStore for DbBlockProducerLikeStore {
    async fn does_exist(&self, user_id: i32, block_producer_id: i32) -> Result<bool, DbErr> {
        Ok(block_producer_like::Entity::find()
            .filter(block_producer_like::Column::UserId.eq(user_id))
            .filter(block_producer_like::Column::BlockProducerId.eq(block_producer_id))
            .one(&self.db)
            .await?
            .is_some())
    }

    async fn create(&self, user_id: i32, block_producer_id: i32) -> Result<(), DbErr> {
        let model = block_producer_like::ActiveModel {
            user_id: Set(user_id),
            block_producer_id: Set(block_producer_id),
            created: Set(Some(Utc::now())),
            ..Default::default()
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, user_id: i32, block_producer_id: i32) -> Result<(), DbErr> {
        block_producer_like::Entity::delete_many()
            .filter(block_producer_like::Column::UserId.eq(user_id))
            .filter(block_producer_like::Column::BlockProducerId.eq(block_producer_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn get_for_block_producer(
        &self,
        block_producer_id: i32,
    ) -> Result<Vec<block_producer_like::Model>, DbErr> {
        block_producer_like::Entity::find()
            .filter(block_producer_like::Column::BlockProducerId.eq(block_producer_id))
            .order_by_asc(block_producer_like::Column::Id)
            .all(&self.db)
            .await
    }

    async fn count_per_block_producer(&self) -> Result<Vec<RelationCount>, DbErr> {
        count_relation(&self.db, "t_block_producer_like").await
    }
}

#[derive(Clone)]
pub struct DbBlockProducerCommentStore {
    db: DatabaseConnection,
}

impl DbBlockProducerCommentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlockProducerCommentStore for DbBlockProducerCommentStore {
    async fn create(
        &self,
        user_id: i32,
        block_producer_id: i32,
        text: &str,
    ) -> Result<(), DbErr> {
        let model = block_producer_comment::ActiveModel {
            user_id: Set(user_id),
            block_producer_id: Set(block_producer_id),
            text: Set(text.to_string()),
            created: Set(Some(Utc::now())),
            ..Default::default()
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn get_for_block_producer(
        &self,
        block_producer_id: i32,
    ) -> Result<Vec<block_producer_comment::Model>, DbErr> {
        block_producer_comment::Entity::find()
            .filter(block_producer_comment::Column::BlockProducerId.eq(block_producer_id))
            .order_by_asc(block_producer_comment::Column::Created)
            .order_by_asc(block_producer_comment::Column::Id)
            .all(&self.db)
            .await
    }

    async fn count_per_block_producer(&self) -> Result<Vec<RelationCount>, DbErr> {
        count_relation(&self.db, "t_block_producer_comment").await
    }
}

async fn count_relation(
    db: &DatabaseConnection,
    relation_table: &str,
) -> Result<Vec<RelationCount>, DbErr> {
    let sql = format!(
        "select bp.id as block_producer_id, count(r.id) as cnt \
         from t_block_producer bp \
         left join {} r on r.block_producer_id = bp.id \
         group by bp.id order by bp.id",
        relation_table
    );
    let backend = db.get_database_backend();
    let rows = db
        .query_all(Statement::from_string(backend, sql))
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| RelationCount {
            block_producer_id: row.try_get("", "block_producer_id").unwrap_or(0),
            count: row.try_get("", "cnt").unwrap_or(0),
        })
        .collect())
}

#[derive(Clone)]
pub struct DbPasswordRecoveryStore {
    db: DatabaseConnection,
}

impl DbPasswordRecoveryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecoveryStateStore for DbPasswordRecoveryStore {
    async fn create(&self, email: &str, identifier: &str) -> Result<(), DbErr> {
        let model = password_recovery_state::ActiveModel {
            email: Set(email.to_string()),
            identifier: Set(identifier.to_string()),
            created: Set(Some(Utc::now())),
            is_active: Set(true),
            ..Default::default()
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn claim(&self, identifier: &str) -> Result<Claim, DbErr> {
        claim_state(
            &self.db,
            "t_password_recovery_state",
            identifier,
            |db, identifier| async move {
                password_recovery_state::Entity::find()
                    .filter(password_recovery_state::Column::Identifier.eq(identifier))
                    .one(&db)
                    .await
                    .map(|state| state.map(|s| s.email))
            },
        )
        .await
    }
}

#[derive(Clone)]
pub struct DbEmailConfirmStore {
    db: DatabaseConnection,
}

impl DbEmailConfirmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecoveryStateStore for DbEmailConfirmStore {
    async fn create(&self, email: &str, identifier: &str) -> Result<(), DbErr> {
        let model = email_confirm_state::ActiveModel {
            email: Set(email.to_string()),
            identifier: Set(identifier.to_string()),
            created: Set(Some(Utc::now())),
            is_active: Set(true),
            ..Default::default()
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn claim(&self, identifier: &str) -> Result<Claim, DbErr> {
        claim_state(
            &self.db,
            "t_email_confirm_state",
            identifier,
            |db, identifier| async move {
                email_confirm_state::Entity::find()
                    .filter(email_confirm_state::Column::Identifier.eq(identifier))
                    .one(&db)
                    .await
                    .map(|state| state.map(|s| s.email))
            },
        )
        .await
    }
}

// One conditional update; the deactivation and the active check cannot be
// separated by a concurrent claim of the same identifier.
async fn claim_state<F, Fut>(
    db: &DatabaseConnection,
    table: &str,
    identifier: &str,
    fetch_email: F,
) -> Result<Claim, DbErr>
where
    F: FnOnce(DatabaseConnection, String) -> Fut,
    Fut: std::future::Future<Output = Result<Option<String>, DbErr>>,
{
    let backend = db.get_database_backend();
    let sql = format!(
        "update {} set is_active = 0 where identifier = ? and is_active = 1",
        table
    );
    let result = db
        .execute(Statement::from_sql_and_values(
            backend,
            &sql,
            vec![identifier.into()],
        ))
        .await?;

    let email = fetch_email(db.clone(), identifier.to_string()).await?;
    match (result.rows_affected(), email) {
        (0, None) => Ok(Claim::Missing),
        (0, Some(_)) => Ok(Claim::AlreadyUsed),
        (_, Some(email)) => Ok(Claim::Claimed { email }),
        // claimed and deleted concurrently; the claim still happened
        (_, None) => Ok(Claim::Missing),
    }
}
