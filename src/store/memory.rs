use std::sync::Mutex;

use async_trait::async_trait;
use bcrypt::{hash, verify};
use chrono::Utc;
use sea_orm::DbErr;

use crate::config::StoreDefaults;
use crate::entity::{block_producer, block_producer_comment, block_producer_like, profile, user};
use crate::store::{
    BlockProducerCommentStore, BlockProducerLikeStore, BlockProducerPatch, BlockProducerStore,
    Claim, NewBlockProducer, ProfilePatch, ProfileStore, RecoveryStateStore, RelationCount,
    UserStore,
};

// Cheap cost, this is a test fake.
const BCRYPT_COST: u32 = 4;

#[derive(Default)]
struct State {
    users: Vec<user::Model>,
    profiles: Vec<profile::Model>,
    block_producers: Vec<block_producer::Model>,
    likes: Vec<block_producer_like::Model>,
    comments: Vec<block_producer_comment::Model>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct MemoryStores {
    state: Mutex<State>,
    defaults: StoreDefaults,
}

impl MemoryStores {
    pub fn new(defaults: StoreDefaults) -> Self {
        Self {
            state: Mutex::new(State::default()),
            defaults,
        }
    }
}

impl Default for MemoryStores {
    fn default() -> Self {
        Self::new(StoreDefaults::default())
    }
}

#[async_trait]
impl UserStore for MemoryStores {
    async fn does_exist_by_email(&self, email: &str) -> Result<bool, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().any(|u| u.email == email))
    }

    async fn does_exist_by_username(&self, username: &str) -> Result<bool, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().any(|u| u.username == username))
    }

    async fn create_with_email(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<(), DbErr> {
        let password_hash = hash(password, BCRYPT_COST)
            .map_err(|e| DbErr::Custom(format!("password hash failed: {}", e)))?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.users.push(user::Model {
            id,
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            is_email_confirmed: false,
            last_login: None,
            created: Some(Utc::now()),
        });
        state.profiles.push(profile::Model {
            user_id: id,
            first_name: String::new(),
            last_name: String::new(),
            location: String::new(),
            avatar_url: self.defaults.avatar_url.clone(),
            additional_information: String::new(),
            website_url: String::new(),
            linkedin_url: String::new(),
            twitter_url: String::new(),
            medium_url: String::new(),
            github_url: String::new(),
            facebook_url: String::new(),
            telegram_url: String::new(),
            steemit_url: String::new(),
        });
        Ok(())
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<bool, DbErr> {
        let password_hash = {
            let state = self.state.lock().unwrap();
            match state.users.iter().find(|u| u.email == email) {
                Some(u) => u.password_hash.clone(),
                None => return Ok(false),
            }
        };
        verify(password, &password_hash)
            .map_err(|e| DbErr::Custom(format!("password verify failed: {}", e)))
    }

    async fn set_new_password(&self, email: &str, password: &str) -> Result<(), DbErr> {
        let password_hash = hash(password, BCRYPT_COST)
            .map_err(|e| DbErr::Custom(format!("password hash failed: {}", e)))?;
        let mut state = self.state.lock().unwrap();
        if let Some(u) = state.users.iter_mut().find(|u| u.email == email) {
            u.password_hash = password_hash;
        }
        Ok(())
    }

    async fn set_new_email(&self, username: &str, email: &str) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        if let Some(u) = state.users.iter_mut().find(|u| u.username == username) {
            u.email = email.to_string();
        }
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<user::Model>, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn delete_by_username(&self, username: &str) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        let user_id = match state.users.iter().find(|u| u.username == username) {
            Some(u) => u.id,
            None => return Ok(()),
        };
        let owned: Vec<i32> = state
            .block_producers
            .iter()
            .filter(|bp| bp.user_id == user_id)
            .map(|bp| bp.id)
            .collect();
        state
            .likes
            .retain(|l| l.user_id != user_id && !owned.contains(&l.block_producer_id));
        state
            .comments
            .retain(|c| c.user_id != user_id && !owned.contains(&c.block_producer_id));
        state.block_producers.retain(|bp| bp.user_id != user_id);
        state.profiles.retain(|p| p.user_id != user_id);
        state.users.retain(|u| u.id != user_id);
        Ok(())
    }

    async fn is_email_confirmed(&self, email: &str) -> Result<bool, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.is_email_confirmed)
            .unwrap_or(false))
    }

    async fn set_email_as_confirmed(&self, email: &str) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        if let Some(u) = state.users.iter_mut().find(|u| u.email == email) {
            u.is_email_confirmed = true;
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStores {
    async fn get(&self, user_id: i32) -> Result<Option<profile::Model>, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn update(&self, user_id: i32, patch: &ProfilePatch) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        let target = match state.profiles.iter_mut().find(|p| p.user_id == user_id) {
            Some(p) => p,
            None => return Ok(()),
        };

        macro_rules! apply {
            ($field:ident) => {
                if let Some(value) = patch.$field.clone() {
                    target.$field = value;
                }
            };
        }

        apply!(first_name);
        apply!(last_name);
        apply!(location);
        apply!(avatar_url);
        apply!(additional_information);
        apply!(website_url);
        apply!(linkedin_url);
        apply!(twitter_url);
        apply!(medium_url);
        apply!(github_url);
        apply!(facebook_url);
        apply!(telegram_url);
        apply!(steemit_url);
        Ok(())
    }
}

#[async_trait]
impl BlockProducerStore for MemoryStores {
    async fn does_exist(&self, id: i32) -> Result<bool, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state.block_producers.iter().any(|bp| bp.id == id))
    }

    async fn get(&self, id: i32) -> Result<Option<block_producer::Model>, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state.block_producers.iter().find(|bp| bp.id == id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<block_producer::Model>, DbErr> {
        let state = self.state.lock().unwrap();
        let mut all = state.block_producers.clone();
        all.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(all)
    }

    async fn get_last(&self, user_id: i32) -> Result<Option<block_producer::Model>, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state
            .block_producers
            .iter()
            .filter(|bp| bp.user_id == user_id)
            .max_by_key(|bp| bp.id)
            .cloned())
    }

    async fn search(&self, phrase: &str) -> Result<Vec<block_producer::Model>, DbErr> {
        let tokens: Vec<String> = phrase
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let state = self.state.lock().unwrap();
        let mut matched: Vec<block_producer::Model> = state
            .block_producers
            .iter()
            .filter(|bp| {
                tokens.iter().all(|token| {
                    bp.name.to_lowercase().contains(token)
                        || bp.location.to_lowercase().contains(token)
                        || bp.short_description.to_lowercase().contains(token)
                        || bp.full_description.to_lowercase().contains(token)
                })
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(matched)
    }

    async fn create(&self, user_id: i32, info: &NewBlockProducer) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let logo_url = info
            .logo_url
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.defaults.logo_url.clone());
        state.block_producers.push(block_producer::Model {
            id,
            user_id,
            name: info.name.clone(),
            website_url: info.website_url.clone(),
            short_description: info.short_description.clone(),
            location: info.location.clone().unwrap_or_default(),
            full_description: info.full_description.clone().unwrap_or_default(),
            logo_url,
            linkedin_url: info.linkedin_url.clone().unwrap_or_default(),
            twitter_url: info.twitter_url.clone().unwrap_or_default(),
            medium_url: info.medium_url.clone().unwrap_or_default(),
            github_url: info.github_url.clone().unwrap_or_default(),
            facebook_url: info.facebook_url.clone().unwrap_or_default(),
            telegram_url: info.telegram_url.clone().unwrap_or_default(),
            reddit_url: info.reddit_url.clone().unwrap_or_default(),
            slack_url: info.slack_url.clone().unwrap_or_default(),
            wikipedia_url: info.wikipedia_url.clone().unwrap_or_default(),
            steemit_url: info.steemit_url.clone().unwrap_or_default(),
            status: self.defaults.block_producer_status.clone(),
            status_description: None,
            created: Some(Utc::now()),
        });
        Ok(())
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        patch: &BlockProducerPatch,
    ) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        let target = match state
            .block_producers
            .iter_mut()
            .find(|bp| bp.id == id && bp.user_id == user_id)
        {
            Some(bp) => bp,
            None => return Ok(()),
        };

        macro_rules! apply {
            ($field:ident) => {
                if let Some(value) = patch.$field.clone() {
                    target.$field = value;
                }
            };
        }

        apply!(name);
        apply!(website_url);
        apply!(short_description);
        apply!(location);
        apply!(full_description);
        apply!(logo_url);
        apply!(linkedin_url);
        apply!(twitter_url);
        apply!(medium_url);
        apply!(github_url);
        apply!(facebook_url);
        apply!(telegram_url);
        apply!(reddit_url);
        apply!(slack_url);
        apply!(wikipedia_url);
        apply!(steemit_url);
        Ok(())
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        let before = state.block_producers.len();
        state
            .block_producers
            .retain(|bp| !(bp.id == id && bp.user_id == user_id));
        if state.block_producers.len() < before {
            state.likes.retain(|l| l.block_producer_id != id);
            state.comments.retain(|c| c.block_producer_id != id);
        }
        Ok(())
    }

    async fn set_status(
        &self,
        id: i32,
        status: &str,
        description: Option<&str>,
    ) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        if let Some(bp) = state.block_producers.iter_mut().find(|bp| bp.id == id) {
            bp.status = status.to_string();
            bp.status_description = description.map(|d| d.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl BlockProducerLikeStore for MemoryStores {
    async fn does_exist(&self, user_id: i32, block_producer_id: i32) -> Result<bool, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state
            .likes
            .iter()
            .any(|l| l.user_id == user_id && l.block_producer_id == block_producer_id))
    }

    async fn create(&self, user_id: i32, block_producer_id: i32) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.likes.push(block_producer_like::Model {
            id,
            user_id,
            block_producer_id,
            created: Some(Utc::now()),
        });
        Ok(())
    }

    async fn delete(&self, user_id: i32, block_producer_id: i32) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        state
            .likes
            .retain(|l| !(l.user_id == user_id && l.block_producer_id == block_producer_id));
        Ok(())
    }

    async fn get_for_block_producer(
        &self,
        block_producer_id: i32,
    ) -> Result<Vec<block_producer_like::Model>, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(state
            .likes
            .iter()
            .filter(|l| l.block_producer_id == block_producer_id)
            .cloned()
            .collect())
    }

    async fn count_per_block_producer(&self) -> Result<Vec<RelationCount>, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(count_relation(
            &state.block_producers,
            |bp_id| state.likes.iter().filter(|l| l.block_producer_id == bp_id).count() as i64,
        ))
    }
}

#[async_trait]
impl BlockProducerCommentStore for MemoryStores {
    async fn create(
        &self,
        user_id: i32,
        block_producer_id: i32,
        text: &str,
    ) -> Result<(), DbErr> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.comments.push(block_producer_comment::Model {
            id,
            user_id,
            block_producer_id,
            text: text.to_string(),
            created: Some(Utc::now()),
        });
        Ok(())
    }

    async fn get_for_block_producer(
        &self,
        block_producer_id: i32,
    ) -> Result<Vec<block_producer_comment::Model>, DbErr> {
        let state = self.state.lock().unwrap();
        let mut comments: Vec<block_producer_comment::Model> = state
            .comments
            .iter()
            .filter(|c| c.block_producer_id == block_producer_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.id);
        Ok(comments)
    }

    async fn count_per_block_producer(&self) -> Result<Vec<RelationCount>, DbErr> {
        let state = self.state.lock().unwrap();
        Ok(count_relation(
            &state.block_producers,
            |bp_id| {
                state
                    .comments
                    .iter()
                    .filter(|c| c.block_producer_id == bp_id)
                    .count() as i64
            },
        ))
    }
}

fn count_relation(
    block_producers: &[block_producer::Model],
    count_for: impl Fn(i32) -> i64,
) -> Vec<RelationCount> {
    let mut ids: Vec<i32> = block_producers.iter().map(|bp| bp.id).collect();
    ids.sort_unstable();
    ids.into_iter()
        .map(|id| RelationCount {
            block_producer_id: id,
            count: count_for(id),
        })
        .collect()
}

#[derive(Default)]
pub struct MemoryRecoveryStates {
    states: Mutex<Vec<(String, String, bool)>>,
}

#[async_trait]
impl RecoveryStateStore for MemoryRecoveryStates {
    async fn create(&self, email: &str, identifier: &str) -> Result<(), DbErr> {
        let mut states = self.states.lock().unwrap();
        states.push((email.to_string(), identifier.to_string(), true));
        Ok(())
    }

    async fn claim(&self, identifier: &str) -> Result<Claim, DbErr> {
        let mut states = self.states.lock().unwrap();
        match states.iter_mut().find(|(_, id, _)| id == identifier) {
            None => Ok(Claim::Missing),
            Some((_, _, active)) if !*active => Ok(Claim::AlreadyUsed),
            Some((email, _, active)) => {
                *active = false;
                Ok(Claim::Claimed {
                    email: email.clone(),
                })
            }
        }
    }
}
