use crate::dto::{UserDto, UserProfileDto};
use crate::error::{AppError, DomainError};
use crate::store::{Claim, ProfilePatch, ProfileStore, RecoveryStateStore, UserStore};

use super::random_hex;

const IDENTIFIER_LENGTH: usize = 32;
const GENERATED_PASSWORD_LENGTH: usize = 12;

pub struct RegisterUser<'a, U> {
    user: &'a U,
}

impl<'a, U: UserStore> RegisterUser<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    // The e-mail conflict is checked first; when both collide, it is the one
    // reported.
    pub async fn by_credentials(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<(), AppError> {
        if self.user.does_exist_by_email(email).await? {
            return Err(DomainError::UserEmailAlreadyExists.into());
        }
        if self.user.does_exist_by_username(username).await? {
            return Err(DomainError::UserUsernameAlreadyExists.into());
        }

        self.user.create_with_email(email, username, password).await?;
        Ok(())
    }
}

pub struct ChangeUserPassword<'a, U> {
    user: &'a U,
}

impl<'a, U: UserStore> ChangeUserPassword<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    pub async fn execute(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if !self.user.does_exist_by_email(email).await? {
            return Err(DomainError::UserEmailDoesNotExist.into());
        }
        if !self.user.verify_password(email, old_password).await? {
            return Err(DomainError::PasswordIncorrect.into());
        }

        self.user.set_new_password(email, new_password).await?;
        Ok(())
    }
}

pub struct RequestUserPasswordRecovery<'a, U, S> {
    user: &'a U,
    password_recovery_state: &'a S,
}

impl<'a, U: UserStore, S: RecoveryStateStore> RequestUserPasswordRecovery<'a, U, S> {
    pub fn new(user: &'a U, password_recovery_state: &'a S) -> Self {
        Self {
            user,
            password_recovery_state,
        }
    }

    pub async fn execute(&self, email: &str) -> Result<String, AppError> {
        if !self.user.does_exist_by_email(email).await? {
            return Err(DomainError::UserEmailDoesNotExist.into());
        }

        let identifier = random_hex(IDENTIFIER_LENGTH);
        self.password_recovery_state.create(email, &identifier).await?;
        Ok(identifier)
    }
}

pub struct RecoverUserPassword<'a, U, S> {
    user: &'a U,
    password_recovery_state: &'a S,
}

impl<'a, U: UserStore, S: RecoveryStateStore> RecoverUserPassword<'a, U, S> {
    pub fn new(user: &'a U, password_recovery_state: &'a S) -> Self {
        Self {
            user,
            password_recovery_state,
        }
    }

    pub async fn execute(&self, identifier: &str) -> Result<(String, String), AppError> {
        let email = match self.password_recovery_state.claim(identifier).await? {
            Claim::Missing => return Err(DomainError::UserIdentifierDoesNotExist.into()),
            Claim::AlreadyUsed => return Err(DomainError::RecoveryPasswordAlreadySent.into()),
            Claim::Claimed { email } => email,
        };

        let new_password = random_hex(GENERATED_PASSWORD_LENGTH);
        self.user.set_new_password(&email, &new_password).await?;
        Ok((email, new_password))
    }
}

pub struct ChangeUserEmail<'a, U> {
    user: &'a U,
}

impl<'a, U: UserStore> ChangeUserEmail<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    pub async fn execute(&self, username: &str, new_email: &str) -> Result<(), AppError> {
        if !self.user.does_exist_by_username(username).await? {
            return Err(DomainError::UserUsernameDoesNotExist.into());
        }
        if self.user.does_exist_by_email(new_email).await? {
            return Err(DomainError::UserEmailAlreadyExists.into());
        }

        self.user.set_new_email(username, new_email).await?;
        Ok(())
    }
}

pub struct RequestUserEmailConfirm<'a, U, S> {
    user: &'a U,
    email_confirm_state: &'a S,
}

impl<'a, U: UserStore, S: RecoveryStateStore> RequestUserEmailConfirm<'a, U, S> {
    pub fn new(user: &'a U, email_confirm_state: &'a S) -> Self {
        Self {
            user,
            email_confirm_state,
        }
    }

    pub async fn execute(&self, email: &str) -> Result<String, AppError> {
        if !self.user.does_exist_by_email(email).await? {
            return Err(DomainError::UserEmailDoesNotExist.into());
        }

        let identifier = random_hex(IDENTIFIER_LENGTH);
        self.email_confirm_state.create(email, &identifier).await?;
        Ok(identifier)
    }
}

pub struct ConfirmUserEmail<'a, U, S> {
    user: &'a U,
    email_confirm_state: &'a S,
}

impl<'a, U: UserStore, S: RecoveryStateStore> ConfirmUserEmail<'a, U, S> {
    pub fn new(user: &'a U, email_confirm_state: &'a S) -> Self {
        Self {
            user,
            email_confirm_state,
        }
    }

    pub async fn execute(&self, identifier: &str) -> Result<(), AppError> {
        let email = match self.email_confirm_state.claim(identifier).await? {
            Claim::Missing => return Err(DomainError::UserIdentifierDoesNotExist.into()),
            Claim::AlreadyUsed => return Err(DomainError::EmailAlreadyConfirmed.into()),
            Claim::Claimed { email } => email,
        };

        self.user.set_email_as_confirmed(&email).await?;
        Ok(())
    }
}

pub struct GetUser<'a, U> {
    user: &'a U,
}

impl<'a, U: UserStore> GetUser<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    pub async fn execute(&self, username: &str) -> Result<UserDto, AppError> {
        let user_model = self
            .user
            .get_by_username(username)
            .await?
            .ok_or(DomainError::UserUsernameDoesNotExist)?;
        Ok(user_model.into())
    }
}

pub struct DeleteUser<'a, U> {
    user: &'a U,
}

impl<'a, U: UserStore> DeleteUser<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    pub async fn execute(&self, username: &str) -> Result<(), AppError> {
        if !self.user.does_exist_by_username(username).await? {
            return Err(DomainError::UserUsernameDoesNotExist.into());
        }

        self.user.delete_by_username(username).await?;
        Ok(())
    }
}

pub struct UpdateUserProfile<'a, U, P> {
    user: &'a U,
    profile: &'a P,
}

impl<'a, U: UserStore, P: ProfileStore> UpdateUserProfile<'a, U, P> {
    pub fn new(user: &'a U, profile: &'a P) -> Self {
        Self { user, profile }
    }

    pub async fn execute(&self, email: &str, patch: &ProfilePatch) -> Result<(), AppError> {
        let user_model = self
            .user
            .get_by_email(email)
            .await?
            .ok_or(DomainError::UserEmailDoesNotExist)?;

        self.profile.update(user_model.id, patch).await?;
        Ok(())
    }
}

pub struct GetUserProfile<'a, U, P> {
    user: &'a U,
    profile: &'a P,
}

impl<'a, U: UserStore, P: ProfileStore> GetUserProfile<'a, U, P> {
    pub fn new(user: &'a U, profile: &'a P) -> Self {
        Self { user, profile }
    }

    pub async fn execute(&self, username: &str) -> Result<UserProfileDto, AppError> {
        let user_model = self
            .user
            .get_by_username(username)
            .await?
            .ok_or(DomainError::UserUsernameDoesNotExist)?;

        let profile_model = self
            .profile
            .get(user_model.id)
            .await?
            .ok_or(AppError::Internal)?;

        Ok(UserProfileDto::from_parts(profile_model, user_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryRecoveryStates, MemoryStores};

    const EMAIL: &str = "martin.fowler@gmail.com";
    const USERNAME: &str = "martin.fowler";
    const PASSWORD: &str = "martin.fowler.1337";

    async fn stores_with_user() -> MemoryStores {
        let stores = MemoryStores::default();
        stores
            .create_with_email(EMAIL, USERNAME, PASSWORD)
            .await
            .unwrap();
        stores
    }

    #[tokio::test]
    async fn register_creates_user_with_profile() {
        let stores = MemoryStores::default();

        RegisterUser::new(&stores)
            .by_credentials(EMAIL, USERNAME, PASSWORD)
            .await
            .unwrap();

        let user = UserStore::get_by_email(&stores, EMAIL).await.unwrap().unwrap();
        assert_eq!(user.username, USERNAME);
        assert!(ProfileStore::get(&stores, user.id).await.unwrap().is_some());
        assert!(stores.verify_password(EMAIL, PASSWORD).await.unwrap());
    }

    #[tokio::test]
    async fn register_with_taken_email_fails() {
        let stores = stores_with_user().await;

        let err = RegisterUser::new(&stores)
            .by_credentials(EMAIL, "kent.beck", PASSWORD)
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::UserEmailAlreadyExists));
    }

    #[tokio::test]
    async fn register_with_taken_username_fails() {
        let stores = stores_with_user().await;

        let err = RegisterUser::new(&stores)
            .by_credentials("kent.beck@gmail.com", USERNAME, PASSWORD)
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::UserUsernameAlreadyExists));
    }

    #[tokio::test]
    async fn register_reports_email_conflict_first_when_both_collide() {
        let stores = stores_with_user().await;

        let err = RegisterUser::new(&stores)
            .by_credentials(EMAIL, USERNAME, PASSWORD)
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::UserEmailAlreadyExists));
    }

    #[tokio::test]
    async fn change_password_replaces_the_only_verifying_password() {
        let stores = stores_with_user().await;

        ChangeUserPassword::new(&stores)
            .execute(EMAIL, PASSWORD, "brand.new.password")
            .await
            .unwrap();

        assert!(!stores.verify_password(EMAIL, PASSWORD).await.unwrap());
        assert!(stores
            .verify_password(EMAIL, "brand.new.password")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn change_password_with_wrong_old_password_leaves_hash_untouched() {
        let stores = stores_with_user().await;

        let err = ChangeUserPassword::new(&stores)
            .execute(EMAIL, "not.the.password", "brand.new.password")
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::PasswordIncorrect));
        assert!(stores.verify_password(EMAIL, PASSWORD).await.unwrap());
    }

    #[tokio::test]
    async fn change_password_for_unknown_email_fails() {
        let stores = MemoryStores::default();

        let err = ChangeUserPassword::new(&stores)
            .execute(EMAIL, PASSWORD, "whatever")
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::UserEmailDoesNotExist));
    }

    #[tokio::test]
    async fn password_recovery_token_is_single_use() {
        let stores = stores_with_user().await;
        let states = MemoryRecoveryStates::default();

        let identifier = RequestUserPasswordRecovery::new(&stores, &states)
            .execute(EMAIL)
            .await
            .unwrap();

        let (email, new_password) = RecoverUserPassword::new(&stores, &states)
            .execute(&identifier)
            .await
            .unwrap();
        assert_eq!(email, EMAIL);
        assert!(!stores.verify_password(EMAIL, PASSWORD).await.unwrap());
        assert!(stores.verify_password(EMAIL, &new_password).await.unwrap());

        let err = RecoverUserPassword::new(&stores, &states)
            .execute(&identifier)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AppError::Domain(DomainError::RecoveryPasswordAlreadySent)
        );
    }

    #[tokio::test]
    async fn recovery_request_for_unknown_email_fails() {
        let stores = MemoryStores::default();
        let states = MemoryRecoveryStates::default();

        let err = RequestUserPasswordRecovery::new(&stores, &states)
            .execute(EMAIL)
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::UserEmailDoesNotExist));
    }

    #[tokio::test]
    async fn recovery_with_unknown_identifier_fails() {
        let stores = stores_with_user().await;
        let states = MemoryRecoveryStates::default();

        let err = RecoverUserPassword::new(&stores, &states)
            .execute("deadbeefdeadbeefdeadbeefdeadbeef")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AppError::Domain(DomainError::UserIdentifierDoesNotExist)
        );
    }

    #[tokio::test]
    async fn email_confirm_round_trip_and_replay() {
        let stores = stores_with_user().await;
        let states = MemoryRecoveryStates::default();

        let identifier = RequestUserEmailConfirm::new(&stores, &states)
            .execute(EMAIL)
            .await
            .unwrap();

        ConfirmUserEmail::new(&stores, &states)
            .execute(&identifier)
            .await
            .unwrap();
        assert!(stores.is_email_confirmed(EMAIL).await.unwrap());

        let err = ConfirmUserEmail::new(&stores, &states)
            .execute(&identifier)
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Domain(DomainError::EmailAlreadyConfirmed));
        assert!(stores.is_email_confirmed(EMAIL).await.unwrap());
    }

    #[tokio::test]
    async fn change_email_updates_lookup() {
        let stores = stores_with_user().await;

        ChangeUserEmail::new(&stores)
            .execute(USERNAME, "fowler@thoughtworks.com")
            .await
            .unwrap();

        assert!(!stores.does_exist_by_email(EMAIL).await.unwrap());
        assert!(stores
            .does_exist_by_email("fowler@thoughtworks.com")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn change_email_for_unknown_username_fails() {
        let stores = MemoryStores::default();

        let err = ChangeUserEmail::new(&stores)
            .execute(USERNAME, "fowler@thoughtworks.com")
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::UserUsernameDoesNotExist));
    }

    #[tokio::test]
    async fn profile_update_is_partial() {
        let stores = stores_with_user().await;

        UpdateUserProfile::new(&stores, &stores)
            .execute(
                EMAIL,
                &ProfilePatch {
                    location: Some("San Francisco, USA".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        UpdateUserProfile::new(&stores, &stores)
            .execute(
                EMAIL,
                &ProfilePatch {
                    first_name: Some("Martin".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let profile = GetUserProfile::new(&stores, &stores)
            .execute(USERNAME)
            .await
            .unwrap();
        assert_eq!(profile.location, "San Francisco, USA");
        assert_eq!(profile.first_name, "Martin");
        assert_eq!(profile.last_name, "");
        assert_eq!(profile.user.username, USERNAME);
    }

    #[tokio::test]
    async fn profile_update_for_unknown_email_fails() {
        let stores = MemoryStores::default();

        let err = UpdateUserProfile::new(&stores, &stores)
            .execute(EMAIL, &ProfilePatch::default())
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::UserEmailDoesNotExist));
    }

    #[tokio::test]
    async fn get_user_strips_nothing_it_should_keep() {
        let stores = stores_with_user().await;

        let user = GetUser::new(&stores).execute(USERNAME).await.unwrap();

        assert_eq!(user.email, EMAIL);
        assert_eq!(user.username, USERNAME);
        assert!(user.is_active);
        assert!(!user.is_staff);
    }

    #[tokio::test]
    async fn get_unknown_user_fails() {
        let stores = MemoryStores::default();

        let err = GetUser::new(&stores).execute(USERNAME).await.unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::UserUsernameDoesNotExist));
    }

    #[tokio::test]
    async fn delete_user_is_existence_guarded() {
        let stores = MemoryStores::default();

        let err = DeleteUser::new(&stores).execute(USERNAME).await.unwrap_err();

        assert_eq!(err, AppError::Domain(DomainError::UserUsernameDoesNotExist));
    }

    #[tokio::test]
    async fn delete_user_removes_account() {
        let stores = stores_with_user().await;

        DeleteUser::new(&stores).execute(USERNAME).await.unwrap();

        assert!(!stores.does_exist_by_username(USERNAME).await.unwrap());
        assert!(!stores.does_exist_by_email(EMAIL).await.unwrap());
    }

    #[tokio::test]
    async fn delete_user_cascades_to_owned_records_only() {
        use crate::store::{
            BlockProducerCommentStore, BlockProducerLikeStore, BlockProducerStore,
            NewBlockProducer,
        };

        let stores = stores_with_user().await;
        stores
            .create_with_email("kent.beck@gmail.com", "kent.beck", "kent.beck.1337")
            .await
            .unwrap();
        let martin = UserStore::get_by_email(&stores, EMAIL).await.unwrap().unwrap();
        let kent = UserStore::get_by_email(&stores, "kent.beck@gmail.com")
            .await
            .unwrap()
            .unwrap();

        let info = NewBlockProducer {
            name: "Block producer USA".to_string(),
            website_url: "https://bpusa.com".to_string(),
            short_description: "Leading block producer".to_string(),
            ..Default::default()
        };
        BlockProducerStore::create(&stores, martin.id, &info).await.unwrap();
        BlockProducerStore::create(&stores, kent.id, &info).await.unwrap();
        let martins_bp = stores.get_last(martin.id).await.unwrap().unwrap();
        let kents_bp = stores.get_last(kent.id).await.unwrap().unwrap();

        // kent likes and comments on martin's block producer
        BlockProducerLikeStore::create(&stores, kent.id, martins_bp.id)
            .await
            .unwrap();
        BlockProducerCommentStore::create(&stores, kent.id, martins_bp.id, "Nice.")
            .await
            .unwrap();

        DeleteUser::new(&stores).execute(USERNAME).await.unwrap();

        assert!(!BlockProducerStore::does_exist(&stores, martins_bp.id)
            .await
            .unwrap());
        assert!(!BlockProducerLikeStore::does_exist(&stores, kent.id, martins_bp.id)
            .await
            .unwrap());
        assert!(BlockProducerStore::does_exist(&stores, kents_bp.id)
            .await
            .unwrap());
        assert!(stores.does_exist_by_username("kent.beck").await.unwrap());
    }
}
