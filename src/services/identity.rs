//! Registration, login and "who am I" lookups.
//!
//! Every user returned from this service has been projected onto [`PublicUser`];
//! the stored password hash never leaves it.

use log::{info, warn};
use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::error::AppError;
use crate::models::{NewUser, PublicUser};
use crate::store::UserStore;

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<PublicUser, AppError> {
        // The store's unique constraint still decides a race between two callers.
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::UsernameTaken);
        }

        let password_hash = self.hasher.hash_blocking(password).await?;
        let user = self
            .users
            .create(NewUser {
                name: name.to_string(),
                username: username.to_string(),
                password_hash,
            })
            .await?;

        info!("registered user {} (id {})", user.username, user.id);
        Ok(user.into_public())
    }

    /// Unknown usernames and wrong passwords both fail with `InvalidCredentials`.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, PublicUser), AppError> {
        let user = self.users.find_by_username(username).await?;

        let verified = self
            .hasher
            .verify_blocking(password, user.as_ref().map(|u| u.password_hash.as_str()))
            .await?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!("failed login attempt for username {}", username);
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(&user)?;
        info!("user {} logged in", user.id);
        Ok((token, user.into_public()))
    }

    /// `user_id` comes from an already resolved token.
    pub async fn who_am_i(&self, user_id: i32) -> Result<PublicUser, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| user.into_public())
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Registers `username` unless it already exists. Returns whether an account was created.
    pub async fn ensure_user(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<bool, AppError> {
        match self.register(name, username, password).await {
            Ok(_) => Ok(true),
            Err(AppError::UsernameTaken) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn service() -> IdentityService {
        IdentityService::new(
            Arc::new(MemoryStore::new()),
            PasswordHasher::new(4).unwrap(),
            TokenService::new(b"identity_test_secret_0123456789abcdef", Duration::hours(1)),
        )
    }

    #[actix_rt::test]
    async fn test_register_then_login_resolves_to_same_user() {
        let service = service();
        let ann = service.register("Ann", "ann", "pw1").await.unwrap();
        assert_eq!(ann.name, "Ann");
        assert_eq!(ann.username, "ann");

        let (token, user) = service.login("ann", "pw1").await.unwrap();
        assert_eq!(user, ann);

        let claims = service.tokens().resolve(&token).unwrap();
        assert_eq!(claims.user_id, ann.id);
        assert_eq!(claims.username, "ann");
    }

    #[actix_rt::test]
    async fn test_duplicate_username_is_rejected() {
        let service = service();
        service.register("Ann", "ann", "pw1").await.unwrap();

        let second = service.register("Another Ann", "ann", "different").await;
        assert_eq!(second.unwrap_err(), AppError::UsernameTaken);
    }

    #[actix_rt::test]
    async fn test_usernames_are_case_sensitive() {
        let service = service();
        service.register("Ann", "ann", "pw1").await.unwrap();
        assert!(service.register("ANN", "Ann", "pw1").await.is_ok());
    }

    #[actix_rt::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service();
        service.register("Ann", "ann", "pw1").await.unwrap();

        let wrong_password = service.login("ann", "nope").await.unwrap_err();
        let unknown_user = service.login("nobody", "pw1").await.unwrap_err();

        assert_eq!(wrong_password, AppError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_user);
    }

    #[actix_rt::test]
    async fn test_long_multibyte_password_cannot_share_a_prefix() {
        let service = service();
        let prefix = "é".repeat(36);

        let too_long = service
            .register("Ann", "ann", &format!("{}secretA", prefix))
            .await;
        assert!(matches!(too_long, Err(AppError::ValidationError(_))));

        service.register("Ann", "ann", &prefix).await.unwrap();
        let imposter = service
            .login("ann", &format!("{}totally-different", prefix))
            .await;
        assert_eq!(imposter.unwrap_err(), AppError::InvalidCredentials);
        assert!(service.login("ann", &prefix).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_who_am_i() {
        let service = service();
        let ann = service.register("Ann", "ann", "pw1").await.unwrap();

        assert_eq!(service.who_am_i(ann.id).await.unwrap(), ann);
        assert!(matches!(
            service.who_am_i(ann.id + 100).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_ensure_user_is_idempotent() {
        let service = service();
        assert!(service.ensure_user("Admin", "admin", "admin123").await.unwrap());
        assert!(!service.ensure_user("Admin", "admin", "other").await.unwrap());
        assert!(service.login("admin", "admin123").await.is_ok());
    }
}
