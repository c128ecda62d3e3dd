//! Password authentication against stored credentials.
//!
//! Every failed attempt yields `None` and still computes a hash, so neither the
//! response nor its timing reveals whether the email exists.

use std::sync::Arc;

use rolegate_core::{AppResult, UserIdentity};
use rolegate_domain::EmailAddress;
use tracing::info;

use crate::{PasswordHasher, UserRepository};

/// Application service for password login.
#[derive(Clone)]
pub struct AuthenticationService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl AuthenticationService {
    /// Creates a new authentication service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Verifies credentials and returns the identity to store in the session.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Option<UserIdentity>> {
        let Ok(email) = EmailAddress::new(email) else {
            let _ = self.password_hasher.hash_password(password);
            return Ok(None);
        };

        let Some(credentials) = self.user_repository.find_credentials_by_email(&email).await?
        else {
            let _ = self.password_hasher.hash_password(password);
            info!(outcome = "unknown_email", "login failed");
            return Ok(None);
        };

        if !self
            .password_hasher
            .verify_password(password, &credentials.password_hash)?
        {
            info!(
                user_id = %credentials.user.id(),
                outcome = "invalid_password",
                "login failed"
            );
            return Ok(None);
        }

        let user = credentials.user;
        info!(user_id = %user.id(), "login succeeded");

        Ok(Some(UserIdentity::new(
            user.id(),
            user.name().as_str(),
            user.email().as_str(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use rolegate_core::{AppError, AppResult, NonEmptyString, UserId};
    use rolegate_domain::{EmailAddress, User, UserWithRole};

    use crate::{NewUser, PasswordHasher, UserChanges, UserCredentials, UserRepository};

    use super::AuthenticationService;

    struct SingleUserRepository {
        credentials: UserCredentials,
    }

    #[async_trait]
    impl UserRepository for SingleUserRepository {
        async fn list_users_with_roles(&self) -> AppResult<Vec<UserWithRole>> {
            Ok(Vec::new())
        }

        async fn find_user_with_role(&self, _user_id: UserId) -> AppResult<Option<UserWithRole>> {
            Ok(None)
        }

        async fn create_user(&self, _input: NewUser) -> AppResult<User> {
            Err(AppError::Internal("unused in login tests".to_owned()))
        }

        async fn update_user(&self, _user_id: UserId, _changes: UserChanges) -> AppResult<User> {
            Err(AppError::Internal("unused in login tests".to_owned()))
        }

        async fn delete_user(&self, _user_id: UserId) -> AppResult<()> {
            Err(AppError::Internal("unused in login tests".to_owned()))
        }

        async fn find_credentials_by_email(
            &self,
            email: &EmailAddress,
        ) -> AppResult<Option<UserCredentials>> {
            Ok((self.credentials.user.email() == email).then(|| self.credentials.clone()))
        }
    }

    #[derive(Default)]
    struct CountingHasher {
        hashed: AtomicUsize,
    }

    impl PasswordHasher for CountingHasher {
        fn hash_password(&self, password: &str) -> AppResult<String> {
            self.hashed.fetch_add(1, Ordering::SeqCst);
            Ok(format!("hashed:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
            Ok(hash == format!("hashed:{password}"))
        }
    }

    fn service() -> (AuthenticationService, Arc<CountingHasher>, UserId) {
        let (Ok(email), Ok(name)) = (
            EmailAddress::new("admin@example.com"),
            NonEmptyString::new("Admin"),
        ) else {
            panic!("test user should be valid");
        };
        let user = User::new(UserId::new(), email, name, None, Utc::now());
        let user_id = user.id();
        let hasher = Arc::new(CountingHasher::default());
        let repository = SingleUserRepository {
            credentials: UserCredentials {
                user,
                password_hash: "hashed:correct horse".to_owned(),
            },
        };

        (
            AuthenticationService::new(Arc::new(repository), hasher.clone()),
            hasher,
            user_id,
        )
    }

    #[tokio::test]
    async fn login_returns_identity_for_valid_credentials() {
        let (service, _, user_id) = service();

        let identity = service
            .login("ADMIN@example.com", "correct horse")
            .await
            .ok()
            .flatten();

        assert_eq!(identity.map(|identity| identity.user_id()), Some(user_id));
    }

    #[tokio::test]
    async fn wrong_password_fails_generically() {
        let (service, _, _) = service();

        let identity = service.login("admin@example.com", "battery staple").await;
        assert!(matches!(identity, Ok(None)));
    }

    #[tokio::test]
    async fn unknown_email_still_hashes() {
        let (service, hasher, _) = service();

        let identity = service.login("nobody@example.com", "whatever").await;
        assert!(matches!(identity, Ok(None)));
        assert_eq!(hasher.hashed.load(Ordering::SeqCst), 1);
    }
}
