//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use rolegate_application::{NewUser, UserChanges, UserCredentials, UserRepository};
use rolegate_core::{AppError, AppResult, ConflictKind, UserId};
use rolegate_domain::{EmailAddress, User, UserWithRole};

use crate::postgres_authorization_repository::fetch_users_with_roles;
use crate::postgres_rows::{UserRow, read_error, write_error};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

mod account;
mod lookup;


#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn list_users_with_roles(&self) -> AppResult<Vec<UserWithRole>> {
        fetch_users_with_roles(&self.pool, None).await
    }

    async fn find_user_with_role(&self, user_id: UserId) -> AppResult<Option<UserWithRole>> {
        Ok(fetch_users_with_roles(&self.pool, Some(user_id))
            .await?
            .into_iter()
            .next())
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        self.create_impl(input).await
    }

    async fn update_user(&self, user_id: UserId, changes: UserChanges) -> AppResult<User> {
        self.update_impl(user_id, changes).await
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.delete_impl(user_id).await
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        self.find_credentials_by_email_impl(email).await
    }
}

fn user_write_error(error: sqlx::Error, operation: &str, email: Option<&EmailAddress>) -> AppError {
    write_error(
        error,
        operation,
        email.map(|email| {
            (
                ConflictKind::DuplicateEmail,
                format!("an account with email '{}' already exists", email.as_str()),
            )
        }),
        Some("role not found".to_owned()),
    )
}
