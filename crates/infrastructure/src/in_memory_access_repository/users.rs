use async_trait::async_trait;
use chrono::Utc;
use rolegate_application::{NewUser, UserChanges, UserCredentials, UserRepository};
use rolegate_core::{AppError, AppResult, ConflictKind, UserId};
use rolegate_domain::{EmailAddress, User, UserWithRole};

use super::{InMemoryAccessRepository, StoredUser};

#[async_trait]
impl UserRepository for InMemoryAccessRepository {
    async fn list_users_with_roles(&self) -> AppResult<Vec<UserWithRole>> {
        let state = self.state.read().await;
        let mut users: Vec<&StoredUser> = state.users.values().collect();
        users.sort_by(|left, right| right.sequence.cmp(&left.sequence));
        Ok(users
            .into_iter()
            .map(|stored| state.user_with_role(stored))
            .collect())
    }

    async fn find_user_with_role(&self, user_id: UserId) -> AppResult<Option<UserWithRole>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&user_id)
            .map(|stored| state.user_with_role(stored)))
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|stored| stored.user.email() == &input.email)
        {
            return Err(AppError::Conflict(
                ConflictKind::DuplicateEmail,
                format!(
                    "an account with email '{}' already exists",
                    input.email.as_str()
                ),
            ));
        }

        if let Some(role_id) = input.role_id
            && !state.roles.contains_key(&role_id)
        {
            return Err(AppError::NotFound("role not found".to_owned()));
        }

        let user = User::new(
            UserId::new(),
            input.email,
            input.name,
            input.role_id,
            Utc::now(),
        );
        let sequence = state.next_sequence();
        state.users.insert(
            user.id(),
            StoredUser {
                sequence,
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn update_user(&self, user_id: UserId, changes: UserChanges) -> AppResult<User> {
        let mut state = self.state.write().await;
        if let Some(role_id) = changes.role_id
            && !state.roles.contains_key(&role_id)
        {
            return Err(AppError::NotFound("role not found".to_owned()));
        }

        let Some(stored) = state.users.get_mut(&user_id) else {
            return Err(AppError::NotFound(format!("user '{user_id}' not found")));
        };

        let current = &stored.user;
        let user = User::new(
            current.id(),
            current.email().clone(),
            changes.name.unwrap_or_else(|| current.name().clone()),
            changes.role_id.or(current.role_id()),
            current.created_at(),
        );
        stored.user = user.clone();
        Ok(user)
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.state
            .write()
            .await
            .users
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|stored| stored.user.email() == email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }
}
