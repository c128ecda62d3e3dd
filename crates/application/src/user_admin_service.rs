use std::sync::Arc;

use rolegate_core::{AppError, AppResult, UserId, UserIdentity};
use rolegate_domain::{
    AdminPermission, EmailAddress, RoleId, User, UserProfile, UserWithRole, validate_password,
};
use tracing::info;

use crate::validation::{Violations, resolve_id};
use crate::{AuthorizationService, NewUser, PasswordHasher, UserChanges, UserRepository};

/// Raw payload for creating a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Role id the account starts with.
    pub role_id: String,
}

/// Raw payload for a partial user update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement role id.
    pub role_id: Option<String>,
}

/// Application service for user account administration.
#[derive(Clone)]
pub struct UserAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl UserAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            password_hasher,
        }
    }

    /// Lists users with their roles.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<UserWithRole>> {
        self.authorization_service
            .require_permission(actor, AdminPermission::UsersRead)
            .await?;

        self.repository.list_users_with_roles().await
    }

    /// Returns a user in profile shape with effective permissions.
    pub async fn get_user(
        &self,
        actor: &UserIdentity,
        user_id: impl TryInto<UserId, Error: Into<AppError>>,
    ) -> AppResult<UserProfile> {
        self.authorization_service
            .require_permission(actor, AdminPermission::UsersRead)
            .await?;
        let user_id: UserId = resolve_id(user_id)?;

        self.profile_of(user_id).await
    }

    /// Creates a user account and returns its profile.
    pub async fn create_user(
        &self,
        actor: &UserIdentity,
        input: CreateUserInput,
    ) -> AppResult<UserProfile> {
        self.authorization_service
            .require_permission(actor, AdminPermission::UsersCreate)
            .await?;

        let mut violations = Violations::new();
        let email = violations.check("email", EmailAddress::new(input.email));
        let name = violations.require_text("name", input.name);
        violations.check("password", validate_password(&input.password));
        let role_id = violations.check("role_id", RoleId::parse(&input.role_id));

        let (Some(email), Some(name), Some(role_id)) = (email, name, role_id) else {
            return Err(violations.into_error());
        };
        violations.finish()?;

        let password_hash = self.password_hasher.hash_password(&input.password)?;
        let user = self
            .repository
            .create_user(NewUser {
                email,
                name,
                password_hash,
                role_id: Some(role_id),
            })
            .await?;

        info!(
            actor = %actor.user_id(),
            user_id = %user.id(),
            "user created"
        );

        self.profile_of(user.id()).await
    }

    /// Updates a user's name or role.
    pub async fn update_user(
        &self,
        actor: &UserIdentity,
        user_id: impl TryInto<UserId, Error: Into<AppError>>,
        input: UpdateUserInput,
    ) -> AppResult<User> {
        self.authorization_service
            .require_permission(actor, AdminPermission::UsersUpdate)
            .await?;
        let user_id: UserId = resolve_id(user_id)?;

        let mut violations = Violations::new();
        let name = violations.optional_text("name", input.name);
        let role_id = input
            .role_id
            .and_then(|value| violations.check("role_id", RoleId::parse(&value)));
        violations.finish()?;

        let user = self
            .repository
            .update_user(user_id, UserChanges { name, role_id })
            .await?;

        info!(actor = %actor.user_id(), user_id = %user_id, "user updated");
        Ok(user)
    }

    /// Assigns a role to a user.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        user_id: impl TryInto<UserId, Error: Into<AppError>>,
        role_id: impl TryInto<RoleId, Error: Into<AppError>>,
    ) -> AppResult<User> {
        self.authorization_service
            .require_permission(actor, AdminPermission::UsersUpdate)
            .await?;
        let user_id: UserId = resolve_id(user_id)?;
        let role_id: RoleId = resolve_id(role_id)?;

        let user = self
            .repository
            .update_user(
                user_id,
                UserChanges {
                    name: None,
                    role_id: Some(role_id),
                },
            )
            .await?;

        info!(
            actor = %actor.user_id(),
            user_id = %user_id,
            role_id = %role_id,
            "role assigned to user"
        );
        Ok(user)
    }

    /// Deletes a user account.
    pub async fn delete_user(
        &self,
        actor: &UserIdentity,
        user_id: impl TryInto<UserId, Error: Into<AppError>>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, AdminPermission::UsersDelete)
            .await?;
        let user_id: UserId = resolve_id(user_id)?;

        self.repository.delete_user(user_id).await?;

        info!(actor = %actor.user_id(), user_id = %user_id, "user deleted");
        Ok(())
    }

    /// Returns the caller's own profile. Needs no permission.
    pub async fn me(&self, actor: &UserIdentity) -> AppResult<UserProfile> {
        self.authorization_service
            .resolver()
            .resolve(actor.user_id())
            .await?
            .ok_or_else(|| AppError::NotFound("user profile not found".to_owned()))
    }

    async fn profile_of(&self, user_id: UserId) -> AppResult<UserProfile> {
        self.authorization_service
            .resolver()
            .resolve(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }
}

#[cfg(test)]
mod tests;
