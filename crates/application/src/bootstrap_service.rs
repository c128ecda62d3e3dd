use std::sync::Arc;

use rolegate_core::{AppError, AppResult, ConflictKind, NonEmptyString, UserId};
use rolegate_domain::{
    AdminPermission, EmailAddress, Permission, Role, RoleSlug, validate_password,
};
use tracing::info;

use crate::{
    GrantInsertMode, NewPermission, NewRole, NewUser, PasswordHasher, PermissionRepository,
    RoleRepository, UserRepository,
};

/// Slug of the role that holds every administrative permission.
pub const ADMINISTRATOR_ROLE_SLUG: &str = "admin";

/// Administrator account to provision at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdministratorAccount {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Display name.
    pub name: String,
}

/// What a bootstrap run changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// The administrator role.
    pub role: Role,
    /// Administrative permissions registered by this run.
    pub created_permissions: usize,
    /// Grants added to the administrator role by this run.
    pub granted_permissions: usize,
    /// Administrator account created by this run.
    pub created_administrator: Option<UserId>,
}

/// Seeds the administrative permission catalogue and the administrator role.
///
/// Runs without a caller identity and is idempotent.
#[derive(Clone)]
pub struct BootstrapService {
    permission_repository: Arc<dyn PermissionRepository>,
    role_repository: Arc<dyn RoleRepository>,
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl BootstrapService {
    /// Creates a new bootstrap service.
    #[must_use]
    pub fn new(
        permission_repository: Arc<dyn PermissionRepository>,
        role_repository: Arc<dyn RoleRepository>,
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            permission_repository,
            role_repository,
            user_repository,
            password_hasher,
        }
    }

    /// Ensures every administrative permission, the administrator role and,
    /// when configured, an administrator account exist.
    pub async fn ensure_administrator(
        &self,
        account: Option<AdministratorAccount>,
    ) -> AppResult<BootstrapReport> {
        let mut permission_ids = Vec::with_capacity(AdminPermission::all().len());
        let mut created_permissions = 0;
        for permission in AdminPermission::all() {
            let (stored, created) = self.ensure_permission(*permission).await?;
            permission_ids.push(stored.id());
            if created {
                created_permissions += 1;
            }
        }

        let role = self.ensure_role().await?;
        let granted_permissions = self
            .role_repository
            .insert_role_grants(role.id(), &permission_ids, GrantInsertMode::SkipExisting)
            .await?;

        let created_administrator = match account {
            Some(account) => self.ensure_account(&role, account).await?,
            None => None,
        };

        info!(
            role_id = %role.id(),
            created_permissions,
            granted_permissions,
            created_administrator = created_administrator.is_some(),
            "administrator bootstrap complete"
        );

        Ok(BootstrapReport {
            role,
            created_permissions,
            granted_permissions,
            created_administrator,
        })
    }

    async fn ensure_permission(&self, permission: AdminPermission) -> AppResult<(Permission, bool)> {
        let key = permission.key()?;
        if let Some(existing) = self.permission_repository.find_permission_by_key(&key).await? {
            return Ok((existing, false));
        }

        match self
            .permission_repository
            .create_permission(NewPermission {
                key: key.clone(),
                description: Some(format!(
                    "Allows {} on {}",
                    permission.operation(),
                    permission.entity()
                )),
            })
            .await
        {
            Ok(created) => Ok((created, true)),
            Err(AppError::Conflict(ConflictKind::DuplicateKey, _)) => self
                .permission_repository
                .find_permission_by_key(&key)
                .await?
                .map(|existing| (existing, false))
                .ok_or_else(|| {
                    AppError::Internal(format!("permission '{key}' vanished during bootstrap"))
                }),
            Err(error) => Err(error),
        }
    }

    async fn ensure_role(&self) -> AppResult<Role> {
        let slug = RoleSlug::new(ADMINISTRATOR_ROLE_SLUG)?;
        if let Some(role) = self.role_repository.find_role_by_slug(&slug).await? {
            return Ok(role);
        }

        self.role_repository
            .create_role(NewRole {
                slug,
                name: NonEmptyString::new("Administrator")?,
                disabled: false,
            })
            .await
    }

    async fn ensure_account(
        &self,
        role: &Role,
        account: AdministratorAccount,
    ) -> AppResult<Option<UserId>> {
        let email = EmailAddress::new(account.email)?;
        if self
            .user_repository
            .find_credentials_by_email(&email)
            .await?
            .is_some()
        {
            return Ok(None);
        }

        validate_password(&account.password)?;
        let password_hash = self.password_hasher.hash_password(&account.password)?;
        let user = self
            .user_repository
            .create_user(NewUser {
                email,
                name: NonEmptyString::new(account.name)?,
                password_hash,
                role_id: Some(role.id()),
            })
            .await?;

        Ok(Some(user.id()))
    }
}

