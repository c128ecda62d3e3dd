use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use rolegate_core::{AppError, AppResult, ConflictKind, UserId, UserIdentity};
use rolegate_domain::{EmailAddress, RoleId, User, UserWithRole};

use crate::test_support::{identity_for, permission, role_with, user_with};
use crate::{
    AuthorizationRepository, AuthorizationService, DisabledRolePolicy, NewUser, PasswordHasher,
    PermissionResolver, UserChanges, UserCredentials, UserRepository,
};

use super::{CreateUserInput, UpdateUserInput, UserAdminService};

#[derive(Default)]
struct FakeUserStore {
    users: Mutex<HashMap<UserId, UserWithRole>>,
    hashes: Mutex<HashMap<UserId, String>>,
}

#[async_trait]
impl AuthorizationRepository for FakeUserStore {
    async fn find_user_with_role(&self, user_id: UserId) -> AppResult<Option<UserWithRole>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }
}

#[async_trait]
impl UserRepository for FakeUserStore {
    async fn list_users_with_roles(&self) -> AppResult<Vec<UserWithRole>> {
        Ok(self.users.lock().await.values().cloned().collect())
    }

    async fn find_user_with_role(&self, user_id: UserId) -> AppResult<Option<UserWithRole>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().await;
        if users
            .values()
            .any(|existing| existing.user.email() == &input.email)
        {
            return Err(AppError::Conflict(
                ConflictKind::DuplicateEmail,
                format!("email '{}' is already registered", input.email.as_str()),
            ));
        }

        let user = User::new(
            UserId::new(),
            input.email,
            input.name,
            input.role_id,
            Utc::now(),
        );
        users.insert(
            user.id(),
            UserWithRole {
                user: user.clone(),
                role: None,
            },
        );
        self.hashes
            .lock()
            .await
            .insert(user.id(), input.password_hash);
        Ok(user)
    }

    async fn update_user(&self, user_id: UserId, changes: UserChanges) -> AppResult<User> {
        let mut users = self.users.lock().await;
        let Some(existing) = users.get_mut(&user_id) else {
            return Err(AppError::NotFound(format!("user '{user_id}' not found")));
        };

        let user = User::new(
            existing.user.id(),
            existing.user.email().clone(),
            changes
                .name
                .unwrap_or_else(|| existing.user.name().clone()),
            changes.role_id.or(existing.user.role_id()),
            existing.user.created_at(),
        );
        existing.user = user.clone();
        Ok(user)
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.users
            .lock()
            .await
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserCredentials>> {
        let users = self.users.lock().await;
        let hashes = self.hashes.lock().await;
        Ok(users
            .values()
            .find(|existing| existing.user.email() == email)
            .and_then(|existing| {
                hashes
                    .get(&existing.user.id())
                    .map(|password_hash| UserCredentials {
                        user: existing.user.clone(),
                        password_hash: password_hash.clone(),
                    })
            }))
    }
}

struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

async fn fixture() -> (UserAdminService, Arc<FakeUserStore>, UserIdentity, UserIdentity) {
    let store = Arc::new(FakeUserStore::default());
    let admin = user_with(
        "admin@example.com",
        Some(role_with(
            "admin",
            false,
            vec![
                permission("users", "read"),
                permission("users", "create"),
                permission("users", "update"),
                permission("users", "delete"),
            ],
        )),
    );
    let viewer = user_with(
        "viewer@example.com",
        Some(role_with("viewer", false, vec![permission("users", "read")])),
    );
    let admin_identity = identity_for(&admin);
    let viewer_identity = identity_for(&viewer);
    {
        let mut users = store.users.lock().await;
        users.insert(admin.user.id(), admin);
        users.insert(viewer.user.id(), viewer);
    }

    let authorization_service = AuthorizationService::new(PermissionResolver::new(
        store.clone(),
        DisabledRolePolicy::Revoke,
    ));
    let service = UserAdminService::new(authorization_service, store.clone(), Arc::new(PlainHasher));

    (service, store, admin_identity, viewer_identity)
}

fn new_user_input(email: &str, password: &str) -> CreateUserInput {
    CreateUserInput {
        email: email.to_owned(),
        name: "New Person".to_owned(),
        password: password.to_owned(),
        role_id: RoleId::new().to_string(),
    }
}

#[tokio::test]
async fn create_user_hashes_password_and_returns_profile() {
    let (service, store, admin, _) = fixture().await;

    let profile = service
        .create_user(&admin, new_user_input("New@Example.com", "secret1"))
        .await;
    let Ok(profile) = profile else {
        panic!("user should be created");
    };

    assert_eq!(profile.email().as_str(), "new@example.com");
    assert!(profile.permissions().is_empty());
    assert_eq!(
        store.hashes.lock().await.get(&profile.id()).cloned(),
        Some("hashed:secret1".to_owned())
    );
}

#[tokio::test]
async fn create_user_collects_every_violation() {
    let (service, store, admin, _) = fixture().await;

    let result = service
        .create_user(
            &admin,
            CreateUserInput {
                email: "not-an-email".to_owned(),
                name: String::new(),
                password: "short".to_owned(),
                role_id: "admin".to_owned(),
            },
        )
        .await;

    let Err(AppError::InvalidFields(fields)) = result else {
        panic!("expected field violations");
    };
    let names: Vec<&str> = fields.iter().map(|field| field.field.as_str()).collect();
    assert_eq!(names, vec!["email", "name", "password", "role_id"]);
    assert_eq!(store.users.lock().await.len(), 2);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (service, _, admin, _) = fixture().await;

    let result = service
        .create_user(&admin, new_user_input("viewer@example.com", "secret1"))
        .await;

    assert!(matches!(
        result,
        Err(AppError::Conflict(ConflictKind::DuplicateEmail, _))
    ));
}

#[tokio::test]
async fn viewer_cannot_delete_users() {
    let (service, store, admin, viewer) = fixture().await;

    let result = service.delete_user(&viewer, admin.user_id()).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(store.users.lock().await.len(), 2);
}

#[tokio::test]
async fn update_missing_user_is_not_found() {
    let (service, _, admin, _) = fixture().await;

    let result = service
        .update_user(
            &admin,
            UserId::new(),
            UpdateUserInput {
                name: Some("Renamed".to_owned()),
                role_id: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn me_returns_profile_without_permission_check() {
    let (service, _, _, viewer) = fixture().await;

    let profile = service.me(&viewer).await;
    assert_eq!(
        profile.map(|profile| profile.email().as_str().to_owned()).ok(),
        Some("viewer@example.com".to_owned())
    );

    let stranger = UserIdentity::new(UserId::new(), "Stranger", "stranger@example.com");
    assert!(matches!(
        service.me(&stranger).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn assign_role_sets_the_role_and_requires_update() {
    let (service, store, admin, viewer) = fixture().await;
    let role_id = RoleId::new();

    let denied = service
        .assign_role(&viewer, viewer.user_id(), role_id)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let Ok(user) = service.assign_role(&admin, viewer.user_id(), role_id).await else {
        panic!("role should be assigned");
    };
    assert_eq!(user.role_id(), Some(role_id));
    assert_eq!(
        store
            .users
            .lock()
            .await
            .get(&viewer.user_id())
            .and_then(|entry| entry.user.role_id()),
        Some(role_id)
    );
}

#[tokio::test]
async fn create_user_requires_a_role() {
    let (service, store, admin, _) = fixture().await;

    let result = service
        .create_user(
            &admin,
            CreateUserInput {
                role_id: String::new(),
                ..new_user_input("norole@example.com", "secret1")
            },
        )
        .await;

    let Err(AppError::InvalidFields(fields)) = result else {
        panic!("expected field violations");
    };
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field, "role_id");
    assert_eq!(store.users.lock().await.len(), 2);
}
