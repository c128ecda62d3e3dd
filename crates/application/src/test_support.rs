use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;

use rolegate_core::{AppResult, NonEmptyString, UserId, UserIdentity};
use rolegate_domain::{
    EmailAddress, Permission, PermissionId, Role, RoleId, RoleSlug, RoleWithPermissions, User,
    UserWithRole, build_key,
};

use crate::AuthorizationRepository;

pub(crate) fn permission(entity: &str, operation: &str) -> Permission {
    match build_key(entity, operation) {
        Ok(key) => Permission::new(PermissionId::new(), key, None),
        Err(error) => panic!("test key should be valid: {error}"),
    }
}

pub(crate) fn role_with(
    slug: &str,
    disabled: bool,
    permissions: Vec<Permission>,
) -> RoleWithPermissions {
    let (Ok(slug), Ok(name)) = (RoleSlug::new(slug), NonEmptyString::new(slug)) else {
        panic!("test role should be valid");
    };

    RoleWithPermissions {
        role: Role::new(RoleId::new(), slug, name, disabled, Utc::now()),
        permissions,
    }
}

pub(crate) fn user_with(email: &str, role: Option<RoleWithPermissions>) -> UserWithRole {
    let (Ok(address), Ok(name)) = (EmailAddress::new(email), NonEmptyString::new(email)) else {
        panic!("test user should be valid");
    };
    let role_id = role.as_ref().map(|role| role.role.id());

    UserWithRole {
        user: User::new(UserId::new(), address, name, role_id, Utc::now()),
        role,
    }
}

pub(crate) fn identity_for(user: &UserWithRole) -> UserIdentity {
    UserIdentity::new(
        user.user.id(),
        user.user.name().as_str(),
        user.user.email().as_str(),
    )
}

#[derive(Default)]
pub(crate) struct FakeAuthorizationRepository {
    users: HashMap<UserId, UserWithRole>,
}

impl FakeAuthorizationRepository {
    pub(crate) fn with_users(users: impl IntoIterator<Item = UserWithRole>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.user.id(), user))
                .collect(),
        }
    }
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn find_user_with_role(&self, user_id: UserId) -> AppResult<Option<UserWithRole>> {
        Ok(self.users.get(&user_id).cloned())
    }
}
