use std::sync::Arc;

use rolegate_application::{
    AdministratorAccount, AuthenticationService, AuthorizationDecision, AuthorizationService,
    BootstrapService, BundleService, CreateBundleInput, CreatePermissionInput, CreateRoleInput,
    CreateUserInput, DenyReason, DisabledRolePolicy, PasswordHasher, PermissionRepository,
    PermissionResolver, PermissionService, RoleService, UpdateBundleInput, UpdateRoleInput,
    UserAdminService,
};
use rolegate_core::{AppError, AppResult, ConflictKind, UserId, UserIdentity};
use rolegate_domain::{Permission, PermissionId, PermissionKey, Role, RoleId, build_key};

use super::InMemoryAccessRepository;
use crate::Argon2PasswordHasher;

struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("plain:{password}"))
    }
}

struct Harness {
    repository: Arc<InMemoryAccessRepository>,
    authorization: AuthorizationService,
    permissions: PermissionService,
    roles: RoleService,
    users: UserAdminService,
    bundles: BundleService,
    bootstrap: BootstrapService,
    admin: UserIdentity,
}

async fn harness_with(policy: DisabledRolePolicy, hasher: Arc<dyn PasswordHasher>) -> Harness {
    let repository = Arc::new(InMemoryAccessRepository::new());
    let authorization = AuthorizationService::new(PermissionResolver::new(repository.clone(), policy));
    let bootstrap = BootstrapService::new(
        repository.clone(),
        repository.clone(),
        repository.clone(),
        hasher.clone(),
    );

    let report = bootstrap
        .ensure_administrator(Some(AdministratorAccount {
            email: "admin@example.com".to_owned(),
            password: "admin-secret".to_owned(),
            name: "Admin".to_owned(),
        }))
        .await;
    let Ok(report) = report else {
        panic!("bootstrap should succeed");
    };
    let Some(admin_id) = report.created_administrator else {
        panic!("bootstrap should create the administrator");
    };

    Harness {
        permissions: PermissionService::new(authorization.clone(), repository.clone()),
        roles: RoleService::new(authorization.clone(), repository.clone(), repository.clone()),
        users: UserAdminService::new(authorization.clone(), repository.clone(), hasher),
        bundles: BundleService::new(authorization.clone(), repository.clone()),
        admin: UserIdentity::new(admin_id, "Admin", "admin@example.com"),
        repository,
        authorization,
        bootstrap,
    }
}

async fn harness() -> Harness {
    harness_with(DisabledRolePolicy::Revoke, Arc::new(PlainHasher)).await
}

impl Harness {
    async fn permission(&self, entity: &str, operation: &str) -> Permission {
        let created = self
            .permissions
            .create_permission(
                &self.admin,
                CreatePermissionInput {
                    entity: entity.to_owned(),
                    operation: operation.to_owned(),
                    description: None,
                },
            )
            .await;
        match created {
            Ok(permission) => permission,
            Err(error) => panic!("permission should be created: {error}"),
        }
    }

    async fn role(&self, slug: &str, permissions: &[&Permission]) -> Role {
        let created = self
            .roles
            .create_role(
                &self.admin,
                CreateRoleInput {
                    slug: slug.to_owned(),
                    name: slug.to_owned(),
                    disabled: false,
                },
            )
            .await;
        let Ok(role) = created else {
            panic!("role should be created");
        };

        if !permissions.is_empty() {
            let ids = ids_of(permissions);
            let assigned = self.roles.assign_permissions(&self.admin, role.id(), &ids).await;
            assert_eq!(assigned.ok(), Some(permissions.len()));
        }

        role
    }

    async fn member(&self, email: &str, role: &Role) -> UserIdentity {
        let created = self
            .users
            .create_user(
                &self.admin,
                CreateUserInput {
                    email: email.to_owned(),
                    name: email.to_owned(),
                    password: "member-secret".to_owned(),
                    role_id: role.id().to_string(),
                },
            )
            .await;
        let Ok(profile) = created else {
            panic!("user should be created");
        };

        UserIdentity::new(profile.id(), profile.name(), profile.email().as_str())
    }

    async fn decide(&self, user: &UserIdentity, key: &str) -> AuthorizationDecision {
        let Ok(key) = key.parse::<PermissionKey>() else {
            panic!("test key should be valid");
        };
        match self.authorization.authorize(user.user_id(), &key).await {
            Ok(decision) => decision,
            Err(error) => panic!("authorization should not fail: {error}"),
        }
    }
}

fn ids_of(permissions: &[&Permission]) -> Vec<String> {
    permissions
        .iter()
        .map(|permission| permission.id().to_string())
        .collect()
}

fn keys_of(permissions: &[Permission]) -> Vec<&str> {
    permissions
        .iter()
        .map(|permission| permission.key().as_str())
        .collect()
}

#[tokio::test]
async fn admin_creates_role_that_appears_in_listing() {
    let harness = harness().await;

    assert_eq!(
        harness.decide(&harness.admin, "roles.create").await,
        AuthorizationDecision::Allow
    );

    let created = harness
        .roles
        .create_role(
            &harness.admin,
            CreateRoleInput {
                slug: "ops".to_owned(),
                name: "Operations".to_owned(),
                disabled: false,
            },
        )
        .await;
    assert!(created.is_ok());

    let roles = harness.roles.list_roles(&harness.admin).await.unwrap_or_default();
    let slugs: Vec<&str> = roles.iter().map(|role| role.slug().as_str()).collect();
    assert_eq!(slugs, vec!["ops", "admin"]);
}

#[tokio::test]
async fn viewer_is_denied_and_nothing_is_created() {
    let harness = harness().await;
    let Ok(read_key) = build_key("roles", "read") else {
        panic!("test key should be valid");
    };
    let Ok(Some(read_permission)) = harness.repository.find_permission_by_key(&read_key).await
    else {
        panic!("bootstrap should register roles.read");
    };
    let viewer_role = harness.role("viewer", &[&read_permission]).await;
    let viewer = harness.member("viewer@example.com", &viewer_role).await;

    assert_eq!(
        harness.decide(&viewer, "roles.create").await,
        AuthorizationDecision::Deny(DenyReason::InsufficientPermission)
    );
    assert_eq!(
        harness.decide(&viewer, "roles.read").await,
        AuthorizationDecision::Allow
    );

    let attempt = harness
        .roles
        .create_role(
            &viewer,
            CreateRoleInput {
                slug: "ops".to_owned(),
                name: "Operations".to_owned(),
                disabled: false,
            },
        )
        .await;
    assert!(matches!(attempt, Err(AppError::Forbidden(_))));

    let roles = harness.roles.list_roles(&viewer).await.unwrap_or_default();
    assert!(roles.iter().all(|role| role.slug().as_str() != "ops"));
    assert_eq!(roles.len(), 2);
}

#[tokio::test]
async fn duplicate_permission_key_is_a_conflict() {
    let harness = harness().await;
    let input = CreatePermissionInput {
        entity: "leads".to_owned(),
        operation: "create".to_owned(),
        description: Some("Create leads".to_owned()),
    };

    let first = harness
        .permissions
        .create_permission(&harness.admin, input.clone())
        .await;
    assert_eq!(
        first.as_ref().map(|permission| permission.key().as_str()).ok(),
        Some("leads.create")
    );

    let second = harness
        .permissions
        .create_permission(&harness.admin, input)
        .await;
    assert!(matches!(
        second,
        Err(AppError::Conflict(ConflictKind::DuplicateKey, _))
    ));
}

#[tokio::test]
async fn bundle_assignment_copies_grants_into_role() {
    let harness = harness().await;
    let read = harness.permission("leads", "read").await;
    let create = harness.permission("leads", "create").await;
    let sales = harness.role("sales", &[]).await;
    let seller = harness.member("seller@example.com", &sales).await;

    let bundle = harness
        .bundles
        .create_bundle(
            &harness.admin,
            CreateBundleInput {
                name: "Lead management".to_owned(),
                description: None,
                permission_ids: ids_of(&[&read, &create]),
            },
        )
        .await;
    let Ok(bundle) = bundle else {
        panic!("bundle should be created");
    };

    let inserted = harness
        .roles
        .assign_bundle(&harness.admin, sales.id(), &bundle.id().to_string())
        .await;
    assert_eq!(inserted.ok(), Some(2));

    let profile = harness.users.me(&seller).await;
    let Ok(profile) = profile else {
        panic!("seller profile should resolve");
    };
    assert_eq!(keys_of(profile.permissions()), vec!["leads.create", "leads.read"]);

    let again = harness
        .roles
        .assign_bundle(&harness.admin, sales.id(), &bundle.id().to_string())
        .await;
    assert_eq!(again.ok(), Some(0));
}

#[tokio::test]
async fn bundle_edits_do_not_reach_roles_that_absorbed_it() {
    let harness = harness().await;
    let read = harness.permission("leads", "read").await;
    let export = harness.permission("leads", "export").await;
    let sales = harness.role("sales", &[]).await;

    let Ok(bundle) = harness
        .bundles
        .create_bundle(
            &harness.admin,
            CreateBundleInput {
                name: "Leads".to_owned(),
                description: Some("Lead access".to_owned()),
                permission_ids: ids_of(&[&read]),
            },
        )
        .await
    else {
        panic!("bundle should be created");
    };
    let assigned = harness
        .roles
        .assign_bundle(&harness.admin, sales.id(), &bundle.id().to_string())
        .await;
    assert_eq!(assigned.ok(), Some(1));

    let added = harness
        .bundles
        .assign_permissions(&harness.admin, bundle.id(), &ids_of(&[&export]))
        .await;
    assert_eq!(added.ok(), Some(1));

    let role = harness.roles.get_role(&harness.admin, sales.id()).await;
    let Ok(role) = role else {
        panic!("role should be found");
    };
    assert_eq!(keys_of(&role.permissions), vec!["leads.read"]);

    let deleted = harness.bundles.delete_bundle(&harness.admin, bundle.id()).await;
    assert!(deleted.is_ok());
    let role = harness.roles.get_role(&harness.admin, sales.id()).await;
    assert_eq!(
        role.map(|role| role.permissions.len()).ok(),
        Some(1)
    );
}

#[tokio::test]
async fn assigning_empty_bundle_is_a_no_op() {
    let harness = harness().await;
    let sales = harness.role("sales", &[]).await;
    let Ok(bundle) = harness
        .bundles
        .create_bundle(
            &harness.admin,
            CreateBundleInput {
                name: "Empty".to_owned(),
                description: None,
                permission_ids: Vec::new(),
            },
        )
        .await
    else {
        panic!("bundle should be created");
    };

    let inserted = harness
        .roles
        .assign_bundle(&harness.admin, sales.id(), &bundle.id().to_string())
        .await;
    assert_eq!(inserted.ok(), Some(0));

    let missing_role = harness
        .roles
        .assign_bundle(
            &harness.admin,
            RoleId::new(),
            &bundle.id().to_string(),
        )
        .await;
    assert!(matches!(missing_role, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn direct_assignment_is_all_or_nothing() {
    let harness = harness().await;
    let read = harness.permission("leads", "read").await;
    let update = harness.permission("leads", "update").await;
    let sales = harness.role("sales", &[&read]).await;

    let result = harness
        .roles
        .assign_permissions(&harness.admin, sales.id(), &ids_of(&[&update, &read]))
        .await;
    assert!(matches!(
        result,
        Err(AppError::Conflict(ConflictKind::DuplicateGrant, _))
    ));

    let role = harness.roles.get_role(&harness.admin, sales.id()).await;
    let Ok(role) = role else {
        panic!("role should be found");
    };
    assert_eq!(keys_of(&role.permissions), vec!["leads.read"]);

    let unknown = harness
        .roles
        .assign_permissions(
            &harness.admin,
            sales.id(),
            &[PermissionId::new().to_string()],
        )
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn removing_a_grant_twice_reports_not_found() {
    let harness = harness().await;
    let read = harness.permission("leads", "read").await;
    let sales = harness.role("sales", &[&read]).await;

    let first = harness
        .roles
        .remove_permission(&harness.admin, sales.id(), read.id())
        .await;
    assert!(first.is_ok());

    let second = harness
        .roles
        .remove_permission(&harness.admin, sales.id(), read.id())
        .await;
    assert!(matches!(second, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn deleting_role_detaches_members_and_drops_grants() {
    let harness = harness().await;
    let read = harness.permission("leads", "read").await;
    let sales = harness.role("sales", &[&read]).await;
    let seller = harness.member("seller@example.com", &sales).await;

    let deleted = harness.roles.delete_role(&harness.admin, sales.id()).await;
    assert!(deleted.is_ok());

    let profile = harness.users.get_user(&harness.admin, seller.user_id()).await;
    let Ok(profile) = profile else {
        panic!("member should survive role deletion");
    };
    assert!(profile.role().is_none());
    assert!(profile.permissions().is_empty());

    let again = harness.roles.delete_role(&harness.admin, sales.id()).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn deleting_permission_cascades_to_role_and_bundle_grants() {
    let harness = harness().await;
    let read = harness.permission("leads", "read").await;
    let sales = harness.role("sales", &[&read]).await;
    let Ok(bundle) = harness
        .bundles
        .create_bundle(
            &harness.admin,
            CreateBundleInput {
                name: "Leads".to_owned(),
                description: None,
                permission_ids: ids_of(&[&read]),
            },
        )
        .await
    else {
        panic!("bundle should be created");
    };

    let deleted = harness
        .permissions
        .delete_permission(&harness.admin, read.id())
        .await;
    assert!(deleted.is_ok());

    let role = harness.roles.get_role(&harness.admin, sales.id()).await;
    assert_eq!(role.map(|role| role.permissions.len()).ok(), Some(0));
    let bundle = harness.bundles.get_bundle(&harness.admin, bundle.id()).await;
    assert_eq!(bundle.map(|bundle| bundle.permissions.len()).ok(), Some(0));
}

#[tokio::test]
async fn disabled_role_revokes_effective_permissions_by_default() {
    let harness = harness().await;
    let read = harness.permission("leads", "read").await;
    let sales = harness.role("sales", &[&read]).await;
    let seller = harness.member("seller@example.com", &sales).await;

    assert_eq!(
        harness.decide(&seller, "leads.read").await,
        AuthorizationDecision::Allow
    );

    let disabled = harness
        .roles
        .update_role(
            &harness.admin,
            sales.id(),
            UpdateRoleInput {
                name: None,
                disabled: Some(true),
            },
        )
        .await;
    assert_eq!(disabled.map(|role| role.is_disabled()).ok(), Some(true));

    assert_eq!(
        harness.decide(&seller, "leads.read").await,
        AuthorizationDecision::Deny(DenyReason::InsufficientPermission)
    );
    let profile = harness.users.me(&seller).await;
    assert_eq!(
        profile
            .map(|profile| profile.role().map(|role| role.role.is_disabled()))
            .ok(),
        Some(Some(true))
    );
}

#[tokio::test]
async fn retain_policy_keeps_disabled_role_grants() {
    let harness = harness_with(DisabledRolePolicy::Retain, Arc::new(PlainHasher)).await;
    let read = harness.permission("leads", "read").await;
    let sales = harness.role("sales", &[&read]).await;
    let seller = harness.member("seller@example.com", &sales).await;

    let disabled = harness
        .roles
        .update_role(
            &harness.admin,
            sales.id(),
            UpdateRoleInput {
                name: None,
                disabled: Some(true),
            },
        )
        .await;
    assert!(disabled.is_ok());

    assert_eq!(
        harness.decide(&seller, "leads.read").await,
        AuthorizationDecision::Allow
    );
}

#[tokio::test]
async fn composite_checks_resolve_against_one_profile() {
    let harness = harness().await;
    let read = harness.permission("leads", "read").await;
    let update = harness.permission("leads", "update").await;
    let sales = harness.role("sales", &[&read]).await;
    let seller = harness.member("seller@example.com", &sales).await;
    let keys = vec![read.key().clone(), update.key().clone()];

    let all = harness.authorization.require_all(seller.user_id(), &keys).await;
    assert_eq!(
        all.ok(),
        Some(AuthorizationDecision::Deny(DenyReason::InsufficientPermission))
    );

    let any = harness.authorization.require_any(seller.user_id(), &keys).await;
    assert_eq!(any.ok(), Some(AuthorizationDecision::Allow));

    let stranger = harness.authorization.require_any(UserId::new(), &keys).await;
    assert_eq!(
        stranger.ok(),
        Some(AuthorizationDecision::Deny(DenyReason::Unauthenticated))
    );
}

#[tokio::test]
async fn user_listing_is_newest_first_with_roles() {
    let harness = harness().await;
    let read = harness.permission("leads", "read").await;
    let sales = harness.role("sales", &[&read]).await;
    harness.member("first@example.com", &sales).await;
    harness.member("second@example.com", &sales).await;

    let users = harness.users.list_users(&harness.admin).await.unwrap_or_default();
    let emails: Vec<&str> = users.iter().map(|user| user.user.email().as_str()).collect();
    assert_eq!(
        emails,
        vec!["second@example.com", "first@example.com", "admin@example.com"]
    );
    assert_eq!(
        users[0]
            .role
            .as_ref()
            .map(|role| keys_of(&role.permissions)),
        Some(vec!["leads.read"])
    );
}

#[tokio::test]
async fn user_with_unknown_role_is_not_found() {
    let harness = harness().await;

    let result = harness
        .users
        .create_user(
            &harness.admin,
            CreateUserInput {
                email: "ghost@example.com".to_owned(),
                name: "Ghost".to_owned(),
                password: "ghost-secret".to_owned(),
                role_id: RoleId::new().to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn bundle_names_are_unique_and_descriptions_clearable() {
    let harness = harness().await;
    let create = |name: &str| CreateBundleInput {
        name: name.to_owned(),
        description: Some("Shared".to_owned()),
        permission_ids: Vec::new(),
    };

    let Ok(first) = harness.bundles.create_bundle(&harness.admin, create("Sales")).await else {
        panic!("bundle should be created");
    };
    let duplicate = harness.bundles.create_bundle(&harness.admin, create("Sales")).await;
    assert!(matches!(
        duplicate,
        Err(AppError::Conflict(ConflictKind::DuplicateName, _))
    ));

    let cleared = harness
        .bundles
        .update_bundle(
            &harness.admin,
            first.id(),
            UpdateBundleInput {
                name: None,
                description: Some("  ".to_owned()),
            },
        )
        .await;
    assert_eq!(
        cleared.map(|bundle| bundle.description().map(str::to_owned)).ok(),
        Some(None)
    );
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let harness = harness().await;

    let report = harness
        .bootstrap
        .ensure_administrator(Some(AdministratorAccount {
            email: "admin@example.com".to_owned(),
            password: "admin-secret".to_owned(),
            name: "Admin".to_owned(),
        }))
        .await;
    let Ok(report) = report else {
        panic!("second bootstrap should succeed");
    };

    assert_eq!(report.created_permissions, 0);
    assert_eq!(report.granted_permissions, 0);
    assert_eq!(report.created_administrator, None);

    let profile = harness.users.me(&harness.admin).await;
    assert_eq!(profile.map(|profile| profile.permissions().len()).ok(), Some(12));
}

#[tokio::test]
async fn login_verifies_argon2_credentials() {
    let harness = harness_with(DisabledRolePolicy::Revoke, Arc::new(Argon2PasswordHasher::new())).await;
    let authentication =
        AuthenticationService::new(harness.repository.clone(), Arc::new(Argon2PasswordHasher::new()));

    let identity = authentication.login("Admin@Example.com", "admin-secret").await;
    assert_eq!(
        identity.ok().flatten().map(|identity| identity.user_id()),
        Some(harness.admin.user_id())
    );

    let wrong = authentication.login("admin@example.com", "not-the-secret").await;
    assert_eq!(wrong.ok(), Some(None));

    let unknown = authentication.login("nobody@example.com", "admin-secret").await;
    assert_eq!(unknown.ok(), Some(None));
}
