use std::sync::Arc;

use rolegate_application::{
    AuthenticationService, AuthorizationRepository, AuthorizationService, BootstrapService,
    BundleRepository, BundleService, PasswordHasher, PermissionRepository, PermissionResolver,
    PermissionService, RoleRepository, RoleService, UserAdminService, UserRepository,
};
use rolegate_core::AppResult;
use rolegate_infrastructure::{
    Argon2PasswordHasher, InMemoryAccessRepository, PostgresAuthorizationRepository,
    PostgresBundleRepository, PostgresPermissionRepository, PostgresRoleRepository,
    PostgresUserRepository,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Port implementations the services are wired against.
#[derive(Clone)]
pub struct RepositorySet {
    pub permission_repository: Arc<dyn PermissionRepository>,
    pub role_repository: Arc<dyn RoleRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub bundle_repository: Arc<dyn BundleRepository>,
    pub authorization_repository: Arc<dyn AuthorizationRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            permission_repository: Arc::new(PostgresPermissionRepository::new(pool.clone())),
            role_repository: Arc::new(PostgresRoleRepository::new(pool.clone())),
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            bundle_repository: Arc::new(PostgresBundleRepository::new(pool.clone())),
            authorization_repository: Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
        }
    }

    pub fn in_memory() -> Self {
        let repository = Arc::new(InMemoryAccessRepository::new());
        Self {
            permission_repository: repository.clone(),
            role_repository: repository.clone(),
            user_repository: repository.clone(),
            bundle_repository: repository.clone(),
            authorization_repository: repository,
            password_hasher: Arc::new(Argon2PasswordHasher::new()),
        }
    }
}

/// Seeds the administrative catalogue and wires every service.
pub async fn build_app_state(
    repositories: RepositorySet,
    config: &ApiConfig,
) -> AppResult<AppState> {
    let bootstrap_service = BootstrapService::new(
        repositories.permission_repository.clone(),
        repositories.role_repository.clone(),
        repositories.user_repository.clone(),
        repositories.password_hasher.clone(),
    );
    let report = bootstrap_service
        .ensure_administrator(config.bootstrap_admin.clone())
        .await?;
    if let Some(user_id) = report.created_administrator {
        info!(user_id = %user_id, "administrator account provisioned");
    }

    let authorization_service = AuthorizationService::new(PermissionResolver::new(
        repositories.authorization_repository.clone(),
        config.disabled_role_policy,
    ));
    info!(
        disabled_role_policy = %config.disabled_role_policy,
        "authorization gate ready"
    );

    Ok(AppState {
        permission_service: PermissionService::new(
            authorization_service.clone(),
            repositories.permission_repository.clone(),
        ),
        role_service: RoleService::new(
            authorization_service.clone(),
            repositories.role_repository.clone(),
            repositories.bundle_repository.clone(),
        ),
        user_admin_service: UserAdminService::new(
            authorization_service.clone(),
            repositories.user_repository.clone(),
            repositories.password_hasher.clone(),
        ),
        bundle_service: BundleService::new(
            authorization_service,
            repositories.bundle_repository.clone(),
        ),
        authentication_service: AuthenticationService::new(
            repositories.user_repository,
            repositories.password_hasher,
        ),
        frontend_url: config.frontend_url.clone(),
    })
}
