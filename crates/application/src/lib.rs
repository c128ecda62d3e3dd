//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod authentication_service;
mod authorization_service;
mod bootstrap_service;
mod bundle_service;
mod permission_service;
mod role_service;
mod user_admin_service;
mod validation;

#[cfg(test)]
mod test_support;

pub use access_ports::{
    AuthorizationRepository, BundleChanges, BundleRepository, GrantInsertMode, NewBundle,
    NewPermission, NewRole, NewUser, PasswordHasher, PermissionRepository, RoleChanges,
    RoleRepository, UserChanges, UserCredentials, UserRepository,
};
pub use authentication_service::AuthenticationService;
pub use authorization_service::{
    AuthorizationDecision, AuthorizationService, DenyReason, DisabledRolePolicy,
    PermissionResolver,
};
pub use bootstrap_service::{
    ADMINISTRATOR_ROLE_SLUG, AdministratorAccount, BootstrapReport, BootstrapService,
};
pub use bundle_service::{BundleService, CreateBundleInput, UpdateBundleInput};
pub use permission_service::{CreatePermissionInput, PermissionService};
pub use role_service::{CreateRoleInput, RoleService, UpdateRoleInput};
pub use user_admin_service::{CreateUserInput, UpdateUserInput, UserAdminService};
