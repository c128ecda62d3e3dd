mod inputs;
mod repositories;

pub use inputs::{
    BundleChanges, GrantInsertMode, NewBundle, NewPermission, NewRole, NewUser, RoleChanges,
    UserChanges, UserCredentials,
};
pub use repositories::{
    AuthorizationRepository, BundleRepository, PasswordHasher, PermissionRepository,
    RoleRepository, UserRepository,
};
