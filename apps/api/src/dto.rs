mod auth;
mod bundles;
mod common;
mod permissions;
mod roles;
mod users;

pub use auth::{LoginRequest, UserProfileResponse};
pub use bundles::{
    BundleDetailResponse, BundleResponse, CreateBundleRequest, UpdateBundleRequest,
};
pub use common::{DataResponse, GrantCountResponse, HealthResponse};
pub use permissions::{AssignPermissionsRequest, CreatePermissionRequest, PermissionResponse};
pub use roles::{
    AssignBundleRequest, CreateRoleRequest, RoleDetailResponse, RoleResponse, UpdateRoleRequest,
};
pub use users::{CreateUserRequest, UpdateUserRequest, UserResponse, UserWithRoleResponse};
