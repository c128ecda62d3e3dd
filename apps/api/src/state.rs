use rolegate_application::{
    AuthenticationService, BundleService, PermissionService, RoleService, UserAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub permission_service: PermissionService,
    pub role_service: RoleService,
    pub user_admin_service: UserAdminService,
    pub bundle_service: BundleService,
    pub authentication_service: AuthenticationService,
    pub frontend_url: String,
}
