use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post};
use rolegate_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

use cors::build_cors_layer;

pub fn build_router<Store>(
    app_state: AppState,
    session_layer: SessionManagerLayer<Store>,
) -> Result<Router, AppError>
where
    Store: SessionStore + Clone,
{
    let cors_layer = build_cors_layer(app_state.frontend_url.as_str())?;

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler));

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::users::current_user_handler))
        .route(
            "/api/permissions",
            get(handlers::permissions::list_permissions_handler)
                .post(handlers::permissions::create_permission_handler),
        )
        .route(
            "/api/permissions/entities",
            get(handlers::permissions::list_permission_entities_handler),
        )
        .route(
            "/api/permissions/operations",
            get(handlers::permissions::list_permission_operations_handler),
        )
        .route(
            "/api/permissions/{permission_id}",
            get(handlers::permissions::get_permission_handler)
                .delete(handlers::permissions::delete_permission_handler),
        )
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(handlers::roles::get_role_handler)
                .patch(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            post(handlers::roles::assign_role_permissions_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions/{permission_id}",
            delete(handlers::roles::remove_role_permission_handler),
        )
        .route(
            "/api/roles/{role_id}/bundle",
            post(handlers::roles::assign_role_bundle_handler),
        )
        .route(
            "/api/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::users::get_user_handler)
                .patch(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .route(
            "/api/bundles",
            get(handlers::bundles::list_bundles_handler)
                .post(handlers::bundles::create_bundle_handler),
        )
        .route(
            "/api/bundles/{bundle_id}",
            get(handlers::bundles::get_bundle_handler)
                .patch(handlers::bundles::update_bundle_handler)
                .delete(handlers::bundles::delete_bundle_handler),
        )
        .route(
            "/api/bundles/{bundle_id}/permissions",
            post(handlers::bundles::assign_bundle_permissions_handler),
        )
        .route(
            "/api/bundles/{bundle_id}/permissions/{permission_id}",
            delete(handlers::bundles::remove_bundle_permission_handler),
        )
        .layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
