use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use rolegate_application::{AdministratorAccount, DisabledRolePolicy};
use rolegate_core::UserIdentity;
use tower_sessions::{MemoryStore, Session};

use crate::api_config::{ApiConfig, StorageBackend};
use crate::api_services::{RepositorySet, build_app_state};
use crate::state::AppState;

pub(crate) const ADMIN_EMAIL: &str = "admin@example.com";
pub(crate) const ADMIN_PASSWORD: &str = "admin-secret";
pub(crate) const FRONTEND_URL: &str = "http://localhost:3000";

pub(crate) fn memory_config() -> ApiConfig {
    ApiConfig {
        migrate_only: false,
        storage_backend: StorageBackend::Memory,
        database_url: None,
        frontend_url: FRONTEND_URL.to_owned(),
        api_host: "127.0.0.1".to_owned(),
        api_port: 3001,
        cookie_secure: false,
        disabled_role_policy: DisabledRolePolicy::Revoke,
        bootstrap_admin: Some(AdministratorAccount {
            email: ADMIN_EMAIL.to_owned(),
            password: ADMIN_PASSWORD.to_owned(),
            name: "Administrator".to_owned(),
        }),
    }
}

/// In-memory state with a bootstrapped administrator, plus that administrator.
pub(crate) async fn memory_state() -> (AppState, UserIdentity) {
    let Ok(state) = build_app_state(RepositorySet::in_memory(), &memory_config()).await else {
        panic!("in-memory state should build");
    };

    let Ok(Some(admin)) = state
        .authentication_service
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
    else {
        panic!("bootstrapped administrator should log in");
    };

    (state, admin)
}

pub(crate) fn empty_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

/// Renders a handler result and decodes its JSON body.
pub(crate) async fn render(result: impl IntoResponse) -> (u16, serde_json::Value) {
    let response: Response = result.into_response();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}
