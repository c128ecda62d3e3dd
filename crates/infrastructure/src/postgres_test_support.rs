use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use rolegate_application::{NewPermission, PermissionRepository};
use rolegate_domain::{Permission, build_key};

use crate::{MIGRATOR, PostgresPermissionRepository};

pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres adapter tests: {error}");
    }

    Some(pool)
}

/// Returns a suffix that keeps fixtures from colliding across test runs.
pub(crate) fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub(crate) async fn seed_permission(pool: &PgPool, operation: &str) -> Permission {
    let Ok(key) = build_key(unique("entity").as_str(), operation) else {
        panic!("test key should be valid");
    };

    let created = PostgresPermissionRepository::new(pool.clone())
        .create_permission(NewPermission {
            key,
            description: None,
        })
        .await;
    match created {
        Ok(permission) => permission,
        Err(error) => panic!("permission should be created: {error}"),
    }
}
