use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rolegate_application::{AdministratorAccount, DisabledRolePolicy};
use rolegate_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

/// Where the API keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Validation(format!(
                "STORAGE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub disabled_role_policy: DisabledRolePolicy,
    pub bootstrap_admin: Option<AdministratorAccount>,
}

impl ApiConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_source(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    fn from_source(
        command: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let migrate_only = command == Some("migrate");

        let storage_backend = match non_empty(&lookup, "STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Postgres,
        };

        let database_url = non_empty(&lookup, "DATABASE_URL");
        if database_url.is_none() && (storage_backend == StorageBackend::Postgres || migrate_only)
        {
            return Err(AppError::Validation("DATABASE_URL is required".to_owned()));
        }

        let frontend_url = non_empty(&lookup, "FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = non_empty(&lookup, "API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match non_empty(&lookup, "API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };

        let cookie_secure = non_empty(&lookup, "SESSION_COOKIE_SECURE")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let disabled_role_policy = match non_empty(&lookup, "DISABLED_ROLE_POLICY") {
            Some(value) => value.parse::<DisabledRolePolicy>().map_err(|error| {
                AppError::Validation(format!("invalid DISABLED_ROLE_POLICY: {error}"))
            })?,
            None => DisabledRolePolicy::default(),
        };

        let bootstrap_admin = match (
            non_empty(&lookup, "BOOTSTRAP_ADMIN_EMAIL"),
            non_empty(&lookup, "BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdministratorAccount {
                email,
                password,
                name: non_empty(&lookup, "BOOTSTRAP_ADMIN_NAME")
                    .unwrap_or_else(|| "Administrator".to_owned()),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(AppError::Validation(
                    "BOOTSTRAP_ADMIN_PASSWORD is required when BOOTSTRAP_ADMIN_EMAIL is set"
                        .to_owned(),
                ));
            }
            (None, Some(_)) => {
                return Err(AppError::Validation(
                    "BOOTSTRAP_ADMIN_EMAIL is required when BOOTSTRAP_ADMIN_PASSWORD is set"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            migrate_only,
            storage_backend,
            database_url,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            disabled_role_policy,
            bootstrap_admin,
        })
    }

    pub fn socket_address(&self) -> AppResult<SocketAddr> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn required_database_url(&self) -> AppResult<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|value| !value.trim().is_empty())
}
