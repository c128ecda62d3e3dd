use rolegate_core::{AppError, AppResult, UserId, UserIdentity};
use rolegate_domain::{AdminPermission, PermissionKey, UserProfile};
use tracing::{debug, info};

mod decision;
mod resolver;

pub use decision::{AuthorizationDecision, DenyReason};
pub use resolver::{DisabledRolePolicy, PermissionResolver};

use decision::{evaluate_all, evaluate_any};

/// Authorization gate evaluated before every guarded operation.
///
/// Each call resolves the caller's profile exactly once and checks keys by
/// exact, case-sensitive match.
#[derive(Clone)]
pub struct AuthorizationService {
    resolver: PermissionResolver,
}

impl AuthorizationService {
    /// Creates a new gate over a permission resolver.
    #[must_use]
    pub fn new(resolver: PermissionResolver) -> Self {
        Self { resolver }
    }

    /// Returns the underlying resolver.
    #[must_use]
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Checks a single key.
    pub async fn authorize(
        &self,
        user_id: UserId,
        key: &PermissionKey,
    ) -> AppResult<AuthorizationDecision> {
        self.require_all(user_id, std::slice::from_ref(key)).await
    }

    /// Allows only when every key is held.
    pub async fn require_all(
        &self,
        user_id: UserId,
        keys: &[PermissionKey],
    ) -> AppResult<AuthorizationDecision> {
        let decision = match self.resolver.resolve(user_id).await? {
            Some(profile) => evaluate_all(&profile, keys),
            None => AuthorizationDecision::Deny(DenyReason::Unauthenticated),
        };

        log_decision(user_id, keys, decision);
        Ok(decision)
    }

    /// Allows when at least one key is held.
    pub async fn require_any(
        &self,
        user_id: UserId,
        keys: &[PermissionKey],
    ) -> AppResult<AuthorizationDecision> {
        let decision = match self.resolver.resolve(user_id).await? {
            Some(profile) => evaluate_any(&profile, keys),
            None => AuthorizationDecision::Deny(DenyReason::Unauthenticated),
        };

        log_decision(user_id, keys, decision);
        Ok(decision)
    }

    /// Ensures the caller holds an administrative permission and returns the
    /// profile the decision was made on.
    pub async fn require_permission(
        &self,
        actor: &UserIdentity,
        permission: AdminPermission,
    ) -> AppResult<UserProfile> {
        let key = permission.key()?;
        let user_id = actor.user_id();

        let Some(profile) = self.resolver.resolve(user_id).await? else {
            log_decision(
                user_id,
                std::slice::from_ref(&key),
                AuthorizationDecision::Deny(DenyReason::Unauthenticated),
            );
            return Err(AppError::Unauthorized(format!(
                "user '{user_id}' could not be resolved"
            )));
        };

        if !profile.holds(&key) {
            log_decision(
                user_id,
                std::slice::from_ref(&key),
                AuthorizationDecision::Deny(DenyReason::InsufficientPermission),
            );
            return Err(AppError::Forbidden(format!(
                "user '{user_id}' is missing permission '{key}'"
            )));
        }

        log_decision(
            user_id,
            std::slice::from_ref(&key),
            AuthorizationDecision::Allow,
        );
        Ok(profile)
    }
}

fn log_decision(user_id: UserId, keys: &[PermissionKey], decision: AuthorizationDecision) {
    let keys = keys
        .iter()
        .map(PermissionKey::as_str)
        .collect::<Vec<_>>()
        .join(",");

    match decision {
        AuthorizationDecision::Allow => {
            debug!(user_id = %user_id, keys = %keys, "authorization allowed");
        }
        AuthorizationDecision::Deny(reason) => {
            info!(
                user_id = %user_id,
                keys = %keys,
                reason = reason.as_str(),
                "authorization denied"
            );
        }
    }
}
