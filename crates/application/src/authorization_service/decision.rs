use rolegate_domain::{PermissionKey, UserProfile};

/// Why a check was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The caller could not be resolved to a stored user.
    Unauthenticated,
    /// The caller lacks at least one required key.
    InsufficientPermission,
}

impl DenyReason {
    /// Returns a stable value for logs and transports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InsufficientPermission => "insufficient_permission",
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// The guarded operation may run.
    Allow,
    /// The guarded operation must not run.
    Deny(DenyReason),
}

impl AuthorizationDecision {
    /// Returns whether the decision allows the operation.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Allows when the profile holds every key; an empty list is allowed.
pub(super) fn evaluate_all(profile: &UserProfile, keys: &[PermissionKey]) -> AuthorizationDecision {
    if keys.iter().all(|key| profile.holds(key)) {
        AuthorizationDecision::Allow
    } else {
        AuthorizationDecision::Deny(DenyReason::InsufficientPermission)
    }
}

/// Allows when the profile holds at least one key; an empty list is denied.
pub(super) fn evaluate_any(profile: &UserProfile, keys: &[PermissionKey]) -> AuthorizationDecision {
    if keys.iter().any(|key| profile.holds(key)) {
        AuthorizationDecision::Allow
    } else {
        AuthorizationDecision::Deny(DenyReason::InsufficientPermission)
    }
}
