use rolegate_core::NonEmptyString;
use serde::{Deserialize, Serialize};

use crate::{BundleId, Permission};

/// Named, reusable template of permissions.
///
/// Assigning a bundle copies its grants into a role; later bundle edits do not
/// reach roles that already absorbed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionBundle {
    id: BundleId,
    name: NonEmptyString,
    description: Option<String>,
}

impl PermissionBundle {
    /// Creates a bundle record. Blank descriptions are stored as absent.
    #[must_use]
    pub fn new(id: BundleId, name: NonEmptyString, description: Option<String>) -> Self {
        Self {
            id,
            name,
            description: description.filter(|value| !value.trim().is_empty()),
        }
    }

    /// Returns the bundle identifier.
    #[must_use]
    pub fn id(&self) -> BundleId {
        self.id
    }

    /// Returns the bundle name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A bundle together with its current permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleWithPermissions {
    /// The bundle record.
    pub bundle: PermissionBundle,
    /// Permissions in the bundle, ordered by entity then operation.
    pub permissions: Vec<Permission>,
}
