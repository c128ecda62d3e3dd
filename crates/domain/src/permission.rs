use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{PermissionId, PermissionKey};

/// A grantable capability identified by its `entity.operation` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    key: PermissionKey,
    description: Option<String>,
}

impl Permission {
    /// Creates a permission record. Blank descriptions are stored as absent.
    #[must_use]
    pub fn new(id: PermissionId, key: PermissionKey, description: Option<String>) -> Self {
        Self {
            id,
            key,
            description: description.filter(|value| !value.trim().is_empty()),
        }
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the canonical key.
    #[must_use]
    pub fn key(&self) -> &PermissionKey {
        &self.key
    }

    /// Returns the entity half of the key.
    #[must_use]
    pub fn entity(&self) -> &str {
        self.key.entity()
    }

    /// Returns the operation half of the key.
    #[must_use]
    pub fn operation(&self) -> &str {
        self.key.operation()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Sorts permissions by entity, then operation.
pub fn sort_permissions(permissions: &mut [Permission]) {
    permissions.sort_by(|left, right| {
        left.entity()
            .cmp(right.entity())
            .then_with(|| left.operation().cmp(right.operation()))
    });
}

/// Groups permissions by entity name, keeping each group's input order.
#[must_use]
pub fn group_permissions_by_entity(
    permissions: &[Permission],
) -> BTreeMap<String, Vec<Permission>> {
    let mut groups: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
    for permission in permissions {
        groups
            .entry(permission.entity().to_owned())
            .or_default()
            .push(permission.clone());
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::{Permission, group_permissions_by_entity, sort_permissions};
    use crate::{PermissionId, build_key};

    fn permission(entity: &str, operation: &str) -> Permission {
        match build_key(entity, operation) {
            Ok(key) => Permission::new(PermissionId::new(), key, None),
            Err(error) => panic!("test key should be valid: {error}"),
        }
    }

    #[test]
    fn blank_description_is_dropped() {
        let Ok(key) = build_key("leads", "read") else {
            panic!("test key should be valid");
        };
        let permission = Permission::new(PermissionId::new(), key, Some("  ".to_owned()));
        assert_eq!(permission.description(), None);
    }

    #[test]
    fn sort_orders_by_entity_then_operation() {
        let mut permissions = vec![
            permission("users", "read"),
            permission("leads", "update"),
            permission("leads", "create"),
        ];
        sort_permissions(&mut permissions);

        let keys: Vec<&str> = permissions
            .iter()
            .map(|permission| permission.key().as_str())
            .collect();
        assert_eq!(keys, vec!["leads.create", "leads.update", "users.read"]);
    }

    #[test]
    fn grouping_buckets_by_entity() {
        let permissions = vec![
            permission("leads", "create"),
            permission("users", "read"),
            permission("leads", "read"),
        ];
        let groups = group_permissions_by_entity(&permissions);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get("leads").map(Vec::len), Some(2));
        assert_eq!(groups.get("users").map(Vec::len), Some(1));
    }
}
