use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// What the current user may do with one scope of the dashboard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Permission {
    pub fn from_actions<S: AsRef<str>>(actions: &[S]) -> Self {
        let mut permission = Self::default();
        for action in actions {
            match action.as_ref() {
                "read" => permission.read = true,
                "create" => permission.create = true,
                "update" => permission.update = true,
                "delete" => permission.delete = true,
                _ => {}
            }
        }
        permission
    }
}

/// Permissions keyed by scope, as returned by the dashboard on login:
/// `{"nvmeof": ["read", "create"], ...}`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Permissions(BTreeMap<String, Permission>);

impl Permissions {
    pub fn scope(&self, scope: &str) -> Permission {
        self.0.get(scope).copied().unwrap_or_default()
    }

    pub fn nvmeof(&self) -> Permission {
        self.scope("nvmeof")
    }

    #[must_use]
    pub fn with_scope<S: Into<String>>(mut self, scope: S, permission: Permission) -> Self {
        self.0.insert(scope.into(), permission);
        self
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|(scope, actions)| (scope, Permission::from_actions(&actions)))
                .collect(),
        ))
    }
}

pub trait PermissionStore: Send + Sync {
    fn permissions(&self) -> Permissions;
}

impl PermissionStore for Permissions {
    fn permissions(&self) -> Permissions {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertables::assert_ok;
    use serde_json::json;

    #[test]
    fn test_deserialize_dashboard_permissions() {
        let permissions: Permissions = assert_ok!(serde_json::from_value(json!({
            "nvmeof": ["read", "create"],
            "pool": ["read"],
        })));

        assert_eq!(
            permissions.nvmeof(),
            Permission {
                read: true,
                create: true,
                update: false,
                delete: false,
            }
        );
        assert!(permissions.scope("pool").read);
        assert_eq!(permissions.scope("hosts"), Permission::default());
    }

    #[test]
    fn test_unknown_actions_are_ignored() {
        let permission = Permission::from_actions(&["read", "frobnicate"]);
        assert!(permission.read);
        assert!(!permission.create);
    }
}
