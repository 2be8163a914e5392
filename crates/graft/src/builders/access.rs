//! Access control for generated CRUD operations.
//!
//! A module declares a default rule plus per-operation overrides. Builders
//! never read the manifest's rules directly: they receive the resolved
//! [`PermissionMap`] by reference.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Who may perform an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessLevel {
    /// The operation is not generated.
    None,

    /// No authentication required.
    Public,

    /// Requires a session.
    #[default]
    Authenticated,

    /// Requires a session holding one of the listed roles.
    Roles,
}

impl AccessLevel {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::None => "none",
            AccessLevel::Public => "public",
            AccessLevel::Authenticated => "authenticated",
            AccessLevel::Roles => "roles",
        }
    }
}

/// A generated CRUD operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Get,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Access rule for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessRule {
    pub level: AccessLevel,

    /// Required roles. Only meaningful for `Roles`.
    pub roles: Vec<String>,
}

/// Access configuration for a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleAccess {
    /// Rule applied to operations without an override.
    pub default: AccessRule,

    /// Per-operation overrides.
    pub operations: BTreeMap<Operation, AccessRule>,
}

impl ModuleAccess {
    /// Resolve the effective rule for an operation.
    ///
    /// Operation-level configuration overrides the module default; an
    /// override with no roles inherits the default's roles.
    pub fn resolve(&self, operation: Operation) -> AccessRule {
        match self.operations.get(&operation) {
            Some(rule) => AccessRule {
                level: rule.level,
                roles: if rule.roles.is_empty() {
                    self.default.roles.clone()
                } else {
                    rule.roles.clone()
                },
            },
            None => self.default.clone(),
        }
    }
}

/// Resolved rule for every operation of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMap {
    rules: BTreeMap<Operation, AccessRule>,
}

impl PermissionMap {
    pub fn resolve(access: &ModuleAccess) -> Self {
        let rules = Operation::ALL
            .iter()
            .map(|op| (*op, access.resolve(*op)))
            .collect();
        Self { rules }
    }

    pub fn rule(&self, operation: Operation) -> AccessRule {
        self.rules.get(&operation).cloned().unwrap_or_default()
    }

    /// Whether the operation is generated at all.
    pub fn allows(&self, operation: Operation) -> bool {
        self.rule(operation).level != AccessLevel::None
    }

    /// Generated operations in canonical order.
    pub fn allowed(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| self.allows(*op))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access() -> ModuleAccess {
        let mut operations = BTreeMap::new();
        operations.insert(
            Operation::Delete,
            AccessRule {
                level: AccessLevel::Roles,
                roles: vec![],
            },
        );
        operations.insert(
            Operation::List,
            AccessRule {
                level: AccessLevel::Public,
                roles: vec![],
            },
        );
        operations.insert(
            Operation::Update,
            AccessRule {
                level: AccessLevel::None,
                roles: vec![],
            },
        );
        ModuleAccess {
            default: AccessRule {
                level: AccessLevel::Authenticated,
                roles: vec!["admin".into()],
            },
            operations,
        }
    }

    #[test]
    fn test_override_inherits_roles() {
        let rule = access().resolve(Operation::Delete);
        assert_eq!(rule.level, AccessLevel::Roles);
        assert_eq!(rule.roles, vec!["admin"]);
    }

    #[test]
    fn test_default_applies_without_override() {
        assert_eq!(access().resolve(Operation::Get).level, AccessLevel::Authenticated);
    }

    #[test]
    fn test_permission_map_allowed() {
        let map = PermissionMap::resolve(&access());
        assert!(!map.allows(Operation::Update));
        assert_eq!(
            map.allowed(),
            vec![Operation::List, Operation::Get, Operation::Create, Operation::Delete]
        );
    }

    #[test]
    fn test_access_from_json() {
        let json = r#"{ "default": { "level": "public" }, "operations": { "delete": { "level": "none" } } }"#;
        let access: ModuleAccess = serde_json::from_str(json).unwrap();
        let map = PermissionMap::resolve(&access);
        assert!(map.allows(Operation::List));
        assert!(!map.allows(Operation::Delete));
    }
}
