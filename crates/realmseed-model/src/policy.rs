//! Per-entity modification policy.
//!
//! Operators use the policy to protect hand-edited remote entities from
//! being overwritten by seeding: any of Create/Update/Delete can be
//! restricted per entity category or per named instance. Everything not
//! explicitly restricted is permitted.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A mutating operation against the remote realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// The entity categories the engine reconciles, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityCategory {
    Realm,
    Localization,
    UserProfile,
    ClientScope,
    Client,
    RealmRole,
    ClientRole,
    IdentityProvider,
    User,
    AuthenticationFlow,
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityCategory::Realm => "realm",
            EntityCategory::Localization => "localization",
            EntityCategory::UserProfile => "user-profile",
            EntityCategory::ClientScope => "client-scope",
            EntityCategory::Client => "client",
            EntityCategory::RealmRole => "realm-role",
            EntityCategory::ClientRole => "client-role",
            EntityCategory::IdentityProvider => "identity-provider",
            EntityCategory::User => "user",
            EntityCategory::AuthenticationFlow => "authentication-flow",
        };
        write!(f, "{name}")
    }
}

/// Which of the three operations are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationSet {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Default for OperationSet {
    fn default() -> Self {
        Self::all()
    }
}

impl OperationSet {
    /// All operations permitted.
    #[must_use]
    pub fn all() -> Self {
        Self {
            create: true,
            update: true,
            delete: true,
        }
    }

    /// No operation permitted.
    #[must_use]
    pub fn none() -> Self {
        Self {
            create: false,
            update: false,
            delete: false,
        }
    }

    /// Create and update permitted, delete denied. The common setting for
    /// realms with remote entities that seeding must never remove.
    #[must_use]
    pub fn no_delete() -> Self {
        Self {
            create: true,
            update: true,
            delete: false,
        }
    }

    #[must_use]
    pub fn allows(&self, op: Operation) -> bool {
        match op {
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }

    fn any(&self) -> bool {
        self.create || self.update || self.delete
    }
}

/// Restrictions for one entity category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryRule {
    /// Operations permitted for the category; absent means permissive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<OperationSet>,

    /// Overrides for named instances (a specific client id, role name,
    /// flow alias, ...). An instance override takes precedence over the
    /// category setting.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub instances: HashMap<String, OperationSet>,
}

/// The per-realm modification policy.
///
/// Resolution order for `allows`: instance override, then category setting,
/// then permissive. Pure configuration; no side effects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModificationPolicy {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub categories: HashMap<EntityCategory, CategoryRule>,
}

impl ModificationPolicy {
    /// The default policy: everything permitted.
    #[must_use]
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Restrict a whole category.
    #[must_use]
    pub fn restrict(mut self, category: EntityCategory, operations: OperationSet) -> Self {
        self.categories.entry(category).or_default().operations = Some(operations);
        self
    }

    /// Restrict a single named instance within a category.
    #[must_use]
    pub fn restrict_instance(
        mut self,
        category: EntityCategory,
        instance: impl Into<String>,
        operations: OperationSet,
    ) -> Self {
        self.categories
            .entry(category)
            .or_default()
            .instances
            .insert(instance.into(), operations);
        self
    }

    /// Whether `op` is permitted for the given category and, optionally, a
    /// named instance.
    #[must_use]
    pub fn allows(
        &self,
        category: EntityCategory,
        instance: Option<&str>,
        op: Operation,
    ) -> bool {
        if let Some(rule) = self.categories.get(&category) {
            if let Some(name) = instance {
                if let Some(set) = rule.instances.get(name) {
                    return set.allows(op);
                }
            }
            if let Some(set) = rule.operations {
                return set.allows(op);
            }
        }
        true
    }

    /// Whether the category participates in a run at all.
    ///
    /// A category is disabled when no operation is permitted at the
    /// category level and no instance override re-enables one; the
    /// orchestrator skips disabled categories entirely.
    #[must_use]
    pub fn category_enabled(&self, category: EntityCategory) -> bool {
        match self.categories.get(&category) {
            Some(rule) => {
                rule.operations.map_or(true, |set| set.any())
                    || rule.instances.values().any(OperationSet::any)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissive_by_default() {
        let policy = ModificationPolicy::permissive();
        assert!(policy.allows(EntityCategory::Client, None, Operation::Create));
        assert!(policy.allows(EntityCategory::Client, Some("portal"), Operation::Delete));
        assert!(policy.category_enabled(EntityCategory::Client));
    }

    #[test]
    fn category_restriction_applies() {
        let policy = ModificationPolicy::permissive()
            .restrict(EntityCategory::RealmRole, OperationSet::no_delete());

        assert!(policy.allows(EntityCategory::RealmRole, None, Operation::Create));
        assert!(!policy.allows(EntityCategory::RealmRole, None, Operation::Delete));
        // Other categories untouched.
        assert!(policy.allows(EntityCategory::Client, None, Operation::Delete));
    }

    #[test]
    fn instance_override_wins_over_category() {
        let policy = ModificationPolicy::permissive()
            .restrict(EntityCategory::Client, OperationSet::none())
            .restrict_instance(EntityCategory::Client, "portal", OperationSet::all());

        assert!(!policy.allows(EntityCategory::Client, Some("legacy"), Operation::Update));
        assert!(policy.allows(EntityCategory::Client, Some("portal"), Operation::Update));
    }

    #[test]
    fn fully_denied_category_is_disabled() {
        let policy =
            ModificationPolicy::permissive().restrict(EntityCategory::User, OperationSet::none());
        assert!(!policy.category_enabled(EntityCategory::User));
    }

    #[test]
    fn instance_override_keeps_category_enabled() {
        let policy = ModificationPolicy::permissive()
            .restrict(EntityCategory::User, OperationSet::none())
            .restrict_instance(EntityCategory::User, "svc-batch", OperationSet::no_delete());
        assert!(policy.category_enabled(EntityCategory::User));
    }

    #[test]
    fn deserializes_from_config() {
        let json = r#"{
            "categories": {
                "realm-role": { "operations": { "delete": false } },
                "client": {
                    "instances": { "portal": { "create": false, "update": false, "delete": false } }
                }
            }
        }"#;
        let policy: ModificationPolicy = serde_json::from_str(json).unwrap();
        assert!(!policy.allows(EntityCategory::RealmRole, None, Operation::Delete));
        assert!(policy.allows(EntityCategory::RealmRole, None, Operation::Update));
        assert!(!policy.allows(EntityCategory::Client, Some("portal"), Operation::Update));
        assert!(policy.allows(EntityCategory::Client, Some("other"), Operation::Update));
    }
}
