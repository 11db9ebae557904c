//! Role representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A realm- or client-scoped role; natural key is `name` within its
/// container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the role has composite members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<bool>,

    /// Whether the role is client-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_role: Option<bool>,

    /// Realm id for realm roles, client internal id for client roles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl RoleRepresentation {
    /// A representation carrying only the role name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
