//! Client scope and protocol mapper representations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A client scope; natural key is `name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScopeRepresentation {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Protocol the scope applies to (e.g. `openid-connect`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocol_mappers: Vec<ProtocolMapperRepresentation>,
}

/// A protocol mapper owned by a client scope or client; natural key is
/// `name` within its owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMapperRepresentation {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    /// Protocol (e.g. `openid-connect`).
    pub protocol: String,

    /// Mapper implementation identifier (e.g. `oidc-usermodel-attribute-mapper`).
    pub protocol_mapper: String,

    /// Mapper configuration. Comparison treats keys absent from the desired
    /// model as "don't care", never as drift.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}
