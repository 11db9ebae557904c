//! Identity provider and identity provider mapper representations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A brokered identity provider; natural key is `alias`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderRepresentation {
    pub alias: String,

    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,

    /// Provider implementation (e.g. `oidc`, `saml`).
    pub provider_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_email: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_token: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_broker_login_flow_alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_broker_login_flow_alias: Option<String>,

    /// Provider-specific configuration (endpoints, client credentials, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

/// A mapper attached to an identity provider; natural key is `name` within
/// its provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderMapperRepresentation {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    /// Alias of the owning identity provider.
    pub identity_provider_alias: String,

    /// Mapper implementation identifier.
    pub identity_provider_mapper: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}
