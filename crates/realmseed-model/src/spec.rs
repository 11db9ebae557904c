//! Desired-state model.
//!
//! A [`RealmSpec`] is the merged, in-memory target configuration for one
//! realm. The caller builds it from seed sources (out of scope here) and
//! hands it to the engine, which treats it as immutable for the whole run.
//!
//! Cross-references inside a spec (execution → flow alias, composite → role
//! name, user → role/client/provider name) must resolve within the same
//! spec; [`RealmSpec::validate_references`] fails fast on the first dangling
//! reference. The engine never guesses or auto-creates a missing target.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rep::{
    AuthenticatorConfigRepresentation, ClientRepresentation, ClientScopeRepresentation,
    CredentialRepresentation, FederatedIdentityRepresentation,
    IdentityProviderMapperRepresentation, IdentityProviderRepresentation, RealmRepresentation,
    RoleRepresentation, UserProfileConfig, UserRepresentation,
};

/// Result alias for spec validation.
pub type SpecResult<T> = Result<T, SpecError>;

/// A configuration defect in the desired-state model.
#[derive(Debug, Clone, Error)]
pub enum SpecError {
    /// Two entries of one collection share a natural key.
    #[error("duplicate {entity} '{key}' in realm spec")]
    DuplicateKey {
        entity: &'static str,
        key: String,
    },

    /// A cross-reference does not resolve inside the spec.
    #[error("{referrer} references unknown {entity} '{reference}'")]
    UnresolvedReference {
        entity: &'static str,
        reference: String,
        referrer: String,
    },

    /// An execution spec is malformed.
    #[error("flow '{flow}': {detail}")]
    InvalidExecution {
        flow: String,
        detail: String,
    },
}

/// A role in the desired state, with composite members by name.
///
/// Composite edges are plain name tuples, never object references; the
/// in-memory model stays acyclic regardless of what the role graph does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub composites: Option<RoleComposites>,
}

impl RoleSpec {
    /// The wire representation for create/update calls. Composite edges
    /// are reconciled separately and are not part of the role payload.
    #[must_use]
    pub fn to_representation(&self) -> RoleRepresentation {
        RoleRepresentation {
            id: None,
            name: self.name.clone(),
            description: self.description.clone(),
            composite: self.composites.as_ref().map(|c| !c.is_empty()),
            client_role: None,
            container_id: None,
            attributes: self.attributes.clone(),
        }
    }
}

/// Composite members of a role, partitioned by scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoleComposites {
    /// Realm-scoped member role names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub realm: Vec<String>,

    /// Client-scoped member role names, keyed by owning client id.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub client: BTreeMap<String, Vec<String>>,
}

impl RoleComposites {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.realm.is_empty() && self.client.is_empty()
    }
}

/// A user in the desired state, with role assignments by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSpec {
    pub username: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_actions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<CredentialRepresentation>,

    /// Realm role names assigned to the user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub realm_roles: Vec<String>,

    /// Client role names assigned to the user, keyed by owning client id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub client_roles: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub federated_identities: Vec<FederatedIdentityRepresentation>,
}

impl UserSpec {
    /// The wire representation for create/update calls. Role assignments
    /// and federated identities are reconciled separately.
    #[must_use]
    pub fn to_representation(&self) -> UserRepresentation {
        UserRepresentation {
            id: None,
            username: self.username.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            enabled: self.enabled,
            attributes: self.attributes.clone(),
            required_actions: self.required_actions.clone(),
            credentials: self.credentials.clone(),
            federated_identities: Vec::new(),
        }
    }
}

/// An authentication flow in the desired state.
///
/// Subflows are separate `FlowSpec` entries with `top_level: false`,
/// referenced from executions by alias — a tree by reference, not by
/// embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSpec {
    pub alias: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Flow implementation, `basic-flow` unless stated otherwise.
    #[serde(default = "default_flow_provider")]
    pub provider_id: String,

    #[serde(default = "default_true")]
    pub top_level: bool,

    /// Ordered executions of this flow.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub executions: Vec<ExecutionSpec>,
}

fn default_flow_provider() -> String {
    "basic-flow".to_string()
}

fn default_true() -> bool {
    true
}

/// One step of a flow: either a leaf authenticator or a reference to a
/// nested subflow. Exactly one of `authenticator` / `flow_alias` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSpec {
    /// Requirement (`REQUIRED`, `ALTERNATIVE`, `CONDITIONAL`, `DISABLED`).
    pub requirement: String,

    /// Authenticator provider id, for leaf executions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator: Option<String>,

    /// Alias of a nested subflow defined elsewhere in the spec.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Authenticator config for leaf executions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<AuthenticatorConfigRepresentation>,
}

impl ExecutionSpec {
    /// Whether this step references a nested subflow.
    #[must_use]
    pub fn is_subflow(&self) -> bool {
        self.flow_alias.is_some()
    }
}

/// The desired state of one realm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmSpec {
    /// Realm name; identifies the spec.
    pub realm: String,

    /// Desired realm settings. The `realm` field inside must match.
    pub settings: RealmRepresentation,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub client_scopes: Vec<ClientScopeRepresentation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clients: Vec<ClientRepresentation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub realm_roles: Vec<RoleSpec>,

    /// Client-scoped roles, keyed by owning client id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub client_roles: BTreeMap<String, Vec<RoleSpec>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identity_providers: Vec<IdentityProviderRepresentation>,

    /// Identity provider mappers, keyed by `identity_provider_alias`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identity_provider_mappers: Vec<IdentityProviderMapperRepresentation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<FlowSpec>,

    /// Localization entries: locale → message key → text.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localizations: BTreeMap<String, BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfileConfig>,
}

impl RealmSpec {
    /// A spec with the given realm name and nothing else.
    #[must_use]
    pub fn named(realm: impl Into<String>) -> Self {
        let realm = realm.into();
        Self {
            settings: RealmRepresentation::named(realm.clone()),
            realm,
            client_scopes: Vec::new(),
            clients: Vec::new(),
            realm_roles: Vec::new(),
            client_roles: BTreeMap::new(),
            identity_providers: Vec::new(),
            identity_provider_mappers: Vec::new(),
            users: Vec::new(),
            flows: Vec::new(),
            localizations: BTreeMap::new(),
            user_profile: None,
        }
    }

    /// Look up a flow by alias.
    #[must_use]
    pub fn flow_by_alias(&self, alias: &str) -> Option<&FlowSpec> {
        self.flows.iter().find(|f| f.alias == alias)
    }

    /// Look up a client by its client id (natural key, not the server id).
    #[must_use]
    pub fn client_by_client_id(&self, client_id: &str) -> Option<&ClientRepresentation> {
        self.clients.iter().find(|c| c.client_id == client_id)
    }

    /// Top-level flows only; subflow specs are reached through references.
    pub fn top_level_flows(&self) -> impl Iterator<Item = &FlowSpec> {
        self.flows.iter().filter(|f| f.top_level)
    }

    /// Mappers declared for one identity provider.
    pub fn mappers_for_provider<'a>(
        &'a self,
        alias: &'a str,
    ) -> impl Iterator<Item = &'a IdentityProviderMapperRepresentation> {
        self.identity_provider_mappers
            .iter()
            .filter(move |m| m.identity_provider_alias == alias)
    }

    /// Validate natural-key uniqueness and every cross-reference.
    ///
    /// Returns the first defect found. A spec that passes is safe for the
    /// engine to act on without further lookups failing on the desired
    /// side.
    pub fn validate_references(&self) -> SpecResult<()> {
        unique_keys("client scope", self.client_scopes.iter().map(|s| &s.name))?;
        let client_ids = unique_keys("client", self.clients.iter().map(|c| &c.client_id))?;
        let realm_roles = unique_keys("realm role", self.realm_roles.iter().map(|r| &r.name))?;
        let idp_aliases =
            unique_keys("identity provider", self.identity_providers.iter().map(|p| &p.alias))?;
        let flow_aliases = unique_keys("flow", self.flows.iter().map(|f| &f.alias))?;
        unique_keys("user", self.users.iter().map(|u| &u.username))?;

        let mut client_role_names: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
        for (client_id, roles) in &self.client_roles {
            if !client_ids.contains(client_id.as_str()) {
                return Err(SpecError::UnresolvedReference {
                    entity: "client",
                    reference: client_id.clone(),
                    referrer: "client role group".to_string(),
                });
            }
            let mut names = HashSet::new();
            for role in roles {
                if !names.insert(role.name.as_str()) {
                    return Err(SpecError::DuplicateKey {
                        entity: "client role",
                        key: format!("{client_id}/{}", role.name),
                    });
                }
            }
            client_role_names.insert(client_id.as_str(), names);
        }

        self.validate_composites(&realm_roles, &client_role_names)?;
        self.validate_users(&realm_roles, &client_role_names, &idp_aliases)?;
        self.validate_idp_mappers(&idp_aliases)?;
        self.validate_flows(&flow_aliases)?;
        Ok(())
    }

    fn validate_composites(
        &self,
        realm_roles: &HashSet<&str>,
        client_role_names: &BTreeMap<&str, HashSet<&str>>,
    ) -> SpecResult<()> {
        let all_roles = self
            .realm_roles
            .iter()
            .map(|r| (None, r))
            .chain(self.client_roles.iter().flat_map(|(client_id, roles)| {
                roles.iter().map(move |r| (Some(client_id.as_str()), r))
            }));

        for (owner_client, role) in all_roles {
            let Some(composites) = &role.composites else {
                continue;
            };
            let referrer = match owner_client {
                Some(client) => format!("composite of client role {client}/{}", role.name),
                None => format!("composite of realm role {}", role.name),
            };
            for target in &composites.realm {
                if !realm_roles.contains(target.as_str()) {
                    return Err(SpecError::UnresolvedReference {
                        entity: "realm role",
                        reference: target.clone(),
                        referrer: referrer.clone(),
                    });
                }
            }
            for (client_id, targets) in &composites.client {
                let Some(names) = client_role_names.get(client_id.as_str()) else {
                    return Err(SpecError::UnresolvedReference {
                        entity: "client",
                        reference: client_id.clone(),
                        referrer: referrer.clone(),
                    });
                };
                for target in targets {
                    if !names.contains(target.as_str()) {
                        return Err(SpecError::UnresolvedReference {
                            entity: "client role",
                            reference: format!("{client_id}/{target}"),
                            referrer: referrer.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_users(
        &self,
        realm_roles: &HashSet<&str>,
        client_role_names: &BTreeMap<&str, HashSet<&str>>,
        idp_aliases: &HashSet<&str>,
    ) -> SpecResult<()> {
        for user in &self.users {
            let referrer = format!("user {}", user.username);
            for role in &user.realm_roles {
                if !realm_roles.contains(role.as_str()) {
                    return Err(SpecError::UnresolvedReference {
                        entity: "realm role",
                        reference: role.clone(),
                        referrer: referrer.clone(),
                    });
                }
            }
            for (client_id, roles) in &user.client_roles {
                let Some(names) = client_role_names.get(client_id.as_str()) else {
                    return Err(SpecError::UnresolvedReference {
                        entity: "client",
                        reference: client_id.clone(),
                        referrer: referrer.clone(),
                    });
                };
                for role in roles {
                    if !names.contains(role.as_str()) {
                        return Err(SpecError::UnresolvedReference {
                            entity: "client role",
                            reference: format!("{client_id}/{role}"),
                            referrer: referrer.clone(),
                        });
                    }
                }
            }
            for identity in &user.federated_identities {
                if !idp_aliases.contains(identity.identity_provider.as_str()) {
                    return Err(SpecError::UnresolvedReference {
                        entity: "identity provider",
                        reference: identity.identity_provider.clone(),
                        referrer: referrer.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_idp_mappers(&self, idp_aliases: &HashSet<&str>) -> SpecResult<()> {
        for mapper in &self.identity_provider_mappers {
            if !idp_aliases.contains(mapper.identity_provider_alias.as_str()) {
                return Err(SpecError::UnresolvedReference {
                    entity: "identity provider",
                    reference: mapper.identity_provider_alias.clone(),
                    referrer: format!("identity provider mapper {}", mapper.name),
                });
            }
        }
        Ok(())
    }

    fn validate_flows(&self, flow_aliases: &HashSet<&str>) -> SpecResult<()> {
        for flow in &self.flows {
            for (index, execution) in flow.executions.iter().enumerate() {
                match (&execution.authenticator, &execution.flow_alias) {
                    (Some(_), Some(_)) | (None, None) => {
                        return Err(SpecError::InvalidExecution {
                            flow: flow.alias.clone(),
                            detail: format!(
                                "execution {index} must set exactly one of authenticator or flowAlias"
                            ),
                        });
                    }
                    (None, Some(alias)) => {
                        if !flow_aliases.contains(alias.as_str()) {
                            return Err(SpecError::UnresolvedReference {
                                entity: "flow",
                                reference: alias.clone(),
                                referrer: format!("execution {index} of flow {}", flow.alias),
                            });
                        }
                        if self
                            .flow_by_alias(alias)
                            .is_some_and(|target| target.top_level)
                        {
                            return Err(SpecError::InvalidExecution {
                                flow: flow.alias.clone(),
                                detail: format!(
                                    "execution {index} references top-level flow '{alias}' as a subflow"
                                ),
                            });
                        }
                    }
                    (Some(_), None) => {}
                }
            }
        }
        Ok(())
    }
}

fn unique_keys<'a>(
    entity: &'static str,
    keys: impl Iterator<Item = &'a String>,
) -> SpecResult<HashSet<&'a str>> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key.as_str()) {
            return Err(SpecError::DuplicateKey {
                entity,
                key: key.clone(),
            });
        }
    }
    Ok(seen)
}
