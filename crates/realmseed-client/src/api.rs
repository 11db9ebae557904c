//! The admin API port.
//!
//! One trait covering exactly the operations the reconciliation engine
//! issues, grouped by resource. Implementations: [`crate::HttpAdminClient`]
//! for production, in-memory fakes in the engine's tests.

use std::collections::BTreeMap;

use async_trait::async_trait;

use realmseed_model::rep::{
    AuthenticationExecutionInfoRepresentation, AuthenticationFlowRepresentation,
    AuthenticatorConfigRepresentation, ClientRepresentation, ClientScopeRepresentation,
    CreateSubflowRequest, FederatedIdentityRepresentation, IdentityProviderMapperRepresentation,
    IdentityProviderRepresentation, PartialImportRequest, PartialImportResult,
    ProtocolMapperRepresentation, RealmRepresentation, RoleRepresentation, UserProfileConfig,
    UserRepresentation,
};

use crate::error::ClientResult;

/// The owner of a set of protocol mappers, identified by its server id.
///
/// Client scopes and clients expose identical mapper sub-resources; the
/// engine reconciles both through one code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperOwner<'a> {
    ClientScope(&'a str),
    Client(&'a str),
}

impl MapperOwner<'_> {
    /// The owner's server-assigned id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            MapperOwner::ClientScope(id) | MapperOwner::Client(id) => id,
        }
    }
}

/// Typed operations against the identity server's admin REST API.
///
/// Every method is a single remote round trip. Lookup methods return
/// `Ok(None)` on 404; collection methods return the full collection for the
/// realm (the engine fetches live state fresh per reconciler, never caches
/// across reconcilers).
#[async_trait]
pub trait AdminApi: Send + Sync {
    // ── Realm ─────────────────────────────────────────────────────────

    async fn get_realm(&self, realm: &str) -> ClientResult<Option<RealmRepresentation>>;

    async fn import_realm(&self, rep: &RealmRepresentation) -> ClientResult<()>;

    async fn update_realm(&self, realm: &str, rep: &RealmRepresentation) -> ClientResult<()>;

    // ── Client scopes ─────────────────────────────────────────────────

    async fn list_client_scopes(&self, realm: &str)
        -> ClientResult<Vec<ClientScopeRepresentation>>;

    async fn create_client_scope(
        &self,
        realm: &str,
        rep: &ClientScopeRepresentation,
    ) -> ClientResult<()>;

    async fn update_client_scope(
        &self,
        realm: &str,
        id: &str,
        rep: &ClientScopeRepresentation,
    ) -> ClientResult<()>;

    async fn delete_client_scope(&self, realm: &str, id: &str) -> ClientResult<()>;

    // ── Protocol mappers (shared by scopes and clients) ───────────────

    async fn list_protocol_mappers(
        &self,
        realm: &str,
        owner: MapperOwner<'_>,
    ) -> ClientResult<Vec<ProtocolMapperRepresentation>>;

    async fn create_protocol_mapper(
        &self,
        realm: &str,
        owner: MapperOwner<'_>,
        rep: &ProtocolMapperRepresentation,
    ) -> ClientResult<()>;

    async fn update_protocol_mapper(
        &self,
        realm: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
        rep: &ProtocolMapperRepresentation,
    ) -> ClientResult<()>;

    async fn delete_protocol_mapper(
        &self,
        realm: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
    ) -> ClientResult<()>;

    // ── Clients ───────────────────────────────────────────────────────

    async fn list_clients(&self, realm: &str) -> ClientResult<Vec<ClientRepresentation>>;

    async fn find_client(
        &self,
        realm: &str,
        client_id: &str,
    ) -> ClientResult<Option<ClientRepresentation>>;

    async fn update_client(
        &self,
        realm: &str,
        id: &str,
        rep: &ClientRepresentation,
    ) -> ClientResult<()>;

    async fn delete_client(&self, realm: &str, id: &str) -> ClientResult<()>;

    /// Partial import; the engine sends one resource per request and
    /// verifies the reported counters.
    async fn partial_import(
        &self,
        realm: &str,
        request: &PartialImportRequest,
    ) -> ClientResult<PartialImportResult>;

    async fn get_default_client_scopes(
        &self,
        realm: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<ClientScopeRepresentation>>;

    async fn add_default_client_scope(
        &self,
        realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()>;

    async fn remove_default_client_scope(
        &self,
        realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()>;

    async fn get_optional_client_scopes(
        &self,
        realm: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<ClientScopeRepresentation>>;

    async fn add_optional_client_scope(
        &self,
        realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()>;

    async fn remove_optional_client_scope(
        &self,
        realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()>;

    // ── Roles ─────────────────────────────────────────────────────────

    async fn list_realm_roles(&self, realm: &str) -> ClientResult<Vec<RoleRepresentation>>;

    async fn get_realm_role(
        &self,
        realm: &str,
        name: &str,
    ) -> ClientResult<Option<RoleRepresentation>>;

    async fn create_realm_role(&self, realm: &str, rep: &RoleRepresentation) -> ClientResult<()>;

    async fn update_realm_role(
        &self,
        realm: &str,
        name: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()>;

    async fn delete_realm_role(&self, realm: &str, name: &str) -> ClientResult<()>;

    async fn list_client_roles(
        &self,
        realm: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>>;

    async fn get_client_role(
        &self,
        realm: &str,
        client_internal_id: &str,
        name: &str,
    ) -> ClientResult<Option<RoleRepresentation>>;

    async fn create_client_role(
        &self,
        realm: &str,
        client_internal_id: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()>;

    async fn update_client_role(
        &self,
        realm: &str,
        client_internal_id: &str,
        name: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()>;

    async fn delete_client_role(
        &self,
        realm: &str,
        client_internal_id: &str,
        name: &str,
    ) -> ClientResult<()>;

    /// Direct composite children of a role, by the role's server id.
    async fn get_role_composites(
        &self,
        realm: &str,
        role_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>>;

    async fn add_role_composites(
        &self,
        realm: &str,
        role_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()>;

    async fn remove_role_composites(
        &self,
        realm: &str,
        role_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()>;

    // ── Identity providers ────────────────────────────────────────────

    async fn list_identity_providers(
        &self,
        realm: &str,
    ) -> ClientResult<Vec<IdentityProviderRepresentation>>;

    async fn create_identity_provider(
        &self,
        realm: &str,
        rep: &IdentityProviderRepresentation,
    ) -> ClientResult<()>;

    async fn update_identity_provider(
        &self,
        realm: &str,
        alias: &str,
        rep: &IdentityProviderRepresentation,
    ) -> ClientResult<()>;

    async fn delete_identity_provider(&self, realm: &str, alias: &str) -> ClientResult<()>;

    async fn list_identity_provider_mappers(
        &self,
        realm: &str,
        alias: &str,
    ) -> ClientResult<Vec<IdentityProviderMapperRepresentation>>;

    async fn create_identity_provider_mapper(
        &self,
        realm: &str,
        alias: &str,
        rep: &IdentityProviderMapperRepresentation,
    ) -> ClientResult<()>;

    async fn update_identity_provider_mapper(
        &self,
        realm: &str,
        alias: &str,
        mapper_id: &str,
        rep: &IdentityProviderMapperRepresentation,
    ) -> ClientResult<()>;

    async fn delete_identity_provider_mapper(
        &self,
        realm: &str,
        alias: &str,
        mapper_id: &str,
    ) -> ClientResult<()>;

    // ── Users ─────────────────────────────────────────────────────────

    /// One page of users; `first` is the offset, `max` the page size.
    async fn list_users(
        &self,
        realm: &str,
        first: i64,
        max: i64,
    ) -> ClientResult<Vec<UserRepresentation>>;

    async fn find_user(
        &self,
        realm: &str,
        username: &str,
    ) -> ClientResult<Option<UserRepresentation>>;

    async fn update_user(
        &self,
        realm: &str,
        id: &str,
        rep: &UserRepresentation,
    ) -> ClientResult<()>;

    async fn delete_user(&self, realm: &str, id: &str) -> ClientResult<()>;

    async fn get_user_realm_roles(
        &self,
        realm: &str,
        user_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>>;

    async fn add_user_realm_roles(
        &self,
        realm: &str,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()>;

    async fn remove_user_realm_roles(
        &self,
        realm: &str,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()>;

    async fn get_user_client_roles(
        &self,
        realm: &str,
        user_id: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>>;

    async fn add_user_client_roles(
        &self,
        realm: &str,
        user_id: &str,
        client_internal_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()>;

    async fn remove_user_client_roles(
        &self,
        realm: &str,
        user_id: &str,
        client_internal_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()>;

    async fn list_federated_identities(
        &self,
        realm: &str,
        user_id: &str,
    ) -> ClientResult<Vec<FederatedIdentityRepresentation>>;

    async fn add_federated_identity(
        &self,
        realm: &str,
        user_id: &str,
        provider_alias: &str,
        rep: &FederatedIdentityRepresentation,
    ) -> ClientResult<()>;

    async fn remove_federated_identity(
        &self,
        realm: &str,
        user_id: &str,
        provider_alias: &str,
    ) -> ClientResult<()>;

    // ── Authentication flows ──────────────────────────────────────────

    async fn list_flows(&self, realm: &str)
        -> ClientResult<Vec<AuthenticationFlowRepresentation>>;

    async fn create_flow(
        &self,
        realm: &str,
        rep: &AuthenticationFlowRepresentation,
    ) -> ClientResult<()>;

    async fn update_flow(
        &self,
        realm: &str,
        id: &str,
        rep: &AuthenticationFlowRepresentation,
    ) -> ClientResult<()>;

    async fn delete_flow(&self, realm: &str, id: &str) -> ClientResult<()>;

    /// Flat, leveled execution list of a top-level flow.
    async fn list_flow_executions(
        &self,
        realm: &str,
        flow_alias: &str,
    ) -> ClientResult<Vec<AuthenticationExecutionInfoRepresentation>>;

    /// Append a leaf execution to a flow (or subflow) by its alias.
    async fn add_execution(
        &self,
        realm: &str,
        flow_alias: &str,
        provider: &str,
    ) -> ClientResult<()>;

    /// Append a nested subflow under the flow with the given alias.
    async fn add_subflow(
        &self,
        realm: &str,
        parent_alias: &str,
        request: &CreateSubflowRequest,
    ) -> ClientResult<()>;

    /// Update an execution (requirement and friends) within the top-level
    /// flow identified by `flow_alias`.
    async fn update_execution(
        &self,
        realm: &str,
        flow_alias: &str,
        rep: &AuthenticationExecutionInfoRepresentation,
    ) -> ClientResult<()>;

    async fn delete_execution(&self, realm: &str, execution_id: &str) -> ClientResult<()>;

    async fn get_authenticator_config(
        &self,
        realm: &str,
        config_id: &str,
    ) -> ClientResult<AuthenticatorConfigRepresentation>;

    /// Attach a new authenticator config to an execution.
    async fn create_execution_config(
        &self,
        realm: &str,
        execution_id: &str,
        rep: &AuthenticatorConfigRepresentation,
    ) -> ClientResult<()>;

    async fn update_authenticator_config(
        &self,
        realm: &str,
        config_id: &str,
        rep: &AuthenticatorConfigRepresentation,
    ) -> ClientResult<()>;

    async fn delete_authenticator_config(&self, realm: &str, config_id: &str)
        -> ClientResult<()>;

    // ── Localization ──────────────────────────────────────────────────

    async fn list_locales(&self, realm: &str) -> ClientResult<Vec<String>>;

    async fn get_locale_texts(
        &self,
        realm: &str,
        locale: &str,
    ) -> ClientResult<BTreeMap<String, String>>;

    /// Replace the full key/value map for a locale.
    async fn update_locale_texts(
        &self,
        realm: &str,
        locale: &str,
        texts: &BTreeMap<String, String>,
    ) -> ClientResult<()>;

    async fn delete_locale(&self, realm: &str, locale: &str) -> ClientResult<()>;

    // ── User profile ──────────────────────────────────────────────────

    async fn get_user_profile(&self, realm: &str) -> ClientResult<UserProfileConfig>;

    async fn update_user_profile(
        &self,
        realm: &str,
        config: &UserProfileConfig,
    ) -> ClientResult<()>;
}
