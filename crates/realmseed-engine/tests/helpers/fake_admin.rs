//! In-memory fake of the admin API for engine integration tests.
//!
//! Tracks full realm state, generates server-assigned ids, records every
//! mutating call in an ordered log, and enforces the same constraints the
//! real server does where the engine's correctness depends on them (a
//! subflow with children cannot be deleted; partial import refuses
//! natural-key collisions).

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use realmseed_client::{AdminApi, ClientError, ClientResult, MapperOwner};
use realmseed_model::rep::{
    AuthenticationExecutionInfoRepresentation, AuthenticationFlowRepresentation,
    AuthenticatorConfigRepresentation, ClientRepresentation, ClientScopeRepresentation,
    CreateSubflowRequest, FederatedIdentityRepresentation, IdentityProviderMapperRepresentation,
    IdentityProviderRepresentation, PartialImportRequest, PartialImportResult,
    ProtocolMapperRepresentation, RealmRepresentation, RoleRepresentation, UserProfileConfig,
    UserRepresentation,
};

/// One stored execution entry; children of subflow entries live under the
/// subflow's own alias in `executions`.
#[derive(Debug, Clone, Default)]
pub struct ExecEntry {
    pub id: String,
    pub is_flow: bool,
    pub subflow_alias: Option<String>,
    pub subflow_description: Option<String>,
    pub provider: Option<String>,
    pub requirement: String,
    pub description: Option<String>,
    pub config_id: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    realm: Option<RealmRepresentation>,
    scopes: Vec<ClientScopeRepresentation>,
    scope_mappers: HashMap<String, Vec<ProtocolMapperRepresentation>>,
    clients: Vec<ClientRepresentation>,
    client_mappers: HashMap<String, Vec<ProtocolMapperRepresentation>>,
    default_scopes: HashMap<String, Vec<String>>,
    optional_scopes: HashMap<String, Vec<String>>,
    realm_roles: Vec<RoleRepresentation>,
    client_roles: HashMap<String, Vec<RoleRepresentation>>,
    composites: HashMap<String, Vec<String>>,
    idps: Vec<IdentityProviderRepresentation>,
    idp_mappers: HashMap<String, Vec<IdentityProviderMapperRepresentation>>,
    users: Vec<UserRepresentation>,
    user_realm_roles: HashMap<String, Vec<String>>,
    user_client_roles: HashMap<(String, String), Vec<String>>,
    federated: HashMap<String, Vec<FederatedIdentityRepresentation>>,
    flows: Vec<AuthenticationFlowRepresentation>,
    executions: HashMap<String, Vec<ExecEntry>>,
    configs: HashMap<String, AuthenticatorConfigRepresentation>,
    locales: BTreeMap<String, BTreeMap<String, String>>,
    profile: UserProfileConfig,
}

/// The fake admin server.
#[derive(Default)]
pub struct FakeAdmin {
    state: Mutex<State>,
    /// Ordered log of mutating calls, e.g. `"delete_realm_role legacy"`.
    writes: Mutex<Vec<String>>,
    /// When set, the next partial import returns this result without
    /// applying anything.
    partial_import_override: Mutex<Option<PartialImportResult>>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl FakeAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake with the realm itself already present.
    pub fn with_realm(realm: &str) -> Self {
        let fake = Self::new();
        {
            let mut state = fake.state.lock().unwrap();
            state.realm = Some(RealmRepresentation {
                id: Some(new_id()),
                realm: realm.to_string(),
                ..RealmRepresentation::default()
            });
        }
        fake
    }

    fn record(&self, entry: impl Into<String>) {
        self.writes.lock().unwrap().push(entry.into());
    }

    /// The ordered mutating-call log.
    pub fn write_log(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of mutating calls issued so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Clear the mutating-call log (state is kept).
    pub fn reset_log(&self) {
        self.writes.lock().unwrap().clear();
    }

    /// Force the next partial import to report the given counters.
    pub fn override_next_partial_import(&self, result: PartialImportResult) {
        *self.partial_import_override.lock().unwrap() = Some(result);
    }

    // ── State seeding and inspection for tests ────────────────────────

    pub fn seed_realm_role(&self, name: &str) -> String {
        let id = new_id();
        self.state.lock().unwrap().realm_roles.push(RoleRepresentation {
            id: Some(id.clone()),
            name: name.to_string(),
            ..RoleRepresentation::default()
        });
        id
    }

    pub fn seed_client(&self, client_id: &str) -> String {
        let id = new_id();
        self.state.lock().unwrap().clients.push(ClientRepresentation {
            id: Some(id.clone()),
            client_id: client_id.to_string(),
            ..ClientRepresentation::default()
        });
        id
    }

    pub fn seed_client_scope(&self, name: &str) -> String {
        let id = new_id();
        self.state.lock().unwrap().scopes.push(ClientScopeRepresentation {
            id: Some(id.clone()),
            name: name.to_string(),
            ..ClientScopeRepresentation::default()
        });
        id
    }

    pub fn seed_user(&self, username: &str) -> String {
        let id = new_id();
        self.state.lock().unwrap().users.push(UserRepresentation {
            id: Some(id.clone()),
            username: username.to_string(),
            enabled: Some(true),
            ..UserRepresentation::default()
        });
        id
    }

    /// Seed a top-level flow and return its id.
    pub fn seed_flow(&self, alias: &str) -> String {
        let id = new_id();
        let mut state = self.state.lock().unwrap();
        state.flows.push(AuthenticationFlowRepresentation {
            id: Some(id.clone()),
            alias: alias.to_string(),
            description: None,
            provider_id: Some("basic-flow".to_string()),
            top_level: true,
            built_in: false,
        });
        state.executions.entry(alias.to_string()).or_default();
        id
    }

    /// Seed a subflow entry under `parent_alias` and return its entry id.
    pub fn seed_subflow_entry(&self, parent_alias: &str, alias: &str, requirement: &str) -> String {
        let id = new_id();
        let mut state = self.state.lock().unwrap();
        state
            .executions
            .entry(parent_alias.to_string())
            .or_default()
            .push(ExecEntry {
                id: id.clone(),
                is_flow: true,
                subflow_alias: Some(alias.to_string()),
                requirement: requirement.to_string(),
                ..ExecEntry::default()
            });
        state.executions.entry(alias.to_string()).or_default();
        id
    }

    /// Seed a leaf execution under `parent_alias` and return its id.
    pub fn seed_execution(&self, parent_alias: &str, provider: &str, requirement: &str) -> String {
        let id = new_id();
        self.state
            .lock()
            .unwrap()
            .executions
            .entry(parent_alias.to_string())
            .or_default()
            .push(ExecEntry {
                id: id.clone(),
                is_flow: false,
                provider: Some(provider.to_string()),
                requirement: requirement.to_string(),
                ..ExecEntry::default()
            });
        id
    }

    pub fn realm_role_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .realm_roles
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn client_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .clients
            .iter()
            .map(|c| c.client_id.clone())
            .collect()
    }

    pub fn usernames(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .map(|u| u.username.clone())
            .collect()
    }

    /// Flatten the execution tree of a flow exactly like the admin API:
    /// `(level, is_flow, provider_or_alias, requirement)` per entry.
    pub fn flattened_executions(&self, alias: &str) -> Vec<(i32, bool, String, String)> {
        let state = self.state.lock().unwrap();
        let mut out = Vec::new();
        flatten_for_test(&state, alias, 0, &mut out);
        out
    }

    fn find_role_by_id(state: &State, role_id: &str) -> Option<RoleRepresentation> {
        state
            .realm_roles
            .iter()
            .find(|r| r.id.as_deref() == Some(role_id))
            .cloned()
            .or_else(|| {
                state.client_roles.iter().find_map(|(client_internal_id, roles)| {
                    roles
                        .iter()
                        .find(|r| r.id.as_deref() == Some(role_id))
                        .cloned()
                        .map(|mut role| {
                            role.client_role = Some(true);
                            role.container_id = Some(client_internal_id.clone());
                            role
                        })
                })
            })
    }
}

fn flatten_for_test(
    state: &State,
    alias: &str,
    level: i32,
    out: &mut Vec<(i32, bool, String, String)>,
) {
    let Some(entries) = state.executions.get(alias) else {
        return;
    };
    for entry in entries {
        let label = entry
            .subflow_alias
            .clone()
            .or_else(|| entry.provider.clone())
            .unwrap_or_default();
        out.push((level, entry.is_flow, label, entry.requirement.clone()));
        if let Some(sub) = &entry.subflow_alias {
            flatten_for_test(state, sub, level + 1, out);
        }
    }
}

fn flatten_executions(
    state: &State,
    alias: &str,
    level: i32,
    out: &mut Vec<AuthenticationExecutionInfoRepresentation>,
) {
    let Some(entries) = state.executions.get(alias) else {
        return;
    };
    for entry in entries {
        out.push(AuthenticationExecutionInfoRepresentation {
            id: Some(entry.id.clone()),
            requirement: Some(entry.requirement.clone()),
            display_name: None,
            alias: entry.subflow_alias.clone(),
            description: entry.description.clone(),
            provider_id: entry.provider.clone(),
            authentication_flow: entry.is_flow,
            level,
            index: 0,
            flow_id: None,
            authentication_config: entry.config_id.clone(),
            configurable: None,
        });
        if let Some(sub) = &entry.subflow_alias {
            flatten_executions(state, sub, level + 1, out);
        }
    }
}

/// Locate an execution entry by id anywhere under the given flow alias.
fn find_entry_mut<'a>(
    executions: &'a mut HashMap<String, Vec<ExecEntry>>,
    id: &str,
) -> Option<&'a mut ExecEntry> {
    // Two passes keep the borrow checker happy: find the owning alias and
    // index first, then reborrow mutably.
    let mut location = None;
    for (alias, entries) in executions.iter() {
        if let Some(index) = entries.iter().position(|e| e.id == id) {
            location = Some((alias.clone(), index));
            break;
        }
    }
    let (alias, index) = location?;
    executions.get_mut(&alias).map(|entries| &mut entries[index])
}

#[async_trait]
impl AdminApi for FakeAdmin {
    async fn get_realm(&self, _realm: &str) -> ClientResult<Option<RealmRepresentation>> {
        Ok(self.state.lock().unwrap().realm.clone())
    }

    async fn import_realm(&self, rep: &RealmRepresentation) -> ClientResult<()> {
        self.record(format!("import_realm {}", rep.realm));
        let mut state = self.state.lock().unwrap();
        let mut stored = rep.clone();
        stored.id = Some(new_id());
        state.realm = Some(stored);
        Ok(())
    }

    async fn update_realm(&self, realm: &str, rep: &RealmRepresentation) -> ClientResult<()> {
        self.record(format!("update_realm {realm}"));
        self.state.lock().unwrap().realm = Some(rep.clone());
        Ok(())
    }

    async fn list_client_scopes(
        &self,
        _realm: &str,
    ) -> ClientResult<Vec<ClientScopeRepresentation>> {
        Ok(self.state.lock().unwrap().scopes.clone())
    }

    async fn create_client_scope(
        &self,
        _realm: &str,
        rep: &ClientScopeRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("create_client_scope {}", rep.name));
        let mut stored = rep.clone();
        stored.id = Some(new_id());
        self.state.lock().unwrap().scopes.push(stored);
        Ok(())
    }

    async fn update_client_scope(
        &self,
        _realm: &str,
        id: &str,
        rep: &ClientScopeRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_client_scope {}", rep.name));
        let mut state = self.state.lock().unwrap();
        if let Some(scope) = state.scopes.iter_mut().find(|s| s.id.as_deref() == Some(id)) {
            *scope = rep.clone();
            scope.id = Some(id.to_string());
        }
        Ok(())
    }

    async fn delete_client_scope(&self, _realm: &str, id: &str) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.scopes.iter().position(|s| s.id.as_deref() == Some(id)) else {
            return Err(ClientError::NotFound(format!("client scope {id}")));
        };
        let scope = state.scopes.remove(index);
        state.scope_mappers.remove(id);
        drop(state);
        self.record(format!("delete_client_scope {}", scope.name));
        Ok(())
    }

    async fn list_protocol_mappers(
        &self,
        _realm: &str,
        owner: MapperOwner<'_>,
    ) -> ClientResult<Vec<ProtocolMapperRepresentation>> {
        let state = self.state.lock().unwrap();
        let mappers = match owner {
            MapperOwner::ClientScope(id) => state.scope_mappers.get(id),
            MapperOwner::Client(id) => state.client_mappers.get(id),
        };
        Ok(mappers.cloned().unwrap_or_default())
    }

    async fn create_protocol_mapper(
        &self,
        _realm: &str,
        owner: MapperOwner<'_>,
        rep: &ProtocolMapperRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("create_protocol_mapper {}", rep.name));
        let mut stored = rep.clone();
        stored.id = Some(new_id());
        let mut state = self.state.lock().unwrap();
        let mappers = match owner {
            MapperOwner::ClientScope(id) => state.scope_mappers.entry(id.to_string()),
            MapperOwner::Client(id) => state.client_mappers.entry(id.to_string()),
        };
        mappers.or_default().push(stored);
        Ok(())
    }

    async fn update_protocol_mapper(
        &self,
        _realm: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
        rep: &ProtocolMapperRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_protocol_mapper {}", rep.name));
        let mut state = self.state.lock().unwrap();
        let mappers = match owner {
            MapperOwner::ClientScope(id) => state.scope_mappers.get_mut(id),
            MapperOwner::Client(id) => state.client_mappers.get_mut(id),
        };
        if let Some(mappers) = mappers {
            if let Some(mapper) = mappers.iter_mut().find(|m| m.id.as_deref() == Some(mapper_id)) {
                *mapper = rep.clone();
                mapper.id = Some(mapper_id.to_string());
            }
        }
        Ok(())
    }

    async fn delete_protocol_mapper(
        &self,
        _realm: &str,
        owner: MapperOwner<'_>,
        mapper_id: &str,
    ) -> ClientResult<()> {
        self.record(format!("delete_protocol_mapper {mapper_id}"));
        let mut state = self.state.lock().unwrap();
        let mappers = match owner {
            MapperOwner::ClientScope(id) => state.scope_mappers.get_mut(id),
            MapperOwner::Client(id) => state.client_mappers.get_mut(id),
        };
        if let Some(mappers) = mappers {
            mappers.retain(|m| m.id.as_deref() != Some(mapper_id));
        }
        Ok(())
    }

    async fn list_clients(&self, _realm: &str) -> ClientResult<Vec<ClientRepresentation>> {
        Ok(self.state.lock().unwrap().clients.clone())
    }

    async fn find_client(
        &self,
        _realm: &str,
        client_id: &str,
    ) -> ClientResult<Option<ClientRepresentation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .clients
            .iter()
            .find(|c| c.client_id == client_id)
            .cloned())
    }

    async fn update_client(
        &self,
        _realm: &str,
        id: &str,
        rep: &ClientRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_client {}", rep.client_id));
        let mut state = self.state.lock().unwrap();
        if let Some(client) = state.clients.iter_mut().find(|c| c.id.as_deref() == Some(id)) {
            *client = rep.clone();
            client.id = Some(id.to_string());
        }
        Ok(())
    }

    async fn delete_client(&self, _realm: &str, id: &str) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.clients.iter().position(|c| c.id.as_deref() == Some(id)) else {
            return Err(ClientError::NotFound(format!("client {id}")));
        };
        let client = state.clients.remove(index);
        state.client_mappers.remove(id);
        state.client_roles.remove(id);
        drop(state);
        self.record(format!("delete_client {}", client.client_id));
        Ok(())
    }

    async fn partial_import(
        &self,
        _realm: &str,
        request: &PartialImportRequest,
    ) -> ClientResult<PartialImportResult> {
        self.record("partial_import".to_string());
        if let Some(result) = self.partial_import_override.lock().unwrap().take() {
            return Ok(result);
        }

        let mut state = self.state.lock().unwrap();
        let mut added = 0;
        let mut skipped = 0;
        for client in request.clients.iter().flatten() {
            if state.clients.iter().any(|c| c.client_id == client.client_id) {
                skipped += 1;
                continue;
            }
            let id = new_id();
            let mut stored = client.clone();
            stored.id = Some(id.clone());
            let mappers = std::mem::take(&mut stored.protocol_mappers);
            let mut stored_mappers = Vec::new();
            for mapper in mappers {
                let mut m = mapper;
                m.id = Some(new_id());
                stored_mappers.push(m);
            }
            state.client_mappers.insert(id, stored_mappers);
            state.clients.push(stored);
            added += 1;
        }
        for user in request.users.iter().flatten() {
            if state.users.iter().any(|u| u.username == user.username) {
                skipped += 1;
                continue;
            }
            let mut stored = user.clone();
            stored.id = Some(new_id());
            stored.credentials = Vec::new();
            state.users.push(stored);
            added += 1;
        }
        Ok(PartialImportResult {
            added,
            overwritten: 0,
            skipped,
        })
    }

    async fn get_default_client_scopes(
        &self,
        _realm: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<ClientScopeRepresentation>> {
        let state = self.state.lock().unwrap();
        let ids = state.default_scopes.get(client_internal_id).cloned().unwrap_or_default();
        Ok(state
            .scopes
            .iter()
            .filter(|s| s.id.as_ref().is_some_and(|id| ids.contains(id)))
            .cloned()
            .collect())
    }

    async fn add_default_client_scope(
        &self,
        _realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()> {
        self.record(format!("add_default_client_scope {scope_id}"));
        self.state
            .lock()
            .unwrap()
            .default_scopes
            .entry(client_internal_id.to_string())
            .or_default()
            .push(scope_id.to_string());
        Ok(())
    }

    async fn remove_default_client_scope(
        &self,
        _realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()> {
        self.record(format!("remove_default_client_scope {scope_id}"));
        if let Some(ids) = self
            .state
            .lock()
            .unwrap()
            .default_scopes
            .get_mut(client_internal_id)
        {
            ids.retain(|id| id != scope_id);
        }
        Ok(())
    }

    async fn get_optional_client_scopes(
        &self,
        _realm: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<ClientScopeRepresentation>> {
        let state = self.state.lock().unwrap();
        let ids = state.optional_scopes.get(client_internal_id).cloned().unwrap_or_default();
        Ok(state
            .scopes
            .iter()
            .filter(|s| s.id.as_ref().is_some_and(|id| ids.contains(id)))
            .cloned()
            .collect())
    }

    async fn add_optional_client_scope(
        &self,
        _realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()> {
        self.record(format!("add_optional_client_scope {scope_id}"));
        self.state
            .lock()
            .unwrap()
            .optional_scopes
            .entry(client_internal_id.to_string())
            .or_default()
            .push(scope_id.to_string());
        Ok(())
    }

    async fn remove_optional_client_scope(
        &self,
        _realm: &str,
        client_internal_id: &str,
        scope_id: &str,
    ) -> ClientResult<()> {
        self.record(format!("remove_optional_client_scope {scope_id}"));
        if let Some(ids) = self
            .state
            .lock()
            .unwrap()
            .optional_scopes
            .get_mut(client_internal_id)
        {
            ids.retain(|id| id != scope_id);
        }
        Ok(())
    }

    async fn list_realm_roles(&self, _realm: &str) -> ClientResult<Vec<RoleRepresentation>> {
        Ok(self.state.lock().unwrap().realm_roles.clone())
    }

    async fn get_realm_role(
        &self,
        _realm: &str,
        name: &str,
    ) -> ClientResult<Option<RoleRepresentation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .realm_roles
            .iter()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn create_realm_role(
        &self,
        _realm: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("create_realm_role {}", rep.name));
        let mut stored = rep.clone();
        stored.id = Some(new_id());
        self.state.lock().unwrap().realm_roles.push(stored);
        Ok(())
    }

    async fn update_realm_role(
        &self,
        _realm: &str,
        name: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_realm_role {name}"));
        let mut state = self.state.lock().unwrap();
        if let Some(role) = state.realm_roles.iter_mut().find(|r| r.name == name) {
            let id = role.id.clone();
            *role = rep.clone();
            role.id = id;
        }
        Ok(())
    }

    async fn delete_realm_role(&self, _realm: &str, name: &str) -> ClientResult<()> {
        self.record(format!("delete_realm_role {name}"));
        self.state.lock().unwrap().realm_roles.retain(|r| r.name != name);
        Ok(())
    }

    async fn list_client_roles(
        &self,
        _realm: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .client_roles
            .get(client_internal_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_client_role(
        &self,
        _realm: &str,
        client_internal_id: &str,
        name: &str,
    ) -> ClientResult<Option<RoleRepresentation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .client_roles
            .get(client_internal_id)
            .and_then(|roles| roles.iter().find(|r| r.name == name))
            .cloned())
    }

    async fn create_client_role(
        &self,
        _realm: &str,
        client_internal_id: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("create_client_role {}", rep.name));
        let mut stored = rep.clone();
        stored.id = Some(new_id());
        stored.client_role = Some(true);
        stored.container_id = Some(client_internal_id.to_string());
        self.state
            .lock()
            .unwrap()
            .client_roles
            .entry(client_internal_id.to_string())
            .or_default()
            .push(stored);
        Ok(())
    }

    async fn update_client_role(
        &self,
        _realm: &str,
        client_internal_id: &str,
        name: &str,
        rep: &RoleRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_client_role {name}"));
        let mut state = self.state.lock().unwrap();
        if let Some(roles) = state.client_roles.get_mut(client_internal_id) {
            if let Some(role) = roles.iter_mut().find(|r| r.name == name) {
                let id = role.id.clone();
                *role = rep.clone();
                role.id = id;
                role.client_role = Some(true);
                role.container_id = Some(client_internal_id.to_string());
            }
        }
        Ok(())
    }

    async fn delete_client_role(
        &self,
        _realm: &str,
        client_internal_id: &str,
        name: &str,
    ) -> ClientResult<()> {
        self.record(format!("delete_client_role {name}"));
        if let Some(roles) = self
            .state
            .lock()
            .unwrap()
            .client_roles
            .get_mut(client_internal_id)
        {
            roles.retain(|r| r.name != name);
        }
        Ok(())
    }

    async fn get_role_composites(
        &self,
        _realm: &str,
        role_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>> {
        let state = self.state.lock().unwrap();
        let child_ids = state.composites.get(role_id).cloned().unwrap_or_default();
        Ok(child_ids
            .iter()
            .filter_map(|id| Self::find_role_by_id(&state, id))
            .collect())
    }

    async fn add_role_composites(
        &self,
        _realm: &str,
        role_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.record(format!("add_role_composites {role_id}"));
        let mut state = self.state.lock().unwrap();
        let children = state.composites.entry(role_id.to_string()).or_default();
        for role in roles {
            if let Some(id) = &role.id {
                if !children.contains(id) {
                    children.push(id.clone());
                }
            }
        }
        Ok(())
    }

    async fn remove_role_composites(
        &self,
        _realm: &str,
        role_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.record(format!("remove_role_composites {role_id}"));
        let mut state = self.state.lock().unwrap();
        if let Some(children) = state.composites.get_mut(role_id) {
            for role in roles {
                if let Some(id) = &role.id {
                    children.retain(|child| child != id);
                }
            }
        }
        Ok(())
    }

    async fn list_identity_providers(
        &self,
        _realm: &str,
    ) -> ClientResult<Vec<IdentityProviderRepresentation>> {
        Ok(self.state.lock().unwrap().idps.clone())
    }

    async fn create_identity_provider(
        &self,
        _realm: &str,
        rep: &IdentityProviderRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("create_identity_provider {}", rep.alias));
        let mut stored = rep.clone();
        stored.internal_id = Some(new_id());
        self.state.lock().unwrap().idps.push(stored);
        Ok(())
    }

    async fn update_identity_provider(
        &self,
        _realm: &str,
        alias: &str,
        rep: &IdentityProviderRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_identity_provider {alias}"));
        let mut state = self.state.lock().unwrap();
        if let Some(idp) = state.idps.iter_mut().find(|p| p.alias == alias) {
            let id = idp.internal_id.clone();
            *idp = rep.clone();
            idp.internal_id = id;
        }
        Ok(())
    }

    async fn delete_identity_provider(&self, _realm: &str, alias: &str) -> ClientResult<()> {
        self.record(format!("delete_identity_provider {alias}"));
        let mut state = self.state.lock().unwrap();
        state.idps.retain(|p| p.alias != alias);
        state.idp_mappers.remove(alias);
        Ok(())
    }

    async fn list_identity_provider_mappers(
        &self,
        _realm: &str,
        alias: &str,
    ) -> ClientResult<Vec<IdentityProviderMapperRepresentation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .idp_mappers
            .get(alias)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_identity_provider_mapper(
        &self,
        _realm: &str,
        alias: &str,
        rep: &IdentityProviderMapperRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("create_identity_provider_mapper {}", rep.name));
        let mut stored = rep.clone();
        stored.id = Some(new_id());
        self.state
            .lock()
            .unwrap()
            .idp_mappers
            .entry(alias.to_string())
            .or_default()
            .push(stored);
        Ok(())
    }

    async fn update_identity_provider_mapper(
        &self,
        _realm: &str,
        alias: &str,
        mapper_id: &str,
        rep: &IdentityProviderMapperRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_identity_provider_mapper {}", rep.name));
        let mut state = self.state.lock().unwrap();
        if let Some(mappers) = state.idp_mappers.get_mut(alias) {
            if let Some(mapper) = mappers.iter_mut().find(|m| m.id.as_deref() == Some(mapper_id)) {
                *mapper = rep.clone();
                mapper.id = Some(mapper_id.to_string());
            }
        }
        Ok(())
    }

    async fn delete_identity_provider_mapper(
        &self,
        _realm: &str,
        alias: &str,
        mapper_id: &str,
    ) -> ClientResult<()> {
        self.record(format!("delete_identity_provider_mapper {mapper_id}"));
        if let Some(mappers) = self.state.lock().unwrap().idp_mappers.get_mut(alias) {
            mappers.retain(|m| m.id.as_deref() != Some(mapper_id));
        }
        Ok(())
    }

    async fn list_users(
        &self,
        _realm: &str,
        first: i64,
        max: i64,
    ) -> ClientResult<Vec<UserRepresentation>> {
        let state = self.state.lock().unwrap();
        let start = usize::try_from(first).unwrap_or(0);
        Ok(state
            .users
            .iter()
            .skip(start)
            .take(usize::try_from(max).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn find_user(
        &self,
        _realm: &str,
        username: &str,
    ) -> ClientResult<Option<UserRepresentation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_user(
        &self,
        _realm: &str,
        id: &str,
        rep: &UserRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_user {}", rep.username));
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter_mut().find(|u| u.id.as_deref() == Some(id)) {
            *user = rep.clone();
            user.id = Some(id.to_string());
        }
        Ok(())
    }

    async fn delete_user(&self, _realm: &str, id: &str) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.users.iter().position(|u| u.id.as_deref() == Some(id)) else {
            return Err(ClientError::NotFound(format!("user {id}")));
        };
        let user = state.users.remove(index);
        state.user_realm_roles.remove(id);
        state.federated.remove(id);
        drop(state);
        self.record(format!("delete_user {}", user.username));
        Ok(())
    }

    async fn get_user_realm_roles(
        &self,
        _realm: &str,
        user_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>> {
        let state = self.state.lock().unwrap();
        let ids = state.user_realm_roles.get(user_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| Self::find_role_by_id(&state, id))
            .collect())
    }

    async fn add_user_realm_roles(
        &self,
        _realm: &str,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.record(format!("add_user_realm_roles {user_id}"));
        let mut state = self.state.lock().unwrap();
        let assigned = state.user_realm_roles.entry(user_id.to_string()).or_default();
        for role in roles {
            if let Some(id) = &role.id {
                if !assigned.contains(id) {
                    assigned.push(id.clone());
                }
            }
        }
        Ok(())
    }

    async fn remove_user_realm_roles(
        &self,
        _realm: &str,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.record(format!("remove_user_realm_roles {user_id}"));
        let mut state = self.state.lock().unwrap();
        if let Some(assigned) = state.user_realm_roles.get_mut(user_id) {
            for role in roles {
                if let Some(id) = &role.id {
                    assigned.retain(|assigned_id| assigned_id != id);
                }
            }
        }
        Ok(())
    }

    async fn get_user_client_roles(
        &self,
        _realm: &str,
        user_id: &str,
        client_internal_id: &str,
    ) -> ClientResult<Vec<RoleRepresentation>> {
        let state = self.state.lock().unwrap();
        let key = (user_id.to_string(), client_internal_id.to_string());
        let ids = state.user_client_roles.get(&key).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| Self::find_role_by_id(&state, id))
            .collect())
    }

    async fn add_user_client_roles(
        &self,
        _realm: &str,
        user_id: &str,
        client_internal_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.record(format!("add_user_client_roles {user_id}"));
        let mut state = self.state.lock().unwrap();
        let key = (user_id.to_string(), client_internal_id.to_string());
        let assigned = state.user_client_roles.entry(key).or_default();
        for role in roles {
            if let Some(id) = &role.id {
                if !assigned.contains(id) {
                    assigned.push(id.clone());
                }
            }
        }
        Ok(())
    }

    async fn remove_user_client_roles(
        &self,
        _realm: &str,
        user_id: &str,
        client_internal_id: &str,
        roles: &[RoleRepresentation],
    ) -> ClientResult<()> {
        self.record(format!("remove_user_client_roles {user_id}"));
        let mut state = self.state.lock().unwrap();
        let key = (user_id.to_string(), client_internal_id.to_string());
        if let Some(assigned) = state.user_client_roles.get_mut(&key) {
            for role in roles {
                if let Some(id) = &role.id {
                    assigned.retain(|assigned_id| assigned_id != id);
                }
            }
        }
        Ok(())
    }

    async fn list_federated_identities(
        &self,
        _realm: &str,
        user_id: &str,
    ) -> ClientResult<Vec<FederatedIdentityRepresentation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .federated
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_federated_identity(
        &self,
        _realm: &str,
        user_id: &str,
        provider_alias: &str,
        rep: &FederatedIdentityRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("add_federated_identity {provider_alias}"));
        self.state
            .lock()
            .unwrap()
            .federated
            .entry(user_id.to_string())
            .or_default()
            .push(rep.clone());
        Ok(())
    }

    async fn remove_federated_identity(
        &self,
        _realm: &str,
        user_id: &str,
        provider_alias: &str,
    ) -> ClientResult<()> {
        self.record(format!("remove_federated_identity {provider_alias}"));
        if let Some(identities) = self.state.lock().unwrap().federated.get_mut(user_id) {
            identities.retain(|i| i.identity_provider != provider_alias);
        }
        Ok(())
    }

    async fn list_flows(
        &self,
        _realm: &str,
    ) -> ClientResult<Vec<AuthenticationFlowRepresentation>> {
        Ok(self.state.lock().unwrap().flows.clone())
    }

    async fn create_flow(
        &self,
        _realm: &str,
        rep: &AuthenticationFlowRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("create_flow {}", rep.alias));
        let mut state = self.state.lock().unwrap();
        let mut stored = rep.clone();
        stored.id = Some(new_id());
        state.executions.entry(stored.alias.clone()).or_default();
        state.flows.push(stored);
        Ok(())
    }

    async fn update_flow(
        &self,
        _realm: &str,
        id: &str,
        rep: &AuthenticationFlowRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_flow {}", rep.alias));
        let mut state = self.state.lock().unwrap();
        if let Some(flow) = state.flows.iter_mut().find(|f| f.id.as_deref() == Some(id)) {
            *flow = rep.clone();
            flow.id = Some(id.to_string());
        }
        Ok(())
    }

    async fn delete_flow(&self, _realm: &str, id: &str) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.flows.iter().position(|f| f.id.as_deref() == Some(id)) else {
            return Err(ClientError::NotFound(format!("flow {id}")));
        };
        let flow = state.flows.remove(index);
        state.executions.remove(&flow.alias);
        drop(state);
        self.record(format!("delete_flow {}", flow.alias));
        Ok(())
    }

    async fn list_flow_executions(
        &self,
        _realm: &str,
        flow_alias: &str,
    ) -> ClientResult<Vec<AuthenticationExecutionInfoRepresentation>> {
        let state = self.state.lock().unwrap();
        if !state.executions.contains_key(flow_alias) {
            return Err(ClientError::NotFound(format!("flow {flow_alias}")));
        }
        let mut out = Vec::new();
        flatten_executions(&state, flow_alias, 0, &mut out);
        Ok(out)
    }

    async fn add_execution(
        &self,
        _realm: &str,
        flow_alias: &str,
        provider: &str,
    ) -> ClientResult<()> {
        self.record(format!("add_execution {flow_alias}/{provider}"));
        let mut state = self.state.lock().unwrap();
        let Some(entries) = state.executions.get_mut(flow_alias) else {
            return Err(ClientError::NotFound(format!("flow {flow_alias}")));
        };
        entries.push(ExecEntry {
            id: new_id(),
            is_flow: false,
            provider: Some(provider.to_string()),
            // Newly added executions start disabled, like the server.
            requirement: "DISABLED".to_string(),
            ..ExecEntry::default()
        });
        Ok(())
    }

    async fn add_subflow(
        &self,
        _realm: &str,
        parent_alias: &str,
        request: &CreateSubflowRequest,
    ) -> ClientResult<()> {
        self.record(format!("add_subflow {parent_alias}/{}", request.alias));
        let mut state = self.state.lock().unwrap();
        if !state.executions.contains_key(parent_alias) {
            return Err(ClientError::NotFound(format!("flow {parent_alias}")));
        }
        state.executions.insert(request.alias.clone(), Vec::new());
        state
            .executions
            .get_mut(parent_alias)
            .expect("parent checked above")
            .push(ExecEntry {
                id: new_id(),
                is_flow: true,
                subflow_alias: Some(request.alias.clone()),
                subflow_description: request.description.clone(),
                requirement: "DISABLED".to_string(),
                description: request.description.clone(),
                ..ExecEntry::default()
            });
        Ok(())
    }

    async fn update_execution(
        &self,
        _realm: &str,
        flow_alias: &str,
        rep: &AuthenticationExecutionInfoRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_execution {flow_alias}"));
        let mut state = self.state.lock().unwrap();
        let Some(id) = rep.id.as_deref() else {
            return Err(ClientError::NotFound("execution without id".to_string()));
        };
        let Some(entry) = find_entry_mut(&mut state.executions, id) else {
            return Err(ClientError::NotFound(format!("execution {id}")));
        };
        if let Some(requirement) = &rep.requirement {
            entry.requirement = requirement.clone();
        }
        entry.description = rep.description.clone();
        Ok(())
    }

    async fn delete_execution(&self, _realm: &str, execution_id: &str) -> ClientResult<()> {
        self.record(format!("delete_execution {execution_id}"));
        let mut state = self.state.lock().unwrap();

        let mut location = None;
        for (alias, entries) in state.executions.iter() {
            if let Some(index) = entries.iter().position(|e| e.id == execution_id) {
                location = Some((alias.clone(), index));
                break;
            }
        }
        let Some((alias, index)) = location else {
            return Err(ClientError::NotFound(format!("execution {execution_id}")));
        };

        // The server refuses to delete a subflow that still has children;
        // the engine must delete bottom-up.
        let entry = state.executions[&alias][index].clone();
        if let Some(sub) = &entry.subflow_alias {
            if state.executions.get(sub).is_some_and(|children| !children.is_empty()) {
                return Err(ClientError::Conflict(format!(
                    "subflow {sub} still has executions"
                )));
            }
            state.executions.remove(sub);
        }
        state.executions.get_mut(&alias).expect("alias checked above").remove(index);
        Ok(())
    }

    async fn get_authenticator_config(
        &self,
        _realm: &str,
        config_id: &str,
    ) -> ClientResult<AuthenticatorConfigRepresentation> {
        self.state
            .lock()
            .unwrap()
            .configs
            .get(config_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("authenticator config {config_id}")))
    }

    async fn create_execution_config(
        &self,
        _realm: &str,
        execution_id: &str,
        rep: &AuthenticatorConfigRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("create_execution_config {}", rep.alias));
        let mut state = self.state.lock().unwrap();
        let id = new_id();
        let mut stored = rep.clone();
        stored.id = Some(id.clone());
        state.configs.insert(id.clone(), stored);
        let Some(entry) = find_entry_mut(&mut state.executions, execution_id) else {
            return Err(ClientError::NotFound(format!("execution {execution_id}")));
        };
        entry.config_id = Some(id);
        Ok(())
    }

    async fn update_authenticator_config(
        &self,
        _realm: &str,
        config_id: &str,
        rep: &AuthenticatorConfigRepresentation,
    ) -> ClientResult<()> {
        self.record(format!("update_authenticator_config {}", rep.alias));
        let mut state = self.state.lock().unwrap();
        let mut stored = rep.clone();
        stored.id = Some(config_id.to_string());
        state.configs.insert(config_id.to_string(), stored);
        Ok(())
    }

    async fn delete_authenticator_config(
        &self,
        _realm: &str,
        config_id: &str,
    ) -> ClientResult<()> {
        self.record(format!("delete_authenticator_config {config_id}"));
        let mut state = self.state.lock().unwrap();
        state.configs.remove(config_id);
        for entries in state.executions.values_mut() {
            for entry in entries.iter_mut() {
                if entry.config_id.as_deref() == Some(config_id) {
                    entry.config_id = None;
                }
            }
        }
        Ok(())
    }

    async fn list_locales(&self, _realm: &str) -> ClientResult<Vec<String>> {
        Ok(self.state.lock().unwrap().locales.keys().cloned().collect())
    }

    async fn get_locale_texts(
        &self,
        _realm: &str,
        locale: &str,
    ) -> ClientResult<BTreeMap<String, String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .locales
            .get(locale)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_locale_texts(
        &self,
        _realm: &str,
        locale: &str,
        texts: &BTreeMap<String, String>,
    ) -> ClientResult<()> {
        self.record(format!("update_locale_texts {locale}"));
        self.state
            .lock()
            .unwrap()
            .locales
            .insert(locale.to_string(), texts.clone());
        Ok(())
    }

    async fn delete_locale(&self, _realm: &str, locale: &str) -> ClientResult<()> {
        self.record(format!("delete_locale {locale}"));
        self.state.lock().unwrap().locales.remove(locale);
        Ok(())
    }

    async fn get_user_profile(&self, _realm: &str) -> ClientResult<UserProfileConfig> {
        Ok(self.state.lock().unwrap().profile.clone())
    }

    async fn update_user_profile(
        &self,
        _realm: &str,
        config: &UserProfileConfig,
    ) -> ClientResult<()> {
        self.record("update_user_profile".to_string());
        self.state.lock().unwrap().profile = config.clone();
        Ok(())
    }
}
