//! Role reconciliation: simple realm and client roles, then the composite
//! role graph.
//!
//! A role's own fields and its composite edges are two separate diff
//! passes. Edges are plain (owner, target) tuples keyed by container and
//! role name; the composite pass runs only after every simple pass has
//! completed, for both realm- and client-scoped roles.

use std::collections::{BTreeSet, HashMap};

use realmseed_model::rep::RoleRepresentation;
use realmseed_model::spec::RoleSpec;
use realmseed_model::{EntityCategory, Operation, RealmSpec};
use tracing::{debug, info};

use crate::compare;
use crate::diff::diff_by_key;
use crate::error::{EngineError, EngineResult};
use crate::summary::RealmRunSummary;

use super::{require_id, ClientIdMap, Reconciler};

/// A composite edge endpoint: the containing client's internal id for
/// client-scoped targets, `None` for realm-scoped ones, plus the role name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct EdgeKey {
    container: Option<String>,
    name: String,
}

impl Reconciler<'_> {
    /// Converge the realm-scoped roles (simple pass, no edges).
    pub(crate) async fn realm_roles(
        &self,
        spec: &RealmSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        self.guard()?;
        let live = self.api.list_realm_roles(&spec.realm).await?;
        let tuple = diff_by_key(
            "realm role",
            &spec.realm_roles,
            &live,
            |d| &d.name,
            |l| &l.name,
            |d, l| !compare::role_changes(d, l).is_empty(),
        )?;

        for role in tuple.to_delete {
            if self.allowed(EntityCategory::RealmRole, Some(&role.name), Operation::Delete) {
                self.guard()?;
                self.api.delete_realm_role(&spec.realm, &role.name).await?;
                summary.record_delete(EntityCategory::RealmRole);
                info!(realm = %spec.realm, role = %role.name, "deleted realm role");
            }
        }

        for role in tuple.to_create {
            if self.allowed(EntityCategory::RealmRole, Some(&role.name), Operation::Create) {
                self.guard()?;
                self.api.create_realm_role(&spec.realm, &role.to_representation()).await?;
                summary.record_create(EntityCategory::RealmRole);
                info!(realm = %spec.realm, role = %role.name, "created realm role");
            }
        }

        for (desired, live_role) in tuple.to_update {
            if self.allowed(EntityCategory::RealmRole, Some(&desired.name), Operation::Update) {
                let mut payload = desired.to_representation();
                payload.id = live_role.id.clone();
                self.guard()?;
                self.api.update_realm_role(&spec.realm, &desired.name, &payload).await?;
                summary.record_update(EntityCategory::RealmRole);
                info!(realm = %spec.realm, role = %desired.name, "updated realm role");
            }
        }
        Ok(())
    }

    /// Converge the client-scoped roles, grouped by owning client
    /// (simple pass, no edges). Requires the client-id map from the
    /// clients pass.
    pub(crate) async fn client_roles(
        &self,
        spec: &RealmSpec,
        client_ids: &ClientIdMap,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        for (client_name, roles) in &spec.client_roles {
            let Some(internal_id) = client_ids.get(client_name) else {
                debug!(
                    realm = %spec.realm,
                    client = %client_name,
                    "owning client has no live id (creation denied?), skipping its roles"
                );
                continue;
            };

            self.guard()?;
            let live = self.api.list_client_roles(&spec.realm, internal_id).await?;
            let tuple = diff_by_key(
                "client role",
                roles,
                &live,
                |d| &d.name,
                |l| &l.name,
                |d, l| !compare::role_changes(d, l).is_empty(),
            )?;

            for role in tuple.to_delete {
                if self.allowed(EntityCategory::ClientRole, Some(&role.name), Operation::Delete) {
                    self.guard()?;
                    self.api
                        .delete_client_role(&spec.realm, internal_id, &role.name)
                        .await?;
                    summary.record_delete(EntityCategory::ClientRole);
                    info!(realm = %spec.realm, client = %client_name, role = %role.name, "deleted client role");
                }
            }

            for role in tuple.to_create {
                if self.allowed(EntityCategory::ClientRole, Some(&role.name), Operation::Create) {
                    self.guard()?;
                    self.api
                        .create_client_role(&spec.realm, internal_id, &role.to_representation())
                        .await?;
                    summary.record_create(EntityCategory::ClientRole);
                    info!(realm = %spec.realm, client = %client_name, role = %role.name, "created client role");
                }
            }

            for (desired, live_role) in tuple.to_update {
                if self.allowed(EntityCategory::ClientRole, Some(&desired.name), Operation::Update)
                {
                    let mut payload = desired.to_representation();
                    payload.id = live_role.id.clone();
                    self.guard()?;
                    self.api
                        .update_client_role(&spec.realm, internal_id, &desired.name, &payload)
                        .await?;
                    summary.record_update(EntityCategory::ClientRole);
                    info!(realm = %spec.realm, client = %client_name, role = %desired.name, "updated client role");
                }
            }
        }
        Ok(())
    }

    /// Converge the composite role graph, edges only. Runs after both
    /// simple passes so every edge target can be resolved to a live role.
    pub(crate) async fn composite_roles(
        &self,
        spec: &RealmSpec,
        client_ids: &ClientIdMap,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        for role in &spec.realm_roles {
            self.composite_edges(spec, None, role, client_ids, summary).await?;
        }
        for (client_name, roles) in &spec.client_roles {
            for role in roles {
                self.composite_edges(spec, Some(client_name), role, client_ids, summary)
                    .await?;
            }
        }
        Ok(())
    }

    /// Converge the composite edges of one role.
    ///
    /// The policy check is a documented permissive-OR: an edge operation
    /// is applied when either the owning role's name or the target role's
    /// name permits it under its own category. This is asymmetric versus
    /// every other reconciler's single-key check.
    async fn composite_edges(
        &self,
        spec: &RealmSpec,
        owner_client: Option<&str>,
        role: &RoleSpec,
        client_ids: &ClientIdMap,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        let owner_category = match owner_client {
            Some(_) => EntityCategory::ClientRole,
            None => EntityCategory::RealmRole,
        };

        // Resolve the owning role remotely; a role whose creation was
        // denied has no edges to manage.
        self.guard()?;
        let owner_live = match owner_client {
            None => self.api.get_realm_role(&spec.realm, &role.name).await?,
            Some(client_name) => {
                let Some(internal_id) = client_ids.get(client_name) else {
                    debug!(
                        realm = %spec.realm,
                        client = %client_name,
                        role = %role.name,
                        "owning client has no live id, skipping composite edges"
                    );
                    return Ok(());
                };
                self.api.get_client_role(&spec.realm, internal_id, &role.name).await?
            }
        };
        let Some(owner_live) = owner_live else {
            debug!(realm = %spec.realm, role = %role.name, "role not present remotely, skipping composite edges");
            return Ok(());
        };
        let owner_id = require_id("role", &role.name, &owner_live.id)?;

        // Desired edges as (container, name) tuples; an absent composites
        // block means an empty desired edge set.
        let mut desired_edges: BTreeSet<EdgeKey> = BTreeSet::new();
        if let Some(composites) = &role.composites {
            for target in &composites.realm {
                desired_edges.insert(EdgeKey {
                    container: None,
                    name: target.clone(),
                });
            }
            for (client_name, targets) in &composites.client {
                let internal_id = client_ids.get(client_name).ok_or_else(|| {
                    EngineError::ConfigIntegrity {
                        entity: "client",
                        name: client_name.clone(),
                        detail: format!(
                            "composite edges of role '{}' target a client with no live id",
                            role.name
                        ),
                    }
                })?;
                for target in targets {
                    desired_edges.insert(EdgeKey {
                        container: Some(internal_id.clone()),
                        name: target.clone(),
                    });
                }
            }
        }

        self.guard()?;
        let live_children = self.api.get_role_composites(&spec.realm, owner_id).await?;
        let live_edges: HashMap<EdgeKey, &RoleRepresentation> = live_children
            .iter()
            .map(|child| {
                (
                    EdgeKey {
                        container: if child.client_role.unwrap_or(false) {
                            child.container_id.clone()
                        } else {
                            None
                        },
                        name: child.name.clone(),
                    },
                    child,
                )
            })
            .collect();

        let edge_allowed = |target_key: &EdgeKey, op: Operation| {
            let target_category = if target_key.container.is_some() {
                EntityCategory::ClientRole
            } else {
                EntityCategory::RealmRole
            };
            self.policy.allows(owner_category, Some(&role.name), op)
                || self.policy.allows(target_category, Some(&target_key.name), op)
        };

        let mut to_add: Vec<RoleRepresentation> = Vec::new();
        for key in &desired_edges {
            if live_edges.contains_key(key) || !edge_allowed(key, Operation::Create) {
                continue;
            }
            // Resolve the target to a live role object; a target missing
            // remotely is a fail-fast integrity error.
            self.guard()?;
            let target = match &key.container {
                None => self.api.get_realm_role(&spec.realm, &key.name).await?,
                Some(internal_id) => {
                    self.api.get_client_role(&spec.realm, internal_id, &key.name).await?
                }
            };
            let target = target.ok_or_else(|| EngineError::ConfigIntegrity {
                entity: "role",
                name: key.name.clone(),
                detail: format!(
                    "composite target of role '{}' does not exist remotely",
                    role.name
                ),
            })?;
            to_add.push(target);
        }

        let mut to_remove: Vec<RoleRepresentation> = Vec::new();
        for (key, child) in &live_edges {
            if !desired_edges.contains(key) && edge_allowed(key, Operation::Delete) {
                to_remove.push((*child).clone());
            }
        }

        if !to_remove.is_empty() {
            self.guard()?;
            self.api
                .remove_role_composites(&spec.realm, owner_id, &to_remove)
                .await?;
            for child in &to_remove {
                summary.record_delete(owner_category);
                info!(realm = %spec.realm, role = %role.name, target = %child.name, "removed composite edge");
            }
        }

        if !to_add.is_empty() {
            self.guard()?;
            self.api.add_role_composites(&spec.realm, owner_id, &to_add).await?;
            for child in &to_add {
                summary.record_create(owner_category);
                info!(realm = %spec.realm, role = %role.name, target = %child.name, "added composite edge");
            }
        }

        Ok(())
    }
}
