//! Client reconciliation.
//!
//! Natural key is `clientId`. Creation goes through the partial-import
//! facility; the response must report exactly one addition — anything else
//! means a name collision or a silent no-op, and the run aborts before any
//! further call for that client. After create-or-update, protocol mappers
//! and the default/optional scope lists are sub-reconciled, and the
//! `clientId` → internal id map is published for every later pass.

use std::collections::{BTreeSet, HashMap};

use realmseed_client::MapperOwner;
use realmseed_model::rep::{ClientRepresentation, PartialImportRequest};
use realmseed_model::{EntityCategory, Operation, RealmSpec};
use tracing::info;

use crate::compare;
use crate::diff::diff_by_key;
use crate::error::{EngineError, EngineResult};
use crate::summary::RealmRunSummary;

use super::{require_id, ClientIdMap, Reconciler};

/// Which of the two scope attachment lists is being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeList {
    Default,
    Optional,
}

impl Reconciler<'_> {
    /// Converge the realm's clients and publish their internal ids.
    pub(crate) async fn clients(
        &self,
        spec: &RealmSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<ClientIdMap> {
        self.guard()?;
        let live = self.api.list_clients(&spec.realm).await?;
        let tuple = diff_by_key(
            "client",
            &spec.clients,
            &live,
            |d| &d.client_id,
            |l| &l.client_id,
            |d, l| !compare::client_changes(d, l).is_empty(),
        )?;

        let mut client_ids = ClientIdMap::new();

        for client in tuple.to_delete {
            if self.allowed(EntityCategory::Client, Some(&client.client_id), Operation::Delete) {
                let id = require_id("client", &client.client_id, &client.id)?;
                self.guard()?;
                self.api.delete_client(&spec.realm, id).await?;
                summary.record_delete(EntityCategory::Client);
                info!(realm = %spec.realm, client = %client.client_id, "deleted client");
            }
        }

        for client in tuple.to_create {
            if !self.allowed(EntityCategory::Client, Some(&client.client_id), Operation::Create) {
                continue;
            }
            let id = self.create_client(spec, client).await?;
            summary.record_create(EntityCategory::Client);
            client_ids.insert(client.client_id.clone(), id);
            info!(realm = %spec.realm, client = %client.client_id, "created client");
        }

        for (desired, live_client) in tuple.to_update {
            let id = require_id("client", &live_client.client_id, &live_client.id)?;
            client_ids.insert(desired.client_id.clone(), id.to_string());
            if self.allowed(EntityCategory::Client, Some(&desired.client_id), Operation::Update) {
                let mut payload = desired.clone();
                payload.id = live_client.id.clone();
                payload.protocol_mappers = Vec::new();
                self.guard()?;
                self.api.update_client(&spec.realm, id, &payload).await?;
                summary.record_update(EntityCategory::Client);
                info!(realm = %spec.realm, client = %desired.client_id, "updated client");
            }
        }

        for (desired, live_client) in tuple.unchanged {
            let id = require_id("client", &live_client.client_id, &live_client.id)?;
            client_ids.insert(desired.client_id.clone(), id.to_string());
        }

        // Scope-name → id translation for the attachment lists. Built-in
        // scopes exist only remotely, so the live scope list is the source.
        let scope_ids: HashMap<String, String> = self
            .api
            .list_client_scopes(&spec.realm)
            .await?
            .into_iter()
            .filter_map(|s| s.id.map(|id| (s.name, id)))
            .collect();

        for client in &spec.clients {
            let Some(internal_id) = client_ids.get(&client.client_id).cloned() else {
                // Creation was denied by policy; no children to reconcile.
                continue;
            };
            self.protocol_mappers(
                &spec.realm,
                EntityCategory::Client,
                &client.client_id,
                MapperOwner::Client(&internal_id),
                &client.protocol_mappers,
                summary,
            )
            .await?;
            self.scope_attachment(spec, client, &internal_id, ScopeList::Default, &scope_ids, summary)
                .await?;
            self.scope_attachment(spec, client, &internal_id, ScopeList::Optional, &scope_ids, summary)
                .await?;
        }

        Ok(client_ids)
    }

    /// Create one client through partial import and capture its internal
    /// id from an immediate re-fetch.
    async fn create_client(
        &self,
        spec: &RealmSpec,
        client: &ClientRepresentation,
    ) -> EngineResult<String> {
        self.guard()?;
        let request = PartialImportRequest::single_client(client.clone());
        let result = self.api.partial_import(&spec.realm, &request).await?;
        if !result.is_single_addition() {
            return Err(EngineError::RemoteShape {
                entity: "client",
                name: client.client_id.clone(),
                detail: format!(
                    "partial import reported added={}, overwritten={}, skipped={} (expected a single addition)",
                    result.added, result.overwritten, result.skipped
                ),
            });
        }

        self.guard()?;
        let created = self
            .api
            .find_client(&spec.realm, &client.client_id)
            .await?
            .ok_or_else(|| EngineError::RemoteShape {
                entity: "client",
                name: client.client_id.clone(),
                detail: "client not found on re-fetch after partial import".to_string(),
            })?;
        Ok(require_id("client", &client.client_id, &created.id)?.to_string())
    }

    /// Converge one of a client's scope attachment lists by set
    /// difference of scope names. An absent desired list is "don't care".
    async fn scope_attachment(
        &self,
        spec: &RealmSpec,
        client: &ClientRepresentation,
        internal_id: &str,
        list: ScopeList,
        scope_ids: &HashMap<String, String>,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        let desired = match list {
            ScopeList::Default => &client.default_client_scopes,
            ScopeList::Optional => &client.optional_client_scopes,
        };
        let Some(desired) = desired else {
            return Ok(());
        };
        let desired: BTreeSet<&str> = desired.iter().map(String::as_str).collect();

        self.guard()?;
        let live = match list {
            ScopeList::Default => {
                self.api.get_default_client_scopes(&spec.realm, internal_id).await?
            }
            ScopeList::Optional => {
                self.api.get_optional_client_scopes(&spec.realm, internal_id).await?
            }
        };

        for scope in &live {
            if desired.contains(scope.name.as_str()) {
                continue;
            }
            if !self.allowed(EntityCategory::Client, Some(&client.client_id), Operation::Update) {
                continue;
            }
            let scope_id = require_id("client scope", &scope.name, &scope.id)?;
            self.guard()?;
            match list {
                ScopeList::Default => {
                    self.api
                        .remove_default_client_scope(&spec.realm, internal_id, scope_id)
                        .await?;
                }
                ScopeList::Optional => {
                    self.api
                        .remove_optional_client_scope(&spec.realm, internal_id, scope_id)
                        .await?;
                }
            }
            summary.record_update(EntityCategory::Client);
            info!(
                realm = %spec.realm,
                client = %client.client_id,
                scope = %scope.name,
                list = ?list,
                "detached client scope"
            );
        }

        let live_names: BTreeSet<&str> = live.iter().map(|s| s.name.as_str()).collect();
        for name in desired {
            if live_names.contains(name) {
                continue;
            }
            if !self.allowed(EntityCategory::Client, Some(&client.client_id), Operation::Update) {
                continue;
            }
            let scope_id = scope_ids.get(name).ok_or_else(|| {
                EngineError::ConfigIntegrity {
                    entity: "client scope",
                    name: name.to_string(),
                    detail: format!(
                        "referenced by client '{}' but not present on the server",
                        client.client_id
                    ),
                }
            })?;
            self.guard()?;
            match list {
                ScopeList::Default => {
                    self.api
                        .add_default_client_scope(&spec.realm, internal_id, scope_id)
                        .await?;
                }
                ScopeList::Optional => {
                    self.api
                        .add_optional_client_scope(&spec.realm, internal_id, scope_id)
                        .await?;
                }
            }
            summary.record_update(EntityCategory::Client);
            info!(
                realm = %spec.realm,
                client = %client.client_id,
                scope = %name,
                list = ?list,
                "attached client scope"
            );
        }
        Ok(())
    }
}
