//! Client scope reconciliation.
//!
//! Scope nodes only: protocol mappers of scopes are reconciled by a
//! separate, later pass ([`Reconciler::client_scope_mappers`]) because
//! mapper configuration may reference clients that do not exist until the
//! clients pass has run.

use realmseed_client::MapperOwner;
use realmseed_model::{EntityCategory, Operation, RealmSpec};
use tracing::info;

use crate::compare;
use crate::diff::diff_by_key;
use crate::error::EngineResult;
use crate::summary::RealmRunSummary;

use super::{require_id, Reconciler};

impl Reconciler<'_> {
    /// Converge the realm's client scopes by name.
    pub(crate) async fn client_scopes(
        &self,
        spec: &RealmSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        self.guard()?;
        let live = self.api.list_client_scopes(&spec.realm).await?;
        let tuple = diff_by_key(
            "client scope",
            &spec.client_scopes,
            &live,
            |d| &d.name,
            |l| &l.name,
            |d, l| !compare::client_scope_changes(d, l).is_empty(),
        )?;

        for scope in tuple.to_delete {
            if self.allowed(EntityCategory::ClientScope, Some(&scope.name), Operation::Delete) {
                let id = require_id("client scope", &scope.name, &scope.id)?;
                self.guard()?;
                self.api.delete_client_scope(&spec.realm, id).await?;
                summary.record_delete(EntityCategory::ClientScope);
                info!(realm = %spec.realm, scope = %scope.name, "deleted client scope");
            }
        }

        for scope in tuple.to_create {
            if self.allowed(EntityCategory::ClientScope, Some(&scope.name), Operation::Create) {
                // Mappers are stripped from the create payload; the late
                // mapper pass owns them.
                let mut payload = scope.clone();
                payload.protocol_mappers = Vec::new();
                self.guard()?;
                self.api.create_client_scope(&spec.realm, &payload).await?;
                summary.record_create(EntityCategory::ClientScope);
                info!(realm = %spec.realm, scope = %scope.name, "created client scope");
            }
        }

        for (desired, live_scope) in tuple.to_update {
            if self.allowed(EntityCategory::ClientScope, Some(&desired.name), Operation::Update) {
                let id = require_id("client scope", &live_scope.name, &live_scope.id)?;
                let mut payload = desired.clone();
                payload.id = live_scope.id.clone();
                payload.protocol_mappers = Vec::new();
                self.guard()?;
                self.api.update_client_scope(&spec.realm, id, &payload).await?;
                summary.record_update(EntityCategory::ClientScope);
                info!(realm = %spec.realm, scope = %desired.name, "updated client scope");
            }
        }
        Ok(())
    }

    /// Late pass converging protocol mappers of every desired scope that
    /// exists remotely. Runs after clients so mapper configuration can
    /// reference live clients.
    pub(crate) async fn client_scope_mappers(
        &self,
        spec: &RealmSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        self.guard()?;
        let live = self.api.list_client_scopes(&spec.realm).await?;
        for scope in &spec.client_scopes {
            let Some(live_scope) = live.iter().find(|l| l.name == scope.name) else {
                // Scope creation was denied by policy; nothing to attach to.
                continue;
            };
            let id = require_id("client scope", &scope.name, &live_scope.id)?;
            self.protocol_mappers(
                &spec.realm,
                EntityCategory::ClientScope,
                &scope.name,
                MapperOwner::ClientScope(id),
                &scope.protocol_mappers,
                summary,
            )
            .await?;
        }
        Ok(())
    }
}
