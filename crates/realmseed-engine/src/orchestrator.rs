//! Per-realm orchestration.
//!
//! Runs the reconcilers in a fixed dependency order. The order is
//! load-bearing: clients must precede anything that needs internal client
//! ids (client roles, composite edges, users' client-role assignments);
//! client scopes must precede clients because client creation references
//! scope names; simple role passes must precede the composite-edge pass;
//! scope protocol mappers run after clients so mapper configuration can
//! reference live clients.

use realmseed_client::AdminApi;
use realmseed_model::{EntityCategory, ModificationPolicy, RealmSpec};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::EngineResult;
use crate::reconcile::{ClientIdMap, Reconciler};
use crate::summary::RealmRunSummary;

/// The result of seeding one realm in a multi-realm invocation.
#[derive(Debug)]
pub struct RealmOutcome {
    pub realm: String,
    pub result: EngineResult<RealmRunSummary>,
}

/// Drives the reconciliation of realms, one at a time.
pub struct RealmSeeder<'a> {
    api: &'a dyn AdminApi,
    cancel: CancellationToken,
}

impl<'a> RealmSeeder<'a> {
    #[must_use]
    pub fn new(api: &'a dyn AdminApi) -> Self {
        Self {
            api,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token; cancelling it aborts
    /// the run at the next remote-call boundary.
    #[must_use]
    pub fn with_cancellation(api: &'a dyn AdminApi, cancel: CancellationToken) -> Self {
        Self { api, cancel }
    }

    /// Converge one realm to its spec under the given policy.
    ///
    /// Fails fast on spec defects before the first remote call; any fatal
    /// error aborts this realm only, leaving previously converged entities
    /// in place (re-running converges the remainder).
    pub async fn seed_realm(
        &self,
        spec: &RealmSpec,
        policy: &ModificationPolicy,
    ) -> EngineResult<RealmRunSummary> {
        spec.validate_references()?;

        info!(realm = %spec.realm, "starting realm reconciliation");
        let mut summary = RealmRunSummary::new(&spec.realm);
        let reconciler = Reconciler::new(self.api, policy, &self.cancel);

        if self.enabled(policy, EntityCategory::Realm) {
            reconciler.realm_settings(spec, &mut summary).await?;
        }
        if self.enabled(policy, EntityCategory::Localization) {
            reconciler.localizations(spec, &mut summary).await?;
        }
        if self.enabled(policy, EntityCategory::UserProfile) {
            reconciler.user_profile(spec, &mut summary).await?;
        }
        if self.enabled(policy, EntityCategory::RealmRole) {
            reconciler.realm_roles(spec, &mut summary).await?;
        }
        if self.enabled(policy, EntityCategory::ClientScope) {
            reconciler.client_scopes(spec, &mut summary).await?;
        }

        let client_ids = if self.enabled(policy, EntityCategory::Client) {
            reconciler.clients(spec, &mut summary).await?
        } else {
            // The id map is read-only state; later passes still need it
            // even when the clients category itself is frozen.
            self.lookup_client_ids(spec).await?
        };

        if self.enabled(policy, EntityCategory::ClientRole) {
            reconciler.client_roles(spec, &client_ids, &mut summary).await?;
        }
        if self.enabled(policy, EntityCategory::RealmRole)
            || self.enabled(policy, EntityCategory::ClientRole)
        {
            reconciler.composite_roles(spec, &client_ids, &mut summary).await?;
        }
        if self.enabled(policy, EntityCategory::IdentityProvider) {
            reconciler.identity_providers(spec, &mut summary).await?;
        }
        if self.enabled(policy, EntityCategory::User) {
            reconciler.users(spec, &client_ids, &mut summary).await?;
        }
        if self.enabled(policy, EntityCategory::ClientScope) {
            reconciler.client_scope_mappers(spec, &mut summary).await?;
        }
        if self.enabled(policy, EntityCategory::AuthenticationFlow) {
            reconciler.authentication_flows(spec, &mut summary).await?;
        }

        info!(
            realm = %spec.realm,
            writes = summary.total_writes(),
            "realm reconciliation completed"
        );
        Ok(summary)
    }

    /// Converge a sequence of realms strictly sequentially.
    ///
    /// The realm loop is the unit of failure isolation: one realm's fatal
    /// error is reported in its outcome and does not suppress subsequent,
    /// independently configured realms.
    pub async fn seed_all<'s>(
        &self,
        realms: impl IntoIterator<Item = (&'s RealmSpec, &'s ModificationPolicy)>,
    ) -> Vec<RealmOutcome> {
        let mut outcomes = Vec::new();
        for (spec, policy) in realms {
            let result = self.seed_realm(spec, policy).await;
            if let Err(e) = &result {
                error!(realm = %spec.realm, error = %e, "realm reconciliation failed");
            }
            outcomes.push(RealmOutcome {
                realm: spec.realm.clone(),
                result,
            });
        }
        outcomes
    }

    fn enabled(&self, policy: &ModificationPolicy, category: EntityCategory) -> bool {
        let enabled = policy.category_enabled(category);
        if !enabled {
            info!(category = %category, "category disabled by policy, skipping step");
        }
        enabled
    }

    async fn lookup_client_ids(&self, spec: &RealmSpec) -> EngineResult<ClientIdMap> {
        let mut ids = ClientIdMap::new();
        let live = self.api.list_clients(&spec.realm).await?;
        for client in live {
            if spec.client_by_client_id(&client.client_id).is_some() {
                if let Some(id) = client.id {
                    ids.insert(client.client_id, id);
                }
            }
        }
        Ok(ids)
    }
}
