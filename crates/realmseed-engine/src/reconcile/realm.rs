//! Realm settings reconciliation.

use realmseed_model::{EntityCategory, Operation, RealmSpec};
use tracing::info;

use crate::compare;
use crate::error::EngineResult;
use crate::summary::RealmRunSummary;

use super::Reconciler;

impl Reconciler<'_> {
    /// Converge the realm settings singleton. A realm absent remotely is
    /// imported; a present one gets a field-level comparison and, on
    /// drift, a full replacement update.
    pub(crate) async fn realm_settings(
        &self,
        spec: &RealmSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        self.guard()?;
        match self.api.get_realm(&spec.realm).await? {
            None => {
                if self.allowed(EntityCategory::Realm, Some(&spec.realm), Operation::Create) {
                    let mut rep = spec.settings.clone();
                    rep.realm = spec.realm.clone();
                    self.guard()?;
                    self.api.import_realm(&rep).await?;
                    summary.record_create(EntityCategory::Realm);
                    info!(realm = %spec.realm, "imported realm");
                }
            }
            Some(live) => {
                let changes = compare::realm_changes(&spec.settings, &live);
                if !changes.is_empty()
                    && self.allowed(EntityCategory::Realm, Some(&spec.realm), Operation::Update)
                {
                    let mut payload = spec.settings.clone();
                    payload.id = live.id.clone();
                    payload.realm = spec.realm.clone();
                    self.guard()?;
                    self.api.update_realm(&spec.realm, &payload).await?;
                    summary.record_update(EntityCategory::Realm);
                    info!(realm = %spec.realm, changed = ?changes, "updated realm settings");
                }
            }
        }
        Ok(())
    }
}
