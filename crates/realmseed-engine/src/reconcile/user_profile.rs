//! User-profile schema reconciliation.

use realmseed_model::{EntityCategory, Operation, RealmSpec};
use tracing::info;

use crate::compare;
use crate::error::EngineResult;
use crate::summary::RealmRunSummary;

use super::Reconciler;

impl Reconciler<'_> {
    /// Converge the user-profile schema document. The document is a
    /// singleton compared at the JSON level and replaced wholesale on
    /// drift; a spec without one leaves the remote schema untouched.
    pub(crate) async fn user_profile(
        &self,
        spec: &RealmSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        let Some(desired) = &spec.user_profile else {
            return Ok(());
        };
        self.guard()?;
        let live = self.api.get_user_profile(&spec.realm).await?;
        if compare::user_profile_changed(desired, &live)
            && self.allowed(EntityCategory::UserProfile, None, Operation::Update)
        {
            self.guard()?;
            self.api.update_user_profile(&spec.realm, desired).await?;
            summary.record_update(EntityCategory::UserProfile);
            info!(realm = %spec.realm, "updated user-profile schema");
        }
        Ok(())
    }
}
