//! Identity provider and identity provider mapper reconciliation.

use realmseed_model::{EntityCategory, Operation, RealmSpec};
use tracing::info;

use crate::compare;
use crate::diff::diff_by_key;
use crate::error::EngineResult;
use crate::summary::RealmRunSummary;

use super::{require_id, Reconciler};

impl Reconciler<'_> {
    /// Converge identity providers by alias, then each desired provider's
    /// mappers by name.
    pub(crate) async fn identity_providers(
        &self,
        spec: &RealmSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        self.guard()?;
        let live = self.api.list_identity_providers(&spec.realm).await?;
        let tuple = diff_by_key(
            "identity provider",
            &spec.identity_providers,
            &live,
            |d| &d.alias,
            |l| &l.alias,
            |d, l| !compare::identity_provider_changes(d, l).is_empty(),
        )?;

        for provider in tuple.to_delete {
            if self.allowed(
                EntityCategory::IdentityProvider,
                Some(&provider.alias),
                Operation::Delete,
            ) {
                self.guard()?;
                self.api.delete_identity_provider(&spec.realm, &provider.alias).await?;
                summary.record_delete(EntityCategory::IdentityProvider);
                info!(realm = %spec.realm, provider = %provider.alias, "deleted identity provider");
            }
        }

        for provider in tuple.to_create {
            if self.allowed(
                EntityCategory::IdentityProvider,
                Some(&provider.alias),
                Operation::Create,
            ) {
                self.guard()?;
                self.api.create_identity_provider(&spec.realm, provider).await?;
                summary.record_create(EntityCategory::IdentityProvider);
                info!(realm = %spec.realm, provider = %provider.alias, "created identity provider");
            }
        }

        for (desired, live_provider) in tuple.to_update {
            if self.allowed(
                EntityCategory::IdentityProvider,
                Some(&desired.alias),
                Operation::Update,
            ) {
                let mut payload = desired.clone();
                payload.internal_id = live_provider.internal_id.clone();
                self.guard()?;
                self.api
                    .update_identity_provider(&spec.realm, &desired.alias, &payload)
                    .await?;
                summary.record_update(EntityCategory::IdentityProvider);
                info!(realm = %spec.realm, provider = %desired.alias, "updated identity provider");
            }
        }

        // Mapper sub-reconciliation for every desired provider that exists
        // remotely (creation may have been denied).
        self.guard()?;
        let live_now = self.api.list_identity_providers(&spec.realm).await?;
        for provider in &spec.identity_providers {
            if !live_now.iter().any(|l| l.alias == provider.alias) {
                continue;
            }
            self.identity_provider_mappers(spec, &provider.alias, summary).await?;
        }
        Ok(())
    }

    async fn identity_provider_mappers(
        &self,
        spec: &RealmSpec,
        alias: &str,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        let desired: Vec<_> = spec.mappers_for_provider(alias).cloned().collect();
        self.guard()?;
        let live = self.api.list_identity_provider_mappers(&spec.realm, alias).await?;
        let tuple = diff_by_key(
            "identity provider mapper",
            &desired,
            &live,
            |d| &d.name,
            |l| &l.name,
            |d, l| !compare::idp_mapper_changes(d, l).is_empty(),
        )?;

        for mapper in tuple.to_delete {
            if self.allowed(EntityCategory::IdentityProvider, Some(alias), Operation::Delete) {
                let id = require_id("identity provider mapper", &mapper.name, &mapper.id)?;
                self.guard()?;
                self.api
                    .delete_identity_provider_mapper(&spec.realm, alias, id)
                    .await?;
                summary.record_delete(EntityCategory::IdentityProvider);
                info!(realm = %spec.realm, provider = %alias, mapper = %mapper.name, "deleted identity provider mapper");
            }
        }

        for mapper in tuple.to_create {
            if self.allowed(EntityCategory::IdentityProvider, Some(alias), Operation::Create) {
                self.guard()?;
                self.api
                    .create_identity_provider_mapper(&spec.realm, alias, mapper)
                    .await?;
                summary.record_create(EntityCategory::IdentityProvider);
                info!(realm = %spec.realm, provider = %alias, mapper = %mapper.name, "created identity provider mapper");
            }
        }

        for (desired_mapper, live_mapper) in tuple.to_update {
            if self.allowed(EntityCategory::IdentityProvider, Some(alias), Operation::Update) {
                let id = require_id("identity provider mapper", &live_mapper.name, &live_mapper.id)?;
                let mut payload = desired_mapper.clone();
                payload.id = live_mapper.id.clone();
                self.guard()?;
                self.api
                    .update_identity_provider_mapper(&spec.realm, alias, id, &payload)
                    .await?;
                summary.record_update(EntityCategory::IdentityProvider);
                info!(realm = %spec.realm, provider = %alias, mapper = %desired_mapper.name, "updated identity provider mapper");
            }
        }
        Ok(())
    }
}
