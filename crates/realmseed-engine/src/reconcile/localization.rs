//! Localization reconciliation: locale → message key/value maps.

use std::collections::BTreeSet;

use realmseed_model::{EntityCategory, Operation, RealmSpec};
use tracing::info;

use crate::error::EngineResult;
use crate::summary::RealmRunSummary;

use super::Reconciler;

impl Reconciler<'_> {
    /// Converge realm localization. Locales are the unit of diffing: a
    /// live locale absent from the spec is deleted wholesale; within a
    /// locale present on both sides the full key/value map is replaced on
    /// any difference.
    pub(crate) async fn localizations(
        &self,
        spec: &RealmSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        self.guard()?;
        let live_locales: BTreeSet<String> =
            self.api.list_locales(&spec.realm).await?.into_iter().collect();

        for locale in &live_locales {
            if spec.localizations.contains_key(locale) {
                continue;
            }
            if self.allowed(EntityCategory::Localization, Some(locale), Operation::Delete) {
                self.guard()?;
                self.api.delete_locale(&spec.realm, locale).await?;
                summary.record_delete(EntityCategory::Localization);
                info!(realm = %spec.realm, locale = %locale, "deleted locale");
            }
        }

        for (locale, texts) in &spec.localizations {
            if live_locales.contains(locale) {
                self.guard()?;
                let live_texts = self.api.get_locale_texts(&spec.realm, locale).await?;
                if &live_texts != texts
                    && self.allowed(EntityCategory::Localization, Some(locale), Operation::Update)
                {
                    self.guard()?;
                    self.api.update_locale_texts(&spec.realm, locale, texts).await?;
                    summary.record_update(EntityCategory::Localization);
                    info!(realm = %spec.realm, locale = %locale, "updated locale texts");
                }
            } else if self.allowed(EntityCategory::Localization, Some(locale), Operation::Create) {
                self.guard()?;
                self.api.update_locale_texts(&spec.realm, locale, texts).await?;
                summary.record_create(EntityCategory::Localization);
                info!(realm = %spec.realm, locale = %locale, "created locale texts");
            }
        }
        Ok(())
    }
}
