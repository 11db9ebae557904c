//! Write counters for one realm run.

use std::collections::BTreeMap;

use realmseed_model::EntityCategory;

/// Writes applied for one entity category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl WriteCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

/// Summary statistics from one realm run.
///
/// A converged realm yields an all-zero summary on the next run; the
/// idempotence tests assert exactly that.
#[derive(Debug, Clone, Default)]
pub struct RealmRunSummary {
    /// Realm the run targeted.
    pub realm: String,
    counts: BTreeMap<EntityCategory, WriteCounts>,
}

impl RealmRunSummary {
    #[must_use]
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            counts: BTreeMap::new(),
        }
    }

    pub fn record_create(&mut self, category: EntityCategory) {
        self.counts.entry(category).or_default().created += 1;
    }

    pub fn record_update(&mut self, category: EntityCategory) {
        self.counts.entry(category).or_default().updated += 1;
    }

    pub fn record_delete(&mut self, category: EntityCategory) {
        self.counts.entry(category).or_default().deleted += 1;
    }

    /// Counters for one category.
    #[must_use]
    pub fn counts(&self, category: EntityCategory) -> WriteCounts {
        self.counts.get(&category).copied().unwrap_or_default()
    }

    /// Total writes across all categories.
    #[must_use]
    pub fn total_writes(&self) -> usize {
        self.counts.values().map(WriteCounts::total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_per_category() {
        let mut summary = RealmRunSummary::new("portal");
        summary.record_create(EntityCategory::RealmRole);
        summary.record_create(EntityCategory::RealmRole);
        summary.record_delete(EntityCategory::Client);

        assert_eq!(summary.counts(EntityCategory::RealmRole).created, 2);
        assert_eq!(summary.counts(EntityCategory::Client).deleted, 1);
        assert_eq!(summary.counts(EntityCategory::User), WriteCounts::default());
        assert_eq!(summary.total_writes(), 3);
    }
}
