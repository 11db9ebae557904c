//! The reconciliation tuple.
//!
//! Every reconciler reduces to the same three-way comparison: desired
//! entities against live entities, matched by natural key. The result
//! partitions both sides into disjoint sets; which operations are then
//! applied is the caller's (policy-gated) business.

use std::collections::{HashMap, HashSet};

use crate::error::{EngineError, EngineResult};

/// The (ToCreate, ToUpdate, ToDelete) triple for one entity category.
///
/// `to_update` holds matched pairs whose field comparator reported
/// inequality; `unchanged` holds the matched pairs that need no write.
/// Order follows the desired collection for creates/updates and the live
/// collection for deletes.
#[derive(Debug)]
pub struct ReconcileTuple<'d, 'l, D, L> {
    pub to_create: Vec<&'d D>,
    pub to_update: Vec<(&'d D, &'l L)>,
    pub unchanged: Vec<(&'d D, &'l L)>,
    pub to_delete: Vec<&'l L>,
}

impl<D, L> ReconcileTuple<'_, '_, D, L> {
    /// Whether the tuple implies no writes at all.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Compute the reconciliation tuple by natural key.
///
/// A duplicated natural key on either side is a configuration-integrity
/// error: the engine cannot tell which of the duplicates a match refers
/// to, so it refuses to act.
pub fn diff_by_key<'d, 'l, D, L>(
    entity: &'static str,
    desired: &'d [D],
    live: &'l [L],
    desired_key: impl Fn(&D) -> &str,
    live_key: impl Fn(&L) -> &str,
    changed: impl Fn(&D, &L) -> bool,
) -> EngineResult<ReconcileTuple<'d, 'l, D, L>> {
    let mut live_by_key: HashMap<&str, &'l L> = HashMap::with_capacity(live.len());
    for item in live {
        let key = live_key(item);
        if live_by_key.insert(key, item).is_some() {
            return Err(EngineError::ConfigIntegrity {
                entity,
                name: key.to_string(),
                detail: "duplicate natural key in live state".to_string(),
            });
        }
    }

    let mut seen_desired: HashSet<&str> = HashSet::with_capacity(desired.len());
    let mut matched: HashSet<&str> = HashSet::new();
    let mut to_create = Vec::new();
    let mut to_update = Vec::new();
    let mut unchanged = Vec::new();

    for item in desired {
        let key = desired_key(item);
        if !seen_desired.insert(key) {
            return Err(EngineError::ConfigIntegrity {
                entity,
                name: key.to_string(),
                detail: "duplicate natural key in desired state".to_string(),
            });
        }
        match live_by_key.get(key) {
            Some(live_item) => {
                matched.insert(key);
                if changed(item, live_item) {
                    to_update.push((item, *live_item));
                } else {
                    unchanged.push((item, *live_item));
                }
            }
            None => to_create.push(item),
        }
    }

    let to_delete = live
        .iter()
        .filter(|item| !matched.contains(live_key(item)))
        .collect();

    Ok(ReconcileTuple {
        to_create,
        to_update,
        unchanged,
        to_delete,
    })
}
