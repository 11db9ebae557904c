//! Entity reconcilers, one module per configuration domain.
//!
//! Every reconciler follows the same three-phase algorithm: fetch the live
//! collection for the realm, compute the reconciliation tuple against the
//! desired state by natural key, then apply the permitted operations —
//! deletes first, then creates (capturing server-assigned ids where
//! children depend on them), then full-replacement updates.
//!
//! Dependencies are injected at the call site: every pass works off the
//! same borrowed [`AdminApi`], [`ModificationPolicy`], and cancellation
//! token, so each reconciler is testable with an arbitrary policy fixture.

use std::collections::HashMap;

use realmseed_client::AdminApi;
use realmseed_model::{EntityCategory, ModificationPolicy, Operation};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

mod auth_flows;
mod client_scopes;
mod clients;
mod identity_providers;
mod localization;
mod protocol_mappers;
mod realm;
mod roles;
mod user_profile;
mod users;

/// Map from a client's `clientId` to its server-assigned internal id,
/// published by the clients pass for every reconciler that runs after it.
pub type ClientIdMap = HashMap<String, String>;

/// Shared state for the reconciliation passes of one realm run.
///
/// Holds only borrows; the orchestrator constructs one per realm and
/// drives the passes strictly sequentially.
pub struct Reconciler<'a> {
    pub(crate) api: &'a dyn AdminApi,
    pub(crate) policy: &'a ModificationPolicy,
    pub(crate) cancel: &'a CancellationToken,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        api: &'a dyn AdminApi,
        policy: &'a ModificationPolicy,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            api,
            policy,
            cancel,
        }
    }

    /// Cooperative cancellation check, called before every remote call.
    pub(crate) fn guard(&self) -> EngineResult<()> {
        if self.cancel.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Policy check with a debug trace for denied operations. A denial is
    /// a silent skip, never an error.
    pub(crate) fn allowed(
        &self,
        category: EntityCategory,
        instance: Option<&str>,
        op: Operation,
    ) -> bool {
        let allowed = self.policy.allows(category, instance, op);
        if !allowed {
            debug!(
                category = %category,
                instance = instance.unwrap_or("<category>"),
                operation = %op,
                "operation denied by modification policy, skipping"
            );
        }
        allowed
    }
}

/// Extract the server-assigned id a subsequent call needs as a key.
///
/// A live entity without one indicates remote state the engine cannot
/// safely act on.
pub(crate) fn require_id<'x>(
    entity: &'static str,
    name: &str,
    id: &'x Option<String>,
) -> EngineResult<&'x str> {
    id.as_deref()
        .ok_or_else(|| EngineError::missing_id(entity, name))
}
