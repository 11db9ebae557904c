//! Protocol mapper sub-reconciliation, shared by client scopes and
//! clients.
//!
//! A mapper is identified by name within its owning scope or client. The
//! comparator works over the desired configuration keys only, so config
//! keys the model does not mention are "don't care" rather than drift.

use realmseed_client::MapperOwner;
use realmseed_model::rep::ProtocolMapperRepresentation;
use realmseed_model::{EntityCategory, Operation};
use tracing::info;

use crate::compare;
use crate::diff::diff_by_key;
use crate::error::EngineResult;
use crate::summary::RealmRunSummary;

use super::{require_id, Reconciler};

impl Reconciler<'_> {
    /// Converge the protocol mappers of one scope or client. Policy is
    /// consulted under the owner's category and instance name.
    pub(crate) async fn protocol_mappers(
        &self,
        realm: &str,
        category: EntityCategory,
        owner_name: &str,
        owner: MapperOwner<'_>,
        desired: &[ProtocolMapperRepresentation],
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        self.guard()?;
        let live = self.api.list_protocol_mappers(realm, owner).await?;
        let tuple = diff_by_key(
            "protocol mapper",
            desired,
            &live,
            |d| &d.name,
            |l| &l.name,
            |d, l| !compare::protocol_mapper_changes(d, l).is_empty(),
        )?;

        for mapper in tuple.to_delete {
            if self.allowed(category, Some(owner_name), Operation::Delete) {
                let id = require_id("protocol mapper", &mapper.name, &mapper.id)?;
                self.guard()?;
                self.api.delete_protocol_mapper(realm, owner, id).await?;
                summary.record_delete(category);
                info!(realm, owner = %owner_name, mapper = %mapper.name, "deleted protocol mapper");
            }
        }

        for mapper in tuple.to_create {
            if self.allowed(category, Some(owner_name), Operation::Create) {
                self.guard()?;
                self.api.create_protocol_mapper(realm, owner, mapper).await?;
                summary.record_create(category);
                info!(realm, owner = %owner_name, mapper = %mapper.name, "created protocol mapper");
            }
        }

        for (desired_mapper, live_mapper) in tuple.to_update {
            if self.allowed(category, Some(owner_name), Operation::Update) {
                let id = require_id("protocol mapper", &live_mapper.name, &live_mapper.id)?;
                let mut payload = desired_mapper.clone();
                payload.id = live_mapper.id.clone();
                self.guard()?;
                self.api.update_protocol_mapper(realm, owner, id, &payload).await?;
                summary.record_update(category);
                info!(realm, owner = %owner_name, mapper = %desired_mapper.name, "updated protocol mapper");
            }
        }
        Ok(())
    }
}
