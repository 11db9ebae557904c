//! User reconciliation: users by username, then per-user realm/client
//! role assignments and federated identities.

use std::collections::BTreeSet;

use realmseed_model::rep::{PartialImportRequest, RoleRepresentation, UserRepresentation};
use realmseed_model::spec::UserSpec;
use realmseed_model::{EntityCategory, Operation, RealmSpec};
use tracing::{info, warn};

use crate::compare;
use crate::diff::diff_by_key;
use crate::error::{EngineError, EngineResult};
use crate::summary::RealmRunSummary;

use super::{require_id, ClientIdMap, Reconciler};

/// Page size for the live user listing.
const USER_PAGE_SIZE: i64 = 100;

/// Safety cap on the number of live users fetched; reconciling against a
/// realm beyond this size needs operator attention, not more memory.
const MAX_LIVE_USERS: usize = 50_000;

impl Reconciler<'_> {
    /// Converge the realm's users and their assignments.
    pub(crate) async fn users(
        &self,
        spec: &RealmSpec,
        client_ids: &ClientIdMap,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        let live = self.fetch_all_users(&spec.realm).await?;
        let tuple = diff_by_key(
            "user",
            &spec.users,
            &live,
            |d| &d.username,
            |l| &l.username,
            |d, l| !compare::user_changes(d, l).is_empty(),
        )?;

        for user in tuple.to_delete {
            if self.allowed(EntityCategory::User, Some(&user.username), Operation::Delete) {
                let id = require_id("user", &user.username, &user.id)?;
                self.guard()?;
                self.api.delete_user(&spec.realm, id).await?;
                summary.record_delete(EntityCategory::User);
                info!(realm = %spec.realm, user = %user.username, "deleted user");
            }
        }

        for user in tuple.to_create {
            if !self.allowed(EntityCategory::User, Some(&user.username), Operation::Create) {
                continue;
            }
            self.create_user(spec, user).await?;
            summary.record_create(EntityCategory::User);
            info!(realm = %spec.realm, user = %user.username, "created user");
        }

        for (desired, live_user) in tuple.to_update {
            if self.allowed(EntityCategory::User, Some(&desired.username), Operation::Update) {
                let id = require_id("user", &live_user.username, &live_user.id)?;
                let mut payload = desired.to_representation();
                payload.id = live_user.id.clone();
                // Credentials are create-only; never part of an update.
                payload.credentials = Vec::new();
                self.guard()?;
                self.api.update_user(&spec.realm, id, &payload).await?;
                summary.record_update(EntityCategory::User);
                info!(realm = %spec.realm, user = %desired.username, "updated user");
            }
        }

        // Assignment sub-reconciliation for every desired user that exists
        // remotely.
        for user in &spec.users {
            self.guard()?;
            let Some(live_user) = self.api.find_user(&spec.realm, &user.username).await? else {
                continue;
            };
            let user_id = require_id("user", &user.username, &live_user.id)?.to_string();
            self.user_realm_roles(spec, user, &user_id, summary).await?;
            self.user_client_roles(spec, user, &user_id, client_ids, summary).await?;
            self.user_federated_identities(spec, user, &user_id, summary).await?;
        }
        Ok(())
    }

    /// Fetch all users page by page, stopping at the safety cap.
    async fn fetch_all_users(&self, realm: &str) -> EngineResult<Vec<UserRepresentation>> {
        let mut all = Vec::new();
        let mut first: i64 = 0;
        loop {
            self.guard()?;
            let page = self.api.list_users(realm, first, USER_PAGE_SIZE).await?;
            let fetched = page.len() as i64;
            all.extend(page);
            if all.len() >= MAX_LIVE_USERS {
                warn!(
                    realm,
                    fetched = all.len(),
                    "reached live-user safety cap, stopping fetch"
                );
                break;
            }
            if fetched < USER_PAGE_SIZE {
                break;
            }
            first += fetched;
        }
        Ok(all)
    }

    /// Create one user through partial import, verifying the single
    /// addition the same way client creation does.
    async fn create_user(&self, spec: &RealmSpec, user: &UserSpec) -> EngineResult<()> {
        self.guard()?;
        let request = PartialImportRequest::single_user(user.to_representation());
        let result = self.api.partial_import(&spec.realm, &request).await?;
        if !result.is_single_addition() {
            return Err(EngineError::RemoteShape {
                entity: "user",
                name: user.username.clone(),
                detail: format!(
                    "partial import reported added={}, overwritten={}, skipped={} (expected a single addition)",
                    result.added, result.overwritten, result.skipped
                ),
            });
        }
        Ok(())
    }

    /// Converge a user's realm-role assignments by set difference.
    async fn user_realm_roles(
        &self,
        spec: &RealmSpec,
        user: &UserSpec,
        user_id: &str,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        let desired: BTreeSet<&str> = user.realm_roles.iter().map(String::as_str).collect();
        self.guard()?;
        let live = self.api.get_user_realm_roles(&spec.realm, user_id).await?;

        let to_remove: Vec<RoleRepresentation> = live
            .iter()
            .filter(|role| !desired.contains(role.name.as_str()))
            .filter(|_| self.allowed(EntityCategory::User, Some(&user.username), Operation::Delete))
            .cloned()
            .collect();
        if !to_remove.is_empty() {
            self.guard()?;
            self.api
                .remove_user_realm_roles(&spec.realm, user_id, &to_remove)
                .await?;
            for role in &to_remove {
                summary.record_delete(EntityCategory::User);
                info!(realm = %spec.realm, user = %user.username, role = %role.name, "removed realm-role assignment");
            }
        }

        let live_names: BTreeSet<&str> = live.iter().map(|r| r.name.as_str()).collect();
        let mut to_add: Vec<RoleRepresentation> = Vec::new();
        for name in desired {
            if live_names.contains(name)
                || !self.allowed(EntityCategory::User, Some(&user.username), Operation::Create)
            {
                continue;
            }
            self.guard()?;
            let role = self.api.get_realm_role(&spec.realm, name).await?.ok_or_else(|| {
                EngineError::ConfigIntegrity {
                    entity: "realm role",
                    name: name.to_string(),
                    detail: format!("assigned to user '{}' but not present remotely", user.username),
                }
            })?;
            to_add.push(role);
        }
        if !to_add.is_empty() {
            self.guard()?;
            self.api.add_user_realm_roles(&spec.realm, user_id, &to_add).await?;
            for role in &to_add {
                summary.record_create(EntityCategory::User);
                info!(realm = %spec.realm, user = %user.username, role = %role.name, "added realm-role assignment");
            }
        }
        Ok(())
    }

    /// Converge a user's client-role assignments, for exactly the clients
    /// the spec mentions (other clients' assignments are "don't care").
    async fn user_client_roles(
        &self,
        spec: &RealmSpec,
        user: &UserSpec,
        user_id: &str,
        client_ids: &ClientIdMap,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        for (client_name, roles) in &user.client_roles {
            let Some(internal_id) = client_ids.get(client_name) else {
                continue;
            };
            let desired: BTreeSet<&str> = roles.iter().map(String::as_str).collect();
            self.guard()?;
            let live = self
                .api
                .get_user_client_roles(&spec.realm, user_id, internal_id)
                .await?;

            let to_remove: Vec<RoleRepresentation> = live
                .iter()
                .filter(|role| !desired.contains(role.name.as_str()))
                .filter(|_| {
                    self.allowed(EntityCategory::User, Some(&user.username), Operation::Delete)
                })
                .cloned()
                .collect();
            if !to_remove.is_empty() {
                self.guard()?;
                self.api
                    .remove_user_client_roles(&spec.realm, user_id, internal_id, &to_remove)
                    .await?;
                for role in &to_remove {
                    summary.record_delete(EntityCategory::User);
                    info!(realm = %spec.realm, user = %user.username, client = %client_name, role = %role.name, "removed client-role assignment");
                }
            }

            let live_names: BTreeSet<&str> = live.iter().map(|r| r.name.as_str()).collect();
            let mut to_add: Vec<RoleRepresentation> = Vec::new();
            for name in &desired {
                if live_names.contains(name)
                    || !self.allowed(EntityCategory::User, Some(&user.username), Operation::Create)
                {
                    continue;
                }
                self.guard()?;
                let role = self
                    .api
                    .get_client_role(&spec.realm, internal_id, name)
                    .await?
                    .ok_or_else(|| EngineError::ConfigIntegrity {
                        entity: "client role",
                        name: format!("{client_name}/{name}"),
                        detail: format!(
                            "assigned to user '{}' but not present remotely",
                            user.username
                        ),
                    })?;
                to_add.push(role);
            }
            if !to_add.is_empty() {
                self.guard()?;
                self.api
                    .add_user_client_roles(&spec.realm, user_id, internal_id, &to_add)
                    .await?;
                for role in &to_add {
                    summary.record_create(EntityCategory::User);
                    info!(realm = %spec.realm, user = %user.username, client = %client_name, role = %role.name, "added client-role assignment");
                }
            }
        }
        Ok(())
    }

    /// Converge a user's federated identity links by provider alias.
    async fn user_federated_identities(
        &self,
        spec: &RealmSpec,
        user: &UserSpec,
        user_id: &str,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        self.guard()?;
        let live = self.api.list_federated_identities(&spec.realm, user_id).await?;

        for identity in &live {
            if user
                .federated_identities
                .iter()
                .any(|d| d.identity_provider == identity.identity_provider)
            {
                continue;
            }
            if self.allowed(EntityCategory::User, Some(&user.username), Operation::Delete) {
                self.guard()?;
                self.api
                    .remove_federated_identity(&spec.realm, user_id, &identity.identity_provider)
                    .await?;
                summary.record_delete(EntityCategory::User);
                info!(realm = %spec.realm, user = %user.username, provider = %identity.identity_provider, "removed federated identity");
            }
        }

        for identity in &user.federated_identities {
            if live
                .iter()
                .any(|l| l.identity_provider == identity.identity_provider)
            {
                continue;
            }
            if self.allowed(EntityCategory::User, Some(&user.username), Operation::Create) {
                self.guard()?;
                self.api
                    .add_federated_identity(
                        &spec.realm,
                        user_id,
                        &identity.identity_provider,
                        identity,
                    )
                    .await?;
                summary.record_create(EntityCategory::User);
                info!(realm = %spec.realm, user = %user.username, provider = %identity.identity_provider, "added federated identity");
            }
        }
        Ok(())
    }
}
