//! Authentication flow and execution-tree reconciliation.
//!
//! Top-level, non-built-in flows only: built-ins are immutable on the
//! server and filtered from both sides before diffing. For every desired
//! flow present remotely, the execution tree is compared *structurally*
//! (child count and is-subflow flag per position). Structural mismatches
//! cannot be expressed as field updates — the server orders executions by
//! creation sequence — so the whole live tree is deleted bottom-up and the
//! desired tree recreated top-down. Field-only differences (requirement,
//! description, authenticator config) are applied by a top-down update
//! pass that mirrors the tree and never pays the rebuild cost.

use std::collections::HashMap;

use realmseed_model::rep::{
    AuthenticationExecutionInfoRepresentation, AuthenticationFlowRepresentation,
    CreateSubflowRequest,
};
use realmseed_model::spec::FlowSpec;
use realmseed_model::{EntityCategory, Operation, RealmSpec};
use tracing::info;

use crate::compare;
use crate::diff::diff_by_key;
use crate::error::{EngineError, EngineResult};
use crate::flow_tree::{
    build_desired_tree, deletion_order, parse_execution_tree, same_structure, DesiredNode,
    ExecutionNode,
};
use crate::summary::RealmRunSummary;

use super::{require_id, Reconciler};

impl Reconciler<'_> {
    /// Converge the realm's top-level authentication flows and their
    /// execution trees.
    pub(crate) async fn authentication_flows(
        &self,
        spec: &RealmSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        self.guard()?;
        let live: Vec<AuthenticationFlowRepresentation> = self
            .api
            .list_flows(&spec.realm)
            .await?
            .into_iter()
            .filter(|f| f.top_level && !f.built_in)
            .collect();
        let desired: Vec<FlowSpec> = spec.top_level_flows().cloned().collect();

        let tuple = diff_by_key(
            "authentication flow",
            &desired,
            &live,
            |d| &d.alias,
            |l| &l.alias,
            |d, l| d.description.is_some() && d.description != l.description,
        )?;

        for flow in tuple.to_delete {
            if self.allowed(
                EntityCategory::AuthenticationFlow,
                Some(&flow.alias),
                Operation::Delete,
            ) {
                let id = require_id("authentication flow", &flow.alias, &flow.id)?;
                self.guard()?;
                self.api.delete_flow(&spec.realm, id).await?;
                summary.record_delete(EntityCategory::AuthenticationFlow);
                info!(realm = %spec.realm, flow = %flow.alias, "deleted authentication flow");
            }
        }

        for flow in tuple.to_create {
            if self.allowed(
                EntityCategory::AuthenticationFlow,
                Some(&flow.alias),
                Operation::Create,
            ) {
                let rep = AuthenticationFlowRepresentation {
                    id: None,
                    alias: flow.alias.clone(),
                    description: flow.description.clone(),
                    provider_id: Some(flow.provider_id.clone()),
                    top_level: true,
                    built_in: false,
                };
                self.guard()?;
                self.api.create_flow(&spec.realm, &rep).await?;
                summary.record_create(EntityCategory::AuthenticationFlow);
                info!(realm = %spec.realm, flow = %flow.alias, "created authentication flow");
            }
        }

        for (flow, live_flow) in tuple.to_update {
            if self.allowed(
                EntityCategory::AuthenticationFlow,
                Some(&flow.alias),
                Operation::Update,
            ) {
                let id = require_id("authentication flow", &live_flow.alias, &live_flow.id)?;
                let mut payload = live_flow.clone();
                payload.description = flow.description.clone();
                self.guard()?;
                self.api.update_flow(&spec.realm, id, &payload).await?;
                summary.record_update(EntityCategory::AuthenticationFlow);
                info!(realm = %spec.realm, flow = %flow.alias, "updated authentication flow");
            }
        }

        // Execution trees for every desired flow present remotely,
        // whether pre-existing or just created.
        self.guard()?;
        let live_now: HashMap<String, AuthenticationFlowRepresentation> = self
            .api
            .list_flows(&spec.realm)
            .await?
            .into_iter()
            .filter(|f| f.top_level && !f.built_in)
            .map(|f| (f.alias.clone(), f))
            .collect();
        for flow in &desired {
            if !live_now.contains_key(&flow.alias) {
                continue;
            }
            self.flow_executions(spec, flow, summary).await?;
        }
        Ok(())
    }

    /// Converge one flow's execution tree.
    async fn flow_executions(
        &self,
        spec: &RealmSpec,
        flow: &FlowSpec,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        let desired_tree = build_desired_tree(spec, flow)?;

        self.guard()?;
        let flat = self.api.list_flow_executions(&spec.realm, &flow.alias).await?;
        let live_tree = parse_execution_tree(&flow.alias, &flat)?;

        if !same_structure(&desired_tree, &live_tree) {
            if !self.allowed(
                EntityCategory::AuthenticationFlow,
                Some(&flow.alias),
                Operation::Update,
            ) {
                return Ok(());
            }
            self.rebuild_tree(spec, flow, &desired_tree, &live_tree).await?;
            summary.record_update(EntityCategory::AuthenticationFlow);
            info!(realm = %spec.realm, flow = %flow.alias, "rebuilt execution tree");
        }

        // Field-level update pass, top-down over the (now matching) tree.
        self.guard()?;
        let flat = self.api.list_flow_executions(&spec.realm, &flow.alias).await?;
        let live_tree = parse_execution_tree(&flow.alias, &flat)?;
        if !same_structure(&desired_tree, &live_tree) {
            return Err(EngineError::RemoteShape {
                entity: "authentication flow",
                name: flow.alias.clone(),
                detail: "execution tree differs structurally after rebuild".to_string(),
            });
        }
        self.update_tree(spec, flow, &desired_tree, &live_tree, summary).await
    }

    /// Delete the whole live tree children-before-parents, then recreate
    /// the desired tree parents-before-children.
    async fn rebuild_tree(
        &self,
        spec: &RealmSpec,
        flow: &FlowSpec,
        desired_tree: &[DesiredNode],
        live_tree: &[ExecutionNode],
    ) -> EngineResult<()> {
        for node in deletion_order(live_tree) {
            let id = require_id("authentication execution", &flow.alias, &node.info.id)?;
            self.guard()?;
            self.api.delete_execution(&spec.realm, id).await?;
        }

        // Iterative pre-order walk: each subflow is created under its
        // parent's alias before its own children are pushed.
        let mut stack: Vec<(String, &DesiredNode)> = desired_tree
            .iter()
            .rev()
            .map(|node| (flow.alias.clone(), node))
            .collect();
        while let Some((parent_alias, node)) = stack.pop() {
            match &node.subflow {
                Some(subflow) => {
                    let request = CreateSubflowRequest {
                        alias: subflow.alias.clone(),
                        description: subflow.description.clone(),
                        flow_type: subflow.provider_id.clone(),
                        provider: None,
                    };
                    self.guard()?;
                    self.api.add_subflow(&spec.realm, &parent_alias, &request).await?;
                    for child in node.children.iter().rev() {
                        stack.push((subflow.alias.clone(), child));
                    }
                }
                None => {
                    let provider = node.spec.authenticator.as_deref().ok_or_else(|| {
                        EngineError::ConfigIntegrity {
                            entity: "authentication execution",
                            name: flow.alias.clone(),
                            detail: "leaf execution without an authenticator".to_string(),
                        }
                    })?;
                    self.guard()?;
                    self.api.add_execution(&spec.realm, &parent_alias, provider).await?;
                }
            }
        }
        Ok(())
    }

    /// Top-down update pass mirroring the tree: requirement/description
    /// per execution, plus the authenticator-config lifecycle for leaves.
    async fn update_tree(
        &self,
        spec: &RealmSpec,
        flow: &FlowSpec,
        desired_tree: &[DesiredNode],
        live_tree: &[ExecutionNode],
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        let mut stack: Vec<(&DesiredNode, &ExecutionNode)> =
            desired_tree.iter().zip(live_tree).rev().collect();
        while let Some((desired, live)) = stack.pop() {
            let changes = compare::execution_changes(&desired.spec, &live.info);
            if !changes.is_empty()
                && self.allowed(
                    EntityCategory::AuthenticationFlow,
                    Some(&flow.alias),
                    Operation::Update,
                )
            {
                let mut payload = live.info.clone();
                payload.requirement = Some(desired.spec.requirement.clone());
                if desired.spec.description.is_some() {
                    payload.description = desired.spec.description.clone();
                }
                self.guard()?;
                self.api.update_execution(&spec.realm, &flow.alias, &payload).await?;
                summary.record_update(EntityCategory::AuthenticationFlow);
                info!(
                    realm = %spec.realm,
                    flow = %flow.alias,
                    changed = ?changes,
                    "updated execution"
                );
            }

            if !live.is_subflow() {
                self.execution_config(spec, flow, desired, &live.info, summary).await?;
            }

            for pair in desired.children.iter().zip(&live.children).rev() {
                stack.push(pair);
            }
        }
        Ok(())
    }

    /// Create/update/delete the authenticator config of one leaf
    /// execution, the same three-way decision as any other entity but
    /// scoped to the (execution, config) pair.
    async fn execution_config(
        &self,
        spec: &RealmSpec,
        flow: &FlowSpec,
        desired: &DesiredNode,
        live: &AuthenticationExecutionInfoRepresentation,
        summary: &mut RealmRunSummary,
    ) -> EngineResult<()> {
        match (&desired.spec.config, &live.authentication_config) {
            (None, None) => Ok(()),
            (Some(config), None) => {
                if self.allowed(
                    EntityCategory::AuthenticationFlow,
                    Some(&flow.alias),
                    Operation::Create,
                ) {
                    let execution_id =
                        require_id("authentication execution", &flow.alias, &live.id)?;
                    self.guard()?;
                    self.api
                        .create_execution_config(&spec.realm, execution_id, config)
                        .await?;
                    summary.record_create(EntityCategory::AuthenticationFlow);
                    info!(realm = %spec.realm, flow = %flow.alias, config = %config.alias, "created authenticator config");
                }
                Ok(())
            }
            (Some(config), Some(config_id)) => {
                self.guard()?;
                let live_config = self.api.get_authenticator_config(&spec.realm, config_id).await?;
                let changes = compare::authenticator_config_changes(config, &live_config);
                if !changes.is_empty()
                    && self.allowed(
                        EntityCategory::AuthenticationFlow,
                        Some(&flow.alias),
                        Operation::Update,
                    )
                {
                    let mut payload = config.clone();
                    payload.id = live_config.id.clone();
                    self.guard()?;
                    self.api
                        .update_authenticator_config(&spec.realm, config_id, &payload)
                        .await?;
                    summary.record_update(EntityCategory::AuthenticationFlow);
                    info!(realm = %spec.realm, flow = %flow.alias, config = %config.alias, "updated authenticator config");
                }
                Ok(())
            }
            (None, Some(config_id)) => {
                if self.allowed(
                    EntityCategory::AuthenticationFlow,
                    Some(&flow.alias),
                    Operation::Delete,
                ) {
                    self.guard()?;
                    self.api.delete_authenticator_config(&spec.realm, config_id).await?;
                    summary.record_delete(EntityCategory::AuthenticationFlow);
                    info!(realm = %spec.realm, flow = %flow.alias, "deleted authenticator config");
                }
                Ok(())
            }
        }
    }
}
