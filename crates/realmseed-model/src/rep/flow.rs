//! Authentication flow, execution, and authenticator config representations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An authentication flow; natural key is `alias`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationFlowRepresentation {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub alias: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Flow implementation (e.g. `basic-flow`, `client-flow`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    #[serde(default)]
    pub top_level: bool,

    /// Built-in flows are immutable on the server and excluded from
    /// reconciliation on both sides.
    #[serde(default)]
    pub built_in: bool,
}

/// One entry of the flat, leveled execution list the server returns for a
/// top-level flow.
///
/// `level` is the nesting depth and `authentication_flow` marks subflow
/// entries; the engine reconstructs the tree from these two fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationExecutionInfoRepresentation {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Requirement (`REQUIRED`, `ALTERNATIVE`, `CONDITIONAL`, `DISABLED`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Subflow alias, present for subflow entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Authenticator provider id, present for leaf executions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    /// True when this entry is a nested subflow rather than a leaf
    /// execution.
    #[serde(default)]
    pub authentication_flow: bool,

    /// Nesting depth, starting at 0.
    #[serde(default)]
    pub level: i32,

    /// Position among siblings.
    #[serde(default)]
    pub index: i32,

    /// Id of the subflow, present for subflow entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,

    /// Id of the attached authenticator config, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_config: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
}

/// Configuration attached to a leaf execution; natural key is `alias`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorConfigRepresentation {
    /// Server-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub alias: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

/// Payload for adding a nested subflow to an existing flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubflowRequest {
    pub alias: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Flow implementation of the subflow (e.g. `basic-flow`).
    #[serde(rename = "type")]
    pub flow_type: String,

    /// Optional execution provider wrapping the subflow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}
