//! Partial import request/result.

use serde::{Deserialize, Serialize};

use super::client::ClientRepresentation;
use super::user::UserRepresentation;

/// A partial-import request scoped to the resources the engine creates
/// through it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialImportRequest {
    /// Server behavior on collision (`FAIL`, `SKIP`, `OVERWRITE`). The
    /// engine always sends `FAIL`: collisions indicate a diff computed
    /// against stale state.
    pub if_resource_exists: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<ClientRepresentation>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserRepresentation>>,
}

impl PartialImportRequest {
    /// A request creating a single client.
    #[must_use]
    pub fn single_client(client: ClientRepresentation) -> Self {
        Self {
            if_resource_exists: "FAIL".to_string(),
            clients: Some(vec![client]),
            users: None,
        }
    }

    /// A request creating a single user.
    #[must_use]
    pub fn single_user(user: UserRepresentation) -> Self {
        Self {
            if_resource_exists: "FAIL".to_string(),
            clients: None,
            users: Some(vec![user]),
        }
    }
}

/// Counters reported by the server after a partial import.
///
/// The engine imports exactly one resource per call and treats any outcome
/// other than a single addition as fatal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialImportResult {
    #[serde(default)]
    pub added: u32,
    #[serde(default)]
    pub overwritten: u32,
    #[serde(default)]
    pub skipped: u32,
}

impl PartialImportResult {
    /// Whether the result reports exactly one addition and nothing else.
    #[must_use]
    pub fn is_single_addition(&self) -> bool {
        self.added == 1 && self.overwritten == 0 && self.skipped == 0
    }
}
