//! Engine error taxonomy.
//!
//! Every variant is fatal for the current realm's run. Policy-denied
//! operations are not errors and never surface here; transient I/O
//! failures arrive through [`EngineError::Client`] and are propagated
//! without retry.

use realmseed_client::ClientError;
use realmseed_model::SpecError;
use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;

/// A fatal condition aborting the current realm's run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration (desired or live) is in a state the engine cannot
    /// safely act on: an unresolved cross-reference, a duplicated natural
    /// key, or a live entity missing a field needed as a key. Never
    /// retried — the same inconsistent configuration cannot succeed twice.
    #[error("configuration integrity error for {entity} '{name}': {detail}")]
    ConfigIntegrity {
        entity: &'static str,
        name: String,
        detail: String,
    },

    /// The remote server answered with a shape the algorithm cannot
    /// interpret (e.g. a partial import reporting anything other than a
    /// single addition).
    #[error("unexpected remote response for {entity} '{name}': {detail}")]
    RemoteShape {
        entity: &'static str,
        name: String,
        detail: String,
    },

    /// A defect in the desired-state model.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// A remote client failure, fatal for the current realm.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The run was cancelled cooperatively.
    #[error("reconciliation cancelled")]
    Cancelled,
}

impl EngineError {
    /// A live entity is missing the server-assigned id the algorithm needs
    /// as a key for a subsequent call.
    pub fn missing_id(entity: &'static str, name: impl Into<String>) -> Self {
        EngineError::ConfigIntegrity {
            entity,
            name: name.into(),
            detail: "live entity has no server-assigned id".to_string(),
        }
    }
}
