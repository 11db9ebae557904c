//! Typed client for the identity server's administrative REST API.
//!
//! The engine consumes the [`api::AdminApi`] trait, never HTTP directly;
//! [`http::HttpAdminClient`] is the reqwest-backed production
//! implementation. Transient I/O failures are propagated, not retried —
//! retry strategy belongs to the caller, and the engine treats any remote
//! failure as fatal for the current realm.

pub mod api;
pub mod auth;
pub mod error;
pub mod http;

pub use api::{AdminApi, MapperOwner};
pub use auth::{AdminAuth, AdminCredentials};
pub use error::{ClientError, ClientResult};
pub use http::HttpAdminClient;
