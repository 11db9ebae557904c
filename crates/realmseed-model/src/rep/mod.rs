//! Wire representations of admin API resources.
//!
//! Field sets mirror what the server returns; server-assigned identifiers
//! are `Option<String>` because the desired-state model never carries them.
//! Serialization follows the admin API conventions: camelCase names,
//! optional fields omitted when absent.

mod client;
mod flow;
mod idp;
mod import;
mod profile;
mod realm;
mod role;
mod scope;
mod user;

pub use client::ClientRepresentation;
pub use flow::{
    AuthenticationExecutionInfoRepresentation, AuthenticationFlowRepresentation,
    AuthenticatorConfigRepresentation, CreateSubflowRequest,
};
pub use idp::{IdentityProviderMapperRepresentation, IdentityProviderRepresentation};
pub use import::{PartialImportRequest, PartialImportResult};
pub use profile::UserProfileConfig;
pub use realm::RealmRepresentation;
pub use role::RoleRepresentation;
pub use scope::{ClientScopeRepresentation, ProtocolMapperRepresentation};
pub use user::{
    CredentialRepresentation, FederatedIdentityRepresentation, UserRepresentation,
};
