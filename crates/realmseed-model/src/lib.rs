//! Data model for the realmseed reconciliation engine.
//!
//! Three concerns live here, all free of I/O:
//!
//! - [`rep`] — wire representations of the identity server's admin resources,
//!   serialized the way the server expects them (camelCase, optional fields
//!   omitted).
//! - [`spec`] — the desired-state model: a [`spec::RealmSpec`] aggregate
//!   merged from seed sources by the caller, with fail-fast cross-reference
//!   validation.
//! - [`policy`] — the per-entity Create/Update/Delete permission matrix
//!   consulted before every mutating call.

pub mod policy;
pub mod rep;
pub mod spec;

pub use policy::{EntityCategory, ModificationPolicy, Operation, OperationSet};
pub use spec::{RealmSpec, SpecError};
