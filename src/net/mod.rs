//! Networking modules for the REST session endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the HTTP client adapter the session core talks to, `transport`
//! is the seam real HTTP stacks plug into, `error` is the typed failure
//! taxonomy produced at that boundary, and `types` defines the wire schema.

pub mod api;
#[cfg(feature = "hydrate")]
pub mod browser;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod transport;
pub mod types;
