//! # iouvault-registry
//!
//! **Channel Registry**: maps a custodied resource (token address) to one
//! channel record.
//!
//! ## Tenancy
//!
//! - **Single-tenant**: one fixed `(user, recipient, signer, timeout)` shared
//!   by every resource registered against the registry.
//! - **Multi-tenant**: every resource carries its own terms.
//!
//! Both variants are the same map parameterized by a [`Tenancy`] tag; the
//! settlement engine never branches on it.
//!
//! ## Registration
//!
//! ```text
//! recipient → register(resource, terms) → validate terms → reject duplicates → Channel (OPEN)
//! ```

pub mod registry;
pub mod tenancy;

pub use registry::ChannelRegistry;
pub use tenancy::Tenancy;
