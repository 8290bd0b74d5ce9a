//! # iouvault-verifier
//!
//! **Pure IOU signature verification for IOUVault.**
//!
//! The verifier turns an IOU into the exact 32-byte hash the signer signed
//! and recovers the signing address from a `(v, r, s)` triple. It has:
//!
//! - **Zero side effects**: no channel state, no ledger access
//! - **No failure path on recovery**: a malformed signature recovers to the
//!   zero address, which never matches a registered signer
//! - **Channel binding**: the digest commits to the custodian and the
//!   resource, so an IOU cannot be replayed on another channel
//!
//! Authorization (who may present which signature) is a separate step,
//! [`authorize`], run after recovery so each rejection reason stays
//! distinguishable.

pub mod digest;
pub mod recover;
#[cfg(any(test, feature = "test-helpers"))]
pub mod signer;

pub use digest::{iou_digest, signed_digest};
pub use recover::{IouVerifier, authorize, recover_signer};
#[cfg(any(test, feature = "test-helpers"))]
pub use signer::IouSigner;
