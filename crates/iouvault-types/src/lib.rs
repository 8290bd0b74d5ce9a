//! # iouvault-types
//!
//! Shared types, errors, and configuration for the **IOUVault** payment-channel
//! custodian.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`U256`] (re-exported from `ethers`) and [`AddressExt`]
//! - **Channel model**: [`Channel`], [`ChannelState`], [`ChannelData`], [`ChannelTerms`]
//! - **IOU model**: [`Iou`], [`SignedIou`]
//! - **Audit trail**: [`ChannelEvent`], [`EventRecord`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`VaultError`] with `CH_ERR_` prefix codes, [`ErrorKind`]
//! - **Constants**: system-wide limits and sentinels

pub mod address;
pub mod channel;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod iou;

// Re-export all primary types at crate root for ergonomic imports:
//   use iouvault_types::{Channel, SignedIou, VaultError, ...};

pub use address::*;
pub use channel::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use iou::*;

pub use ethers::types::{Address, Signature, H256, U256};

// Constants are accessed via `iouvault_types::constants::FOO`
// (not re-exported to avoid name collisions).
