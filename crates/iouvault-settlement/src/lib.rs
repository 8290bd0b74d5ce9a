//! # iouvault-settlement
//!
//! **Settlement State Machine**: close, contest, settle, and native-currency
//! conversion for IOUVault channels.
//!
//! ## Architecture
//!
//! The [`SettlementEngine`] owns the channel registry and consults an
//! injected [`Ledger`] for everything about money:
//! 1. Loads the channel and checks the caller is a participant
//! 2. Checks state, nonce ordering, and dispute-window timing
//! 3. Re-reads the live custodied balance (never a cached figure)
//! 4. Recovers and authorizes the IOU signature
//! 5. Pays out in one all-or-nothing ledger batch (settle only)
//! 6. Commits the updated record and journals a [`ChannelEvent`]
//!
//! Any failing step returns before step 6, so a rejected call leaves both
//! the channel and the ledger untouched.
//!
//! ## Dispute window
//!
//! ```text
//! close @ B ──── contest allowed while block < B + timeout ──── settle allowed from B + timeout
//! ```
//!
//! [`ChannelEvent`]: iouvault_types::ChannelEvent

pub mod engine;
pub mod journal;
pub mod ledger;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
pub mod native;
pub mod payout;

pub use engine::SettlementEngine;
pub use journal::EventJournal;
pub use ledger::{Ledger, NativeWrapper, Transfer};
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::MemoryLedger;
pub use payout::Payout;
