//! # Channel: the custodial relationship over one resource
//!
//! A [`Channel`] binds a user, a recipient and a signer to one custodied
//! token (the *resource*). The record is created Open by registration and
//! mutated only by close, contest and settle.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐  close   ┌────────┐  settle   ┌─────────┐
//!   │ OPEN ├─────────▶│ CLOSED ├──────────▶│ SETTLED │
//!   └──────┘          └───┬────┘           └────┬────┘
//!                         │ contest             │ close (nonce > closed_nonce)
//!                         └──▶ CLOSED           └──▶ CLOSED
//! ```
//!
//! The state is derived from the record, never stored separately:
//! `closed_block == 0` is Open, `closed_block > 0 && !settled` is Closed,
//! `closed_block > 0 && settled` is Settled.

use std::fmt;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{Result, VaultError, constants};

/// Lifecycle state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelState {
    /// Never closed. Funds may be deposited; a close may be submitted.
    Open,
    /// Closed; the dispute window runs from `closed_block`.
    Closed,
    /// The closing episode paid out. Re-closable with a higher nonce.
    Settled,
}

impl ChannelState {
    /// Can a channel in this state move to `target`?
    ///
    /// A contest leaves the channel Closed and is not a transition.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open | Self::Settled, Self::Closed) | (Self::Closed, Self::Settled)
        )
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Settled => write!(f, "SETTLED"),
        }
    }
}

/// The immutable terms a channel is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTerms {
    /// The paying party; receives unspent balance on settlement.
    pub user: Address,
    /// The paid party; receives the owed amount on settlement.
    pub recipient: Address,
    /// The off-chain authority whose key signs IOUs.
    pub signer: Address,
    /// Dispute-window length in blocks.
    pub timeout: u64,
}

impl ChannelTerms {
    /// Build a set of terms.
    #[must_use]
    pub fn new(user: Address, recipient: Address, signer: Address, timeout: u64) -> Self {
        Self {
            user,
            recipient,
            signer,
            timeout,
        }
    }

    /// Check the terms can back a channel.
    ///
    /// # Errors
    /// Returns [`VaultError::InvalidTerms`] if any role is the zero address,
    /// two roles coincide, or the timeout is out of range.
    pub fn validate(&self) -> Result<()> {
        let roles = [
            ("user", self.user),
            ("recipient", self.recipient),
            ("signer", self.signer),
        ];
        for (name, addr) in roles {
            if addr.is_zero() {
                return Err(VaultError::InvalidTerms {
                    reason: format!("{name} is the zero address"),
                });
            }
        }
        if self.user == self.recipient
            || self.user == self.signer
            || self.recipient == self.signer
        {
            return Err(VaultError::InvalidTerms {
                reason: "user, recipient and signer must be distinct".to_string(),
            });
        }
        if !(constants::MIN_TIMEOUT_BLOCKS..=constants::MAX_TIMEOUT_BLOCKS)
            .contains(&self.timeout)
        {
            return Err(VaultError::InvalidTerms {
                reason: format!(
                    "timeout {} outside {}..={} blocks",
                    self.timeout,
                    constants::MIN_TIMEOUT_BLOCKS,
                    constants::MAX_TIMEOUT_BLOCKS
                ),
            });
        }
        Ok(())
    }
}

/// Persisted state of one channel.
///
/// `Default` is the zero-valued record reported for unregistered resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub user: Address,
    pub recipient: Address,
    pub signer: Address,
    /// Dispute-window length in blocks.
    pub timeout: u64,
    /// Highest nonce accepted by a close or contest. Never decreases.
    pub closed_nonce: U256,
    /// Block at which the current closing episode began; 0 while never closed.
    pub closed_block: u64,
    /// Recipient's claim recorded at the last close or contest.
    pub amount_owed: U256,
    /// Whether settlement returns the unspent remainder to the user.
    pub should_return_token: bool,
    /// Whether the current closing episode has already paid out.
    pub settled: bool,
}

impl Channel {
    /// A freshly registered, Open channel.
    #[must_use]
    pub fn new(terms: ChannelTerms) -> Self {
        Self {
            user: terms.user,
            recipient: terms.recipient,
            signer: terms.signer,
            timeout: terms.timeout,
            ..Self::default()
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        match (self.closed_block, self.settled) {
            (0, _) => ChannelState::Open,
            (_, false) => ChannelState::Closed,
            (_, true) => ChannelState::Settled,
        }
    }

    /// Whether `addr` is the user or the recipient.
    #[must_use]
    pub fn is_participant(&self, addr: Address) -> bool {
        addr == self.user || addr == self.recipient
    }

    /// First block at which the dispute window counts as elapsed.
    #[must_use]
    pub fn dispute_deadline(&self) -> u64 {
        self.closed_block.saturating_add(self.timeout)
    }

    /// The registration terms.
    #[must_use]
    pub fn terms(&self) -> ChannelTerms {
        ChannelTerms::new(self.user, self.recipient, self.signer, self.timeout)
    }

    /// Fixed-order snapshot for external readers.
    #[must_use]
    pub fn data(&self) -> ChannelData {
        ChannelData {
            user: self.user,
            recipient: self.recipient,
            signer: self.signer,
            timeout: self.timeout,
            closed_nonce: self.closed_nonce,
            closed_block: self.closed_block,
            amount_owed: self.amount_owed,
            should_return_token: self.should_return_token,
            settled: self.settled,
        }
    }
}

/// Read-only snapshot of every channel field, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelData {
    pub user: Address,
    pub recipient: Address,
    pub signer: Address,
    pub timeout: u64,
    pub closed_nonce: U256,
    pub closed_block: u64,
    pub amount_owed: U256,
    pub should_return_token: bool,
    pub settled: bool,
}

impl ChannelData {
    /// The snapshot as a positional tuple.
    #[must_use]
    #[allow(clippy::type_complexity)]
    pub fn into_tuple(self) -> (Address, Address, Address, u64, U256, u64, U256, bool, bool) {
        (
            self.user,
            self.recipient,
            self.signer,
            self.timeout,
            self.closed_nonce,
            self.closed_block,
            self.amount_owed,
            self.should_return_token,
            self.settled,
        )
    }
}
