//! Channel events for the custodian's audit trail.
//!
//! Every accepted transition produces one [`EventRecord`]. Rejected calls
//! produce nothing.

use std::fmt;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// What happened to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelEvent {
    /// A channel was registered for a resource.
    Registered {
        user: Address,
        recipient: Address,
        signer: Address,
        timeout: u64,
    },
    /// A channel entered CLOSED. `signed` is false for a claim-less close.
    Closed {
        caller: Address,
        nonce: U256,
        amount: U256,
        should_return_token: bool,
        signed: bool,
    },
    /// A higher-nonce IOU superseded the recorded claim.
    Contested {
        caller: Address,
        nonce: U256,
        amount: U256,
    },
    /// The closing episode paid out.
    Settled {
        caller: Address,
        to_recipient: U256,
        to_user: U256,
        retained: U256,
    },
    /// Native currency was converted into the wrapped-token resource.
    NativeDeposited { amount: U256 },
}

impl ChannelEvent {
    /// Stable upper-case name of the event type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "CHANNEL_REGISTERED",
            Self::Closed { .. } => "CHANNEL_CLOSED",
            Self::Contested { .. } => "CHANNEL_CONTESTED",
            Self::Settled { .. } => "CHANNEL_SETTLED",
            Self::NativeDeposited { .. } => "NATIVE_DEPOSITED",
        }
    }
}

impl fmt::Display for ChannelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A journaled event with its position and context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Monotonic sequence number, starting at 0 per engine.
    pub sequence: u64,
    /// Block height at which the event was recorded (0 for registrations).
    pub block: u64,
    /// The channel's resource.
    pub resource: Address,
    pub event: ChannelEvent,
}
