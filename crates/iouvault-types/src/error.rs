//! Error types for the IOUVault custodian.
//!
//! All errors use the `CH_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by failure class:
//! - 1xx: Authorization errors
//! - 2xx: Ordering errors (nonces, dispute window)
//! - 3xx: State errors
//! - 4xx: Value errors
//! - 5xx: Ledger errors
//! - 9xx: Configuration / internal errors
//!
//! Every error is a whole-call rejection: the channel record and the ledger
//! are left exactly as they were before the call.

use std::fmt;

use ethers::types::{Address, U256};
use thiserror::Error;

use crate::ChannelState;

/// Coarse failure class of a [`VaultError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong caller or wrong signature.
    Authorization,
    /// Stale nonce or dispute-window timing.
    Ordering,
    /// Operation not valid for the channel's current state.
    State,
    /// Amount or IOU field out of range.
    Value,
    /// The injected ledger refused or misbehaved.
    Ledger,
    /// Configuration or internal failure.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Ordering => write!(f, "ORDERING"),
            Self::State => write!(f, "STATE"),
            Self::Value => write!(f, "VALUE"),
            Self::Ledger => write!(f, "LEDGER"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Central error enum for all IOUVault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// Caller is neither the channel's user nor its recipient.
    #[error("CH_ERR_100: Caller {caller:?} is not a participant of channel {resource:?}")]
    NotParticipant { caller: Address, resource: Address },

    /// Caller is not the recipient the operation is reserved for.
    #[error("CH_ERR_101: Caller {caller:?} is not the designated recipient")]
    NotRecipient { caller: Address },

    /// The IOU signature recovers to the caller itself.
    #[error("CH_ERR_102: IOU is self-signed by caller {caller:?}")]
    SelfSigned { caller: Address },

    /// The IOU signature recovers to someone other than the channel signer.
    #[error("CH_ERR_103: IOU signed by {recovered:?}, expected signer {expected:?}")]
    SignerMismatch { recovered: Address, expected: Address },

    /// The signature could not be recovered at all.
    #[error("CH_ERR_104: Malformed IOU signature")]
    MalformedSignature,

    // =================================================================
    // Ordering Errors (2xx)
    // =================================================================
    /// Supplied nonce is not strictly greater than the recorded one.
    #[error("CH_ERR_200: Stale nonce {supplied}, channel already at {recorded}")]
    StaleNonce { supplied: U256, recorded: U256 },

    /// Contest attempted after the dispute window closed.
    #[error("CH_ERR_201: Dispute window elapsed at block {deadline}, now {current}")]
    DisputeWindowElapsed { deadline: u64, current: u64 },

    /// Settle attempted while the dispute window is still open.
    #[error("CH_ERR_202: Dispute window open until block {deadline}, now {current}")]
    DisputeWindowActive { deadline: u64, current: u64 },

    // =================================================================
    // State Errors (3xx)
    // =================================================================
    /// No channel is registered for this resource.
    #[error("CH_ERR_300: Channel not found for resource {0:?}")]
    ChannelNotFound(Address),

    /// A channel is already registered for this resource.
    #[error("CH_ERR_301: Channel already registered for resource {0:?}")]
    ChannelAlreadyRegistered(Address),

    /// The operation needs an Open (or Settled) channel.
    #[error("CH_ERR_302: Channel is {state}, cannot close")]
    ChannelNotOpen { state: ChannelState },

    /// The operation needs a Closed channel.
    #[error("CH_ERR_303: Channel is {state}, expected CLOSED")]
    ChannelNotClosed { state: ChannelState },

    /// The current closing episode has already paid out.
    #[error("CH_ERR_304: Channel already settled")]
    ChannelAlreadySettled,

    /// A signature-less close was attempted after a claim was recorded.
    #[error("CH_ERR_305: Channel already carries claim nonce {0}")]
    ClaimAlreadyRecorded(U256),

    /// The registration call does not match the registry's tenancy.
    #[error("CH_ERR_306: Registry is {actual}, registration requires {expected}")]
    WrongTenancy {
        expected: &'static str,
        actual: &'static str,
    },

    // =================================================================
    // Value Errors (4xx)
    // =================================================================
    /// Claimed amount exceeds the live custodied balance.
    #[error("CH_ERR_400: Amount {amount} exceeds live balance {balance}")]
    AmountExceedsBalance { amount: U256, balance: U256 },

    /// The native-currency adapter was handed a non-zero IOU.
    #[error("CH_ERR_401: Native deposit requires a zero IOU, got nonce {nonce} amount {amount}")]
    NonZeroIou { nonce: U256, amount: U256 },

    /// There is no native currency to convert (or less than requested).
    #[error("CH_ERR_402: Cannot convert {requested} native, custodian holds {available}")]
    NothingToConvert { requested: U256, available: U256 },

    /// Registration terms are invalid (zero or duplicate roles, bad timeout).
    #[error("CH_ERR_403: Invalid channel terms: {reason}")]
    InvalidTerms { reason: String },

    // =================================================================
    // Ledger Errors (5xx)
    // =================================================================
    /// The ledger does not know this token.
    #[error("CH_ERR_500: Unknown token {0:?}")]
    UnknownToken(Address),

    /// The ledger refused a transfer.
    #[error("CH_ERR_501: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// The resource is not the ledger's wrapped native token.
    #[error("CH_ERR_502: Resource {resource:?} is not the wrapped native token {wrapped:?}")]
    NotWrappedNative { resource: Address, wrapped: Address },

    /// Computed payouts do not add up to the live balance.
    #[error("CH_ERR_503: Payout not conserved: {reason}")]
    PayoutNotConserved { reason: String },

    // =================================================================
    // Configuration / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("CH_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (invalid config document, bad values).
    #[error("CH_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("CH_ERR_902: Serialization error: {0}")]
    Serialization(String),
}

impl VaultError {
    /// The failure class this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotParticipant { .. }
            | Self::NotRecipient { .. }
            | Self::SelfSigned { .. }
            | Self::SignerMismatch { .. }
            | Self::MalformedSignature => ErrorKind::Authorization,
            Self::StaleNonce { .. }
            | Self::DisputeWindowElapsed { .. }
            | Self::DisputeWindowActive { .. } => ErrorKind::Ordering,
            Self::ChannelNotFound(_)
            | Self::ChannelAlreadyRegistered(_)
            | Self::ChannelNotOpen { .. }
            | Self::ChannelNotClosed { .. }
            | Self::ChannelAlreadySettled
            | Self::ClaimAlreadyRecorded(_)
            | Self::WrongTenancy { .. } => ErrorKind::State,
            Self::AmountExceedsBalance { .. }
            | Self::NonZeroIou { .. }
            | Self::NothingToConvert { .. }
            | Self::InvalidTerms { .. } => ErrorKind::Value,
            Self::UnknownToken(_)
            | Self::TransferFailed { .. }
            | Self::NotWrappedNative { .. }
            | Self::PayoutNotConserved { .. } => ErrorKind::Ledger,
            Self::Internal(_) | Self::Configuration(_) | Self::Serialization(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, VaultError>;

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = VaultError::ChannelNotFound(Address::zero());
        let msg = format!("{err}");
        assert!(msg.starts_with("CH_ERR_300"), "Got: {msg}");
    }

    #[test]
    fn stale_nonce_display() {
        let err = VaultError::StaleNonce {
            supplied: U256::from(3),
            recorded: U256::from(7),
        };
        let msg = format!("{err}");
        assert!(msg.contains("CH_ERR_200"));
        assert!(msg.contains('3'));
        assert!(msg.contains('7'));
    }

    #[test]
    fn channel_not_closed_names_state() {
        let err = VaultError::ChannelNotClosed {
            state: ChannelState::Open,
        };
        assert!(format!("{err}").contains("OPEN"));
    }

    #[test]
    fn kinds_follow_code_groups() {
        let cases = [
            (VaultError::MalformedSignature, ErrorKind::Authorization),
            (
                VaultError::DisputeWindowActive {
                    deadline: 10,
                    current: 9,
                },
                ErrorKind::Ordering,
            ),
            (VaultError::ChannelAlreadySettled, ErrorKind::State),
            (
                VaultError::NonZeroIou {
                    nonce: U256::one(),
                    amount: U256::zero(),
                },
                ErrorKind::Value,
            ),
            (VaultError::UnknownToken(Address::zero()), ErrorKind::Ledger),
            (VaultError::Internal("x".into()), ErrorKind::Internal),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn all_errors_have_ch_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(VaultError::ChannelAlreadySettled),
            Box::new(VaultError::SelfSigned {
                caller: Address::zero(),
            }),
            Box::new(VaultError::WrongTenancy {
                expected: "MULTI_TENANT",
                actual: "SINGLE_TENANT",
            }),
            Box::new(VaultError::Configuration("bad".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("CH_ERR_"),
                "Error missing CH_ERR_ prefix: {msg}"
            );
        }
    }
}
