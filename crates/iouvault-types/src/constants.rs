//! System-wide constants for the IOUVault custodian.

/// `closed_nonce` recorded by a close that carries no signed claim.
///
/// Any later signed IOU must carry a nonce strictly above this value to
/// contest or re-close the channel.
pub const NO_CLAIM_NONCE: u64 = 1;

/// Smallest dispute window a channel may be registered with, in blocks.
pub const MIN_TIMEOUT_BLOCKS: u64 = 1;

/// Largest dispute window a channel may be registered with, in blocks
/// (roughly one year of 12-second blocks).
pub const MAX_TIMEOUT_BLOCKS: u64 = 2_628_000;

/// Nonce the native-currency adapter requires on its authorization IOU.
pub const NATIVE_DEPOSIT_NONCE: u64 = 0;

/// Amount the native-currency adapter requires on its authorization IOU.
pub const NATIVE_DEPOSIT_AMOUNT: u64 = 0;

/// Byte length of the packed IOU payload:
/// `custodian(20) || resource(20) || nonce(32) || amount(32)`.
pub const IOU_PAYLOAD_LEN: usize = 20 + 20 + 32 + 32;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "IOUVault";

/// Default number of channel events retained by the engine's journal.
pub const DEFAULT_EVENT_JOURNAL_CAPACITY: usize = 10_000;
