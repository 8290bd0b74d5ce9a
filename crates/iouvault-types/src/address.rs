//! Account identifiers.
//!
//! Every role, resource and the custodian itself is a 20-byte account
//! [`Address`]. The zero address is never a valid role; it doubles as the
//! "nobody" identity returned by failed signature recovery.
//!
//! `Address::is_zero` is inherent on the fixed-hash type.

use ethers::types::Address;

/// Convenience helpers on [`Address`].
pub trait AddressExt {
    /// First four bytes as hex, for compact log fields.
    fn short(&self) -> String;
}

impl AddressExt for Address {
    fn short(&self) -> String {
        hex::encode(&self.as_bytes()[..4])
    }
}

/// Random address for unit tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
#[must_use]
pub fn random_address() -> Address {
    Address::from(rand::random::<[u8; 20]>())
}
