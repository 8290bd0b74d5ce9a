//! # IOU: the signer's balance attestation
//!
//! An IOU states "for this custodian and this resource, at `nonce`, the
//! recipient is owed `amount`". The signer produces it off-chain; either
//! participant may submit it to close or contest the channel.
//!
//! The canonical signing payload binds the custodian and the resource, so a
//! signature for one channel never validates another:
//!
//! ```text
//! custodian (20) || resource (20) || nonce (32, big-endian) || amount (32, big-endian)
//! ```

use ethers::types::{Address, Signature, U256};
use serde::{Deserialize, Serialize};

use crate::{Result, VaultError, constants};

/// The unsigned `(nonce, amount)` pair of an IOU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Iou {
    /// Strictly increasing per channel; replay protection.
    pub nonce: U256,
    /// Recipient's claim against the custodied balance.
    pub amount: U256,
}

impl Iou {
    #[must_use]
    pub fn new(nonce: impl Into<U256>, amount: impl Into<U256>) -> Self {
        Self {
            nonce: nonce.into(),
            amount: amount.into(),
        }
    }

    /// The all-zero IOU the native-currency adapter accepts.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(constants::NATIVE_DEPOSIT_NONCE, constants::NATIVE_DEPOSIT_AMOUNT)
    }

    /// Whether both fields are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.nonce.is_zero() && self.amount.is_zero()
    }

    /// Canonical packed signing payload for this IOU on `resource` held by
    /// `custodian`.
    #[must_use]
    pub fn signing_payload(&self, custodian: Address, resource: Address) -> Vec<u8> {
        let mut payload = Vec::with_capacity(constants::IOU_PAYLOAD_LEN);
        payload.extend_from_slice(custodian.as_bytes());
        payload.extend_from_slice(resource.as_bytes());
        let mut word = [0u8; 32];
        self.nonce.to_big_endian(&mut word);
        payload.extend_from_slice(&word);
        self.amount.to_big_endian(&mut word);
        payload.extend_from_slice(&word);
        payload
    }

    /// Attach a signature.
    #[must_use]
    pub fn with_signature(self, signature: Signature) -> SignedIou {
        SignedIou {
            iou: self,
            signature,
        }
    }
}

/// An IOU together with the signer's `(v, r, s)` signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedIou {
    pub iou: Iou,
    pub signature: Signature,
}

impl SignedIou {
    /// Assemble from the raw signature triple.
    #[must_use]
    pub fn from_parts(iou: Iou, v: u64, r: U256, s: U256) -> Self {
        iou.with_signature(Signature { r, s, v })
    }

    /// Assemble from a 65-byte `r || s || v` signature in hex (with or
    /// without a `0x` prefix).
    ///
    /// # Errors
    /// Returns [`VaultError::MalformedSignature`] if the hex or the byte
    /// length is invalid.
    pub fn from_hex(iou: Iou, signature_hex: &str) -> Result<Self> {
        let bytes = hex::decode(signature_hex.trim_start_matches("0x"))
            .map_err(|_| VaultError::MalformedSignature)?;
        let signature =
            Signature::try_from(bytes.as_slice()).map_err(|_| VaultError::MalformedSignature)?;
        Ok(iou.with_signature(signature))
    }

    #[must_use]
    pub fn nonce(&self) -> U256 {
        self.iou.nonce
    }

    #[must_use]
    pub fn amount(&self) -> U256 {
        self.iou.amount
    }
}
