//! Local-key IOU signing for tests and fixtures. **Never use in production.**
//!
//! Produces signatures in exactly the convention [`crate::recover_signer`]
//! expects: the signed-message prefix applied to the IOU digest.

use ethers::signers::{LocalWallet, Signer};
use iouvault_types::{Address, Iou, SignedIou};

use crate::{iou_digest, signed_digest};

/// A throwaway secp256k1 key that signs IOUs.
#[derive(Debug, Clone)]
pub struct IouSigner {
    wallet: LocalWallet,
}

impl IouSigner {
    /// Generate a fresh random key.
    #[must_use]
    pub fn random() -> Self {
        Self {
            wallet: LocalWallet::new(&mut rand::thread_rng()),
        }
    }

    /// The address this key signs as.
    #[must_use]
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Sign `iou` for `resource` held by `custodian`.
    #[must_use]
    pub fn sign(&self, custodian: Address, resource: Address, iou: Iou) -> SignedIou {
        let hash = signed_digest(iou_digest(custodian, resource, &iou));
        let signature = self
            .wallet
            .sign_hash(hash)
            .expect("signing a 32-byte hash with a valid key cannot fail");
        iou.with_signature(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_signers_differ() {
        assert_ne!(IouSigner::random().address(), IouSigner::random().address());
    }

    #[test]
    fn signature_v_is_legacy_form() {
        let signer = IouSigner::random();
        let signed = signer.sign(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            Iou::new(1u64, 1u64),
        );
        assert!(signed.signature.v == 27 || signed.signature.v == 28);
    }
}
