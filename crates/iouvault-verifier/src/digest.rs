//! IOU digest construction.
//!
//! ```text
//! digest = keccak256(custodian || resource || nonce || amount)
//! signed = keccak256("\x19Ethereum Signed Message:\n32" || digest)
//! ```
//!
//! The second step is the standard signed-message prefix, so any wallet
//! that signs a 32-byte message produces a signature the custodian accepts.

use ethers::utils::{hash_message, keccak256};
use iouvault_types::{Address, H256, Iou};

/// Content hash of an IOU bound to `custodian` and `resource`.
#[must_use]
pub fn iou_digest(custodian: Address, resource: Address, iou: &Iou) -> H256 {
    H256::from(keccak256(iou.signing_payload(custodian, resource)))
}

/// Apply the signed-message prefix to a digest.
#[must_use]
pub fn signed_digest(digest: H256) -> H256 {
    hash_message(digest.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custodian() -> Address {
        Address::repeat_byte(0xcc)
    }

    #[test]
    fn digest_deterministic() {
        let iou = Iou::new(2u64, 49u64);
        let resource = Address::repeat_byte(0x01);
        assert_eq!(
            iou_digest(custodian(), resource, &iou),
            iou_digest(custodian(), resource, &iou)
        );
    }

    #[test]
    fn digest_differs_by_every_field() {
        let resource = Address::repeat_byte(0x01);
        let iou = Iou::new(2u64, 49u64);
        let base = iou_digest(custodian(), resource, &iou);

        assert_ne!(base, iou_digest(Address::repeat_byte(0xdd), resource, &iou));
        assert_ne!(base, iou_digest(custodian(), Address::repeat_byte(0x02), &iou));
        assert_ne!(base, iou_digest(custodian(), resource, &Iou::new(3u64, 49u64)));
        assert_ne!(base, iou_digest(custodian(), resource, &Iou::new(2u64, 48u64)));
    }

    #[test]
    fn digest_is_keccak_of_payload() {
        let resource = Address::repeat_byte(0x01);
        let iou = Iou::new(7u64, 8u64);
        let expected = keccak256(iou.signing_payload(custodian(), resource));
        assert_eq!(iou_digest(custodian(), resource, &iou).0, expected);
    }

    #[test]
    fn prefix_changes_hash() {
        let digest = H256::repeat_byte(0x42);
        let prefixed = signed_digest(digest);
        assert_ne!(prefixed, digest);

        let mut manual = b"\x19Ethereum Signed Message:\n32".to_vec();
        manual.extend_from_slice(digest.as_bytes());
        assert_eq!(prefixed.0, keccak256(manual));
    }
}
