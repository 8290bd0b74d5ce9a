//! Signer recovery and post-recovery authorization.

use ethers::types::RecoveryMessage;
use iouvault_types::{Address, Result, SignedIou, VaultError};

use crate::{iou_digest, signed_digest};

/// Recover the address that signed `signed` for `resource` held by
/// `custodian`.
///
/// Never fails: an unrecoverable signature yields [`Address::zero`].
#[must_use]
pub fn recover_signer(custodian: Address, resource: Address, signed: &SignedIou) -> Address {
    let hash = signed_digest(iou_digest(custodian, resource, &signed.iou));
    match signed.signature.recover(RecoveryMessage::Hash(hash)) {
        Ok(addr) => addr,
        Err(e) => {
            tracing::debug!(
                resource = ?resource,
                nonce = %signed.iou.nonce,
                error = %e,
                "IOU signature unrecoverable"
            );
            Address::zero()
        }
    }
}

/// Decide whether a recovered address authorizes `caller` on a channel
/// whose signer is `signer`.
///
/// Checks run in a fixed order so each failure keeps its own error:
/// 1. Unrecoverable signature → [`VaultError::MalformedSignature`]
/// 2. Signed by the caller itself → [`VaultError::SelfSigned`]
/// 3. Signed by anyone but the signer → [`VaultError::SignerMismatch`]
pub fn authorize(recovered: Address, caller: Address, signer: Address) -> Result<()> {
    if recovered.is_zero() {
        return Err(VaultError::MalformedSignature);
    }
    if recovered == caller {
        return Err(VaultError::SelfSigned { caller });
    }
    if recovered != signer {
        return Err(VaultError::SignerMismatch {
            recovered,
            expected: signer,
        });
    }
    Ok(())
}

/// Verifier bound to one custodian address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IouVerifier {
    custodian: Address,
}

impl IouVerifier {
    #[must_use]
    pub fn new(custodian: Address) -> Self {
        Self { custodian }
    }

    /// The custodian address bound into every digest.
    #[must_use]
    pub fn custodian(&self) -> Address {
        self.custodian
    }

    /// Recover the signer of `signed` for `resource`.
    #[must_use]
    pub fn recover(&self, resource: Address, signed: &SignedIou) -> Address {
        recover_signer(self.custodian, resource, signed)
    }

    /// Recover, then authorize `caller` against `signer`.
    pub fn verify(
        &self,
        resource: Address,
        signed: &SignedIou,
        caller: Address,
        signer: Address,
    ) -> Result<()> {
        authorize(self.recover(resource, signed), caller, signer)
    }
}

#[cfg(test)]
mod tests {
    use iouvault_types::{Iou, U256};

    use super::*;
    use crate::IouSigner;

    fn custodian() -> Address {
        Address::repeat_byte(0xcc)
    }

    fn resource() -> Address {
        Address::repeat_byte(0x01)
    }

    #[test]
    fn recovers_signer_address() {
        let signer = IouSigner::random();
        let signed = signer.sign(custodian(), resource(), Iou::new(2u64, 49u64));
        assert_eq!(recover_signer(custodian(), resource(), &signed), signer.address());
    }

    #[test]
    fn other_resource_recovers_someone_else() {
        let signer = IouSigner::random();
        let signed = signer.sign(custodian(), resource(), Iou::new(2u64, 49u64));
        let recovered = recover_signer(custodian(), Address::repeat_byte(0x02), &signed);
        assert_ne!(recovered, signer.address());
    }

    #[test]
    fn other_custodian_recovers_someone_else() {
        let signer = IouSigner::random();
        let signed = signer.sign(custodian(), resource(), Iou::new(2u64, 49u64));
        let recovered = recover_signer(Address::repeat_byte(0xdd), resource(), &signed);
        assert_ne!(recovered, signer.address());
    }

    #[test]
    fn tampered_amount_recovers_someone_else() {
        let signer = IouSigner::random();
        let mut signed = signer.sign(custodian(), resource(), Iou::new(2u64, 49u64));
        signed.iou.amount = U256::from(50);
        assert_ne!(recover_signer(custodian(), resource(), &signed), signer.address());
    }

    #[test]
    fn malformed_signature_recovers_zero() {
        let signed = SignedIou::from_parts(Iou::new(1u64, 1u64), 99, U256::zero(), U256::zero());
        assert_eq!(recover_signer(custodian(), resource(), &signed), Address::zero());
    }

    #[test]
    fn authorize_order_of_checks() {
        let caller = Address::repeat_byte(0x0a);
        let signer = Address::repeat_byte(0x0b);

        assert!(matches!(
            authorize(Address::zero(), caller, signer).unwrap_err(),
            VaultError::MalformedSignature
        ));
        assert!(matches!(
            authorize(caller, caller, signer).unwrap_err(),
            VaultError::SelfSigned { .. }
        ));
        assert!(matches!(
            authorize(Address::repeat_byte(0x0c), caller, signer).unwrap_err(),
            VaultError::SignerMismatch { .. }
        ));
        assert!(authorize(signer, caller, signer).is_ok());
    }

    #[test]
    fn verifier_rejects_self_signed_iou() {
        let verifier = IouVerifier::new(custodian());
        let user = IouSigner::random();
        let signer = IouSigner::random();
        let signed = user.sign(custodian(), resource(), Iou::new(2u64, 49u64));

        let err = verifier
            .verify(resource(), &signed, user.address(), signer.address())
            .unwrap_err();
        assert!(matches!(err, VaultError::SelfSigned { .. }));
    }

    #[test]
    fn verifier_accepts_signer_iou() {
        let verifier = IouVerifier::new(custodian());
        let signer = IouSigner::random();
        let signed = signer.sign(custodian(), resource(), Iou::new(2u64, 49u64));
        assert_eq!(verifier.custodian(), custodian());
        assert!(
            verifier
                .verify(resource(), &signed, Address::repeat_byte(0x0a), signer.address())
                .is_ok()
        );
    }
}
