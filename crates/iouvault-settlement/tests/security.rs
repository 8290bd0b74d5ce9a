//! # Security Integration Tests
//!
//! Each test plays a participant or outsider who knows exactly how the
//! engine checks IOUs and tries to get paid anyway.
//!
//! | Attack                          | Defence                                   |
//! |---------------------------------|-------------------------------------------|
//! | Sign your own IOU               | Recovered address compared to the caller  |
//! | Replay an IOU on another token  | Resource bound into the digest            |
//! | Replay on another custodian     | Custodian bound into the digest           |
//! | Garbage signature bytes         | Recovery yields zero, rejected            |
//! | Resubmit an old IOU             | Strictly increasing nonce                 |
//! | Outsider triggers settle        | Participant check before anything else    |

use iouvault_registry::ChannelRegistry;
use iouvault_settlement::{MemoryLedger, SettlementEngine};
use iouvault_types::*;
use iouvault_verifier::IouSigner;

fn u(n: u64) -> U256 {
    U256::from(n)
}

struct Setup {
    engine: SettlementEngine,
    ledger: MemoryLedger,
    custodian: Address,
    signer: IouSigner,
    user: IouSigner,
    recipient: IouSigner,
    token: Address,
}

/// A channel whose user and recipient hold real keys, so they can sign.
fn setup() -> Setup {
    let custodian = random_address();
    let (signer, user, recipient) = (IouSigner::random(), IouSigner::random(), IouSigner::random());
    let token = random_address();
    let mut ledger = MemoryLedger::new();
    ledger.deploy_token(token);
    ledger.mint(token, custodian, u(100)).unwrap();

    let mut engine = SettlementEngine::new(
        custodian,
        ChannelRegistry::multi_tenant(),
        EngineConfig::default(),
    )
    .unwrap();
    engine
        .register(
            &ledger,
            recipient.address(),
            token,
            ChannelTerms::new(user.address(), recipient.address(), signer.address(), 10),
        )
        .unwrap();
    Setup {
        engine,
        ledger,
        custodian,
        signer,
        user,
        recipient,
        token,
    }
}

#[test]
fn recipient_cannot_close_with_self_signed_iou() {
    let mut s = setup();
    let forged = s.recipient.sign(s.custodian, s.token, Iou::new(2u64, 100u64));
    let err = s
        .engine
        .close_with_signature(&s.ledger, s.recipient.address(), s.token, &forged, false)
        .unwrap_err();
    assert!(matches!(err, VaultError::SelfSigned { caller } if caller == s.recipient.address()));
    assert_eq!(s.engine.channel(s.token).state(), ChannelState::Open);
}

#[test]
fn user_cannot_contest_with_self_signed_iou() {
    let mut s = setup();
    let signed = s.signer.sign(s.custodian, s.token, Iou::new(2u64, 80u64));
    s.engine
        .close_with_signature(&s.ledger, s.recipient.address(), s.token, &signed, true)
        .unwrap();

    let forged = s.user.sign(s.custodian, s.token, Iou::new(3u64, 0u64));
    let err = s
        .engine
        .update_closed_channel(&s.ledger, s.user.address(), s.token, &forged)
        .unwrap_err();
    assert!(matches!(err, VaultError::SelfSigned { .. }));
    assert_eq!(s.engine.channel(s.token).amount_owed, u(80));
}

#[test]
fn participant_signature_used_by_other_participant_is_wrong_signer() {
    let mut s = setup();
    let forged = s.user.sign(s.custodian, s.token, Iou::new(2u64, 100u64));
    let err = s
        .engine
        .close_with_signature(&s.ledger, s.recipient.address(), s.token, &forged, false)
        .unwrap_err();
    assert!(matches!(
        err,
        VaultError::SignerMismatch { recovered, .. } if recovered == s.user.address()
    ));
}

#[test]
fn iou_for_one_resource_rejected_on_another() {
    let mut s = setup();
    let other = random_address();
    s.ledger.deploy_token(other);
    s.ledger.mint(other, s.custodian, u(100)).unwrap();
    s.engine
        .register(
            &s.ledger,
            s.recipient.address(),
            other,
            ChannelTerms::new(s.user.address(), s.recipient.address(), s.signer.address(), 10),
        )
        .unwrap();

    let signed = s.signer.sign(s.custodian, s.token, Iou::new(2u64, 50u64));
    let err = s
        .engine
        .close_with_signature(&s.ledger, s.recipient.address(), other, &signed, false)
        .unwrap_err();
    assert!(matches!(err, VaultError::SignerMismatch { .. }));
}

#[test]
fn iou_for_another_custodian_rejected() {
    let mut s = setup();
    let signed = s.signer.sign(random_address(), s.token, Iou::new(2u64, 50u64));
    let err = s
        .engine
        .close_with_signature(&s.ledger, s.recipient.address(), s.token, &signed, false)
        .unwrap_err();
    assert!(matches!(err, VaultError::SignerMismatch { .. }));
}

#[test]
fn garbage_signature_is_malformed() {
    let mut s = setup();
    let garbage = SignedIou::from_parts(Iou::new(2u64, 50u64), 27, U256::zero(), U256::zero());
    let err = s
        .engine
        .close_with_signature(&s.ledger, s.user.address(), s.token, &garbage, false)
        .unwrap_err();
    assert!(matches!(err, VaultError::MalformedSignature));
}

#[test]
fn old_iou_cannot_replace_newer_claim() {
    let mut s = setup();
    let old = s.signer.sign(s.custodian, s.token, Iou::new(2u64, 90u64));
    let new = s.signer.sign(s.custodian, s.token, Iou::new(3u64, 40u64));
    s.engine
        .close_with_signature(&s.ledger, s.user.address(), s.token, &new, true)
        .unwrap();

    let err = s
        .engine
        .update_closed_channel(&s.ledger, s.recipient.address(), s.token, &old)
        .unwrap_err();
    assert!(matches!(err, VaultError::StaleNonce { .. }));
    assert_eq!(s.engine.channel(s.token).amount_owed, u(40));
}

#[test]
fn outsider_cannot_touch_channel() {
    let mut s = setup();
    let outsider = random_address();
    let signed = s.signer.sign(s.custodian, s.token, Iou::new(2u64, 10u64));

    assert!(matches!(
        s.engine
            .close_with_signature(&s.ledger, outsider, s.token, &signed, false)
            .unwrap_err(),
        VaultError::NotParticipant { .. }
    ));
    assert!(matches!(
        s.engine
            .close_without_signature(&s.ledger, s.signer.address(), s.token)
            .unwrap_err(),
        VaultError::NotParticipant { .. }
    ));

    s.engine
        .close_with_signature(&s.ledger, s.user.address(), s.token, &signed, false)
        .unwrap();
    s.ledger.advance_blocks(10);
    assert!(matches!(
        s.engine.settle(&mut s.ledger, outsider, s.token).unwrap_err(),
        VaultError::NotParticipant { .. }
    ));
    assert_eq!(s.ledger.balance(s.token, s.custodian), u(100));
}

#[test]
fn rejected_calls_leave_no_trace() {
    let mut s = setup();
    let events = s.engine.journal().len();
    let before = s.engine.channel(s.token);

    let forged = s.recipient.sign(s.custodian, s.token, Iou::new(2u64, 100u64));
    let _ = s
        .engine
        .close_with_signature(&s.ledger, s.recipient.address(), s.token, &forged, false);
    let _ = s.engine.settle(&mut s.ledger, s.user.address(), s.token);

    assert_eq!(s.engine.channel(s.token), before);
    assert_eq!(s.engine.journal().len(), events);
}
