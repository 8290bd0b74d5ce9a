//! The settlement engine: one state machine over every registered channel.
//!
//! Each transition validates everything first, then touches the ledger (if
//! at all), then commits the channel record. A transition that returns an
//! error has changed nothing.

use iouvault_registry::ChannelRegistry;
use iouvault_types::{
    Address, AddressExt, Channel, ChannelData, ChannelEvent, ChannelState, ChannelTerms,
    EngineConfig, EventRecord, Result, SignedIou, U256, VaultError, constants,
};
use iouvault_verifier::IouVerifier;

use crate::{EventJournal, Ledger, Payout};

/// Settlement state machine bound to one custodian address.
pub struct SettlementEngine {
    /// Address holding every custodied balance.
    pub(crate) custodian: Address,
    pub(crate) verifier: IouVerifier,
    pub(crate) registry: ChannelRegistry,
    pub(crate) config: EngineConfig,
    pub(crate) journal: EventJournal,
}

impl SettlementEngine {
    /// Create an engine for `custodian` over `registry`.
    ///
    /// # Errors
    /// - `InvalidTerms` if `custodian` is the zero address
    /// - `Configuration` if `config` fails validation
    pub fn new(
        custodian: Address,
        registry: ChannelRegistry,
        config: EngineConfig,
    ) -> Result<Self> {
        if custodian.is_zero() {
            return Err(VaultError::InvalidTerms {
                reason: "custodian is the zero address".to_string(),
            });
        }
        config.validate()?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            custodian = %custodian.short(),
            tenancy = registry.tenancy().name(),
            contest_extends_window = config.contest_extends_window,
            "Settlement engine started"
        );
        Ok(Self {
            custodian,
            verifier: IouVerifier::new(custodian),
            journal: EventJournal::new(config.event_journal_capacity),
            registry,
            config,
        })
    }

    // ── Registration ────────────────────────────────────────────────

    /// Register `resource` with its own terms (multi-tenant registry).
    ///
    /// # Errors
    /// See [`ChannelRegistry::register`].
    pub fn register<L: Ledger + ?Sized>(
        &mut self,
        ledger: &L,
        caller: Address,
        resource: Address,
        terms: ChannelTerms,
    ) -> Result<()> {
        self.registry.register(caller, resource, terms)?;
        self.record_registration(ledger.block_number(), resource, terms);
        Ok(())
    }

    /// Register `resource` under the registry's fixed terms (single-tenant).
    ///
    /// # Errors
    /// See [`ChannelRegistry::register_inherited`].
    pub fn register_inherited<L: Ledger + ?Sized>(
        &mut self,
        ledger: &L,
        caller: Address,
        resource: Address,
    ) -> Result<()> {
        let terms = self.registry.register_inherited(caller, resource)?.terms();
        self.record_registration(ledger.block_number(), resource, terms);
        Ok(())
    }

    fn record_registration(&mut self, block: u64, resource: Address, terms: ChannelTerms) {
        self.journal.record(
            block,
            resource,
            ChannelEvent::Registered {
                user: terms.user,
                recipient: terms.recipient,
                signer: terms.signer,
                timeout: terms.timeout,
            },
        );
    }

    // ── Close ───────────────────────────────────────────────────────

    /// Start a closing episode with a signed IOU.
    ///
    /// Allowed from Open, and from Settled to start a new episode. The IOU
    /// must carry a nonce above the recorded one, claim no more than the
    /// live custodied balance, and be signed by the channel's signer.
    ///
    /// # Errors
    /// - `ChannelNotFound`, `NotParticipant`
    /// - `ChannelNotOpen` while a close is pending
    /// - `StaleNonce`, `AmountExceedsBalance`
    /// - `MalformedSignature`, `SelfSigned`, `SignerMismatch`
    pub fn close_with_signature<L: Ledger + ?Sized>(
        &mut self,
        ledger: &L,
        caller: Address,
        resource: Address,
        signed: &SignedIou,
        should_return_token: bool,
    ) -> Result<()> {
        let block = current_block(ledger)?;
        let mut channel = self.load_for(caller, resource)?;
        let state = channel.state();
        if !state.can_transition_to(ChannelState::Closed) {
            return Err(VaultError::ChannelNotOpen { state });
        }
        self.check_claim(ledger, caller, resource, &channel, signed)?;

        channel.amount_owed = signed.amount();
        channel.closed_nonce = signed.nonce();
        channel.closed_block = block;
        channel.should_return_token = should_return_token;
        channel.settled = false;
        self.registry.commit(resource, channel)?;

        tracing::info!(
            resource = %resource.short(),
            caller = %caller.short(),
            nonce = %signed.nonce(),
            amount = %signed.amount(),
            should_return_token,
            block,
            reopened = state == ChannelState::Settled,
            "Channel closed"
        );
        self.journal.record(
            block,
            resource,
            ChannelEvent::Closed {
                caller,
                nonce: signed.nonce(),
                amount: signed.amount(),
                should_return_token,
                signed: true,
            },
        );
        Ok(())
    }

    /// Close a channel that has never been closed, claiming nothing.
    ///
    /// Records `NO_CLAIM_NONCE` so any signed IOU can still contest it, and
    /// returns the whole balance to the user on settlement.
    ///
    /// # Errors
    /// - `ChannelNotFound`, `NotParticipant`
    /// - `ClaimAlreadyRecorded` if any close has ever been accepted
    /// - `ChannelNotOpen` if the channel is not Open
    pub fn close_without_signature<L: Ledger + ?Sized>(
        &mut self,
        ledger: &L,
        caller: Address,
        resource: Address,
    ) -> Result<()> {
        let block = current_block(ledger)?;
        let mut channel = self.load_for(caller, resource)?;
        if !channel.closed_nonce.is_zero() {
            return Err(VaultError::ClaimAlreadyRecorded(channel.closed_nonce));
        }
        let state = channel.state();
        if state != ChannelState::Open {
            return Err(VaultError::ChannelNotOpen { state });
        }

        let nonce = U256::from(constants::NO_CLAIM_NONCE);
        channel.amount_owed = U256::zero();
        channel.closed_nonce = nonce;
        channel.closed_block = block;
        channel.should_return_token = true;
        channel.settled = false;
        self.registry.commit(resource, channel)?;

        tracing::info!(
            resource = %resource.short(),
            caller = %caller.short(),
            block,
            "Channel closed without claim"
        );
        self.journal.record(
            block,
            resource,
            ChannelEvent::Closed {
                caller,
                nonce,
                amount: U256::zero(),
                should_return_token: true,
                signed: false,
            },
        );
        Ok(())
    }

    // ── Contest ─────────────────────────────────────────────────────

    /// Supersede the recorded claim with a higher-nonce IOU while the
    /// dispute window is open.
    ///
    /// `should_return_token` keeps the value chosen at close. The window
    /// stays anchored to the close unless
    /// [`EngineConfig::contest_extends_window`] is set.
    ///
    /// # Errors
    /// - `ChannelNotFound`, `NotParticipant`
    /// - `ChannelNotClosed` unless a close is pending
    /// - `DisputeWindowElapsed` once `block >= closed_block + timeout`
    /// - `StaleNonce`, `AmountExceedsBalance`
    /// - `MalformedSignature`, `SelfSigned`, `SignerMismatch`
    pub fn update_closed_channel<L: Ledger + ?Sized>(
        &mut self,
        ledger: &L,
        caller: Address,
        resource: Address,
        signed: &SignedIou,
    ) -> Result<()> {
        let block = current_block(ledger)?;
        let mut channel = self.load_for(caller, resource)?;
        let state = channel.state();
        if state != ChannelState::Closed {
            return Err(VaultError::ChannelNotClosed { state });
        }
        let deadline = channel.dispute_deadline();
        if block >= deadline {
            return Err(VaultError::DisputeWindowElapsed {
                deadline,
                current: block,
            });
        }
        self.check_claim(ledger, caller, resource, &channel, signed)?;

        channel.amount_owed = signed.amount();
        channel.closed_nonce = signed.nonce();
        if self.config.contest_extends_window {
            channel.closed_block = block;
        }
        let deadline = channel.dispute_deadline();
        self.registry.commit(resource, channel)?;

        tracing::info!(
            resource = %resource.short(),
            caller = %caller.short(),
            nonce = %signed.nonce(),
            amount = %signed.amount(),
            deadline,
            "Closed channel contested"
        );
        self.journal.record(
            block,
            resource,
            ChannelEvent::Contested {
                caller,
                nonce: signed.nonce(),
                amount: signed.amount(),
            },
        );
        Ok(())
    }

    // ── Settle ──────────────────────────────────────────────────────

    /// Pay out a closed channel once its dispute window has elapsed.
    ///
    /// The split is computed from the live balance: the recipient gets
    /// exactly the recorded claim and the remainder goes to the user or stays
    /// in custody per `should_return_token`. Both legs move in one ledger
    /// batch. A balance that shrank below the claim since the close is
    /// rejected, leaving the channel Closed.
    ///
    /// # Errors
    /// - `ChannelNotFound`, `NotParticipant`
    /// - `ChannelNotClosed` on an Open channel
    /// - `ChannelAlreadySettled` if this episode already paid out
    /// - `DisputeWindowActive` while `block < closed_block + timeout`
    /// - `AmountExceedsBalance` if the live balance is below the claim
    /// - `UnknownToken`, `TransferFailed`, `PayoutNotConserved`
    pub fn settle<L: Ledger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: Address,
        resource: Address,
    ) -> Result<Payout> {
        let block = current_block(ledger)?;
        let mut channel = self.load_for(caller, resource)?;
        let state = channel.state();
        if !state.can_transition_to(ChannelState::Settled) {
            return Err(match state {
                ChannelState::Settled => VaultError::ChannelAlreadySettled,
                _ => VaultError::ChannelNotClosed { state },
            });
        }
        let deadline = channel.dispute_deadline();
        if block < deadline {
            return Err(VaultError::DisputeWindowActive {
                deadline,
                current: block,
            });
        }

        let balance = ledger.balance_of(resource, self.custodian)?;
        let payout = Payout::compute(balance, channel.amount_owed, channel.should_return_token)
            .inspect_err(|_| {
                tracing::warn!(
                    resource = %resource.short(),
                    owed = %channel.amount_owed,
                    balance = %balance,
                    "Settle rejected: custodied balance below recorded claim"
                );
            })?;
        payout.verify()?;

        let transfers = payout.transfers(channel.recipient, channel.user);
        tracing::debug!(
            resource = %resource.short(),
            balance = %balance,
            legs = transfers.len(),
            "Submitting payout batch"
        );
        if !transfers.is_empty() {
            ledger.transfer_batch(resource, self.custodian, &transfers)?;
        }

        channel.amount_owed = U256::zero();
        channel.settled = true;
        self.registry.commit(resource, channel)?;

        tracing::info!(
            resource = %resource.short(),
            caller = %caller.short(),
            to_recipient = %payout.to_recipient,
            to_user = %payout.to_user,
            retained = %payout.retained,
            block,
            "Channel settled"
        );
        self.journal.record(
            block,
            resource,
            ChannelEvent::Settled {
                caller,
                to_recipient: payout.to_recipient,
                to_user: payout.to_user,
                retained: payout.retained,
            },
        );
        Ok(payout)
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Full record for `resource`; the zero record if unregistered.
    #[must_use]
    pub fn channel(&self, resource: Address) -> Channel {
        self.registry.get(resource)
    }

    /// Fixed-order snapshot for `resource`.
    #[must_use]
    pub fn channel_data(&self, resource: Address) -> ChannelData {
        self.registry.get(resource).data()
    }

    /// Journaled events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &EventRecord> {
        self.journal.iter()
    }

    #[must_use]
    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    #[must_use]
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn custodian(&self) -> Address {
        self.custodian
    }

    // ── Shared checks ───────────────────────────────────────────────

    /// Load `resource` and require `caller` to be its user or recipient.
    pub(crate) fn load_for(&self, caller: Address, resource: Address) -> Result<Channel> {
        let channel = self.registry.load(resource)?;
        if !channel.is_participant(caller) {
            tracing::warn!(
                resource = %resource.short(),
                caller = %caller.short(),
                "Rejected call from non-participant"
            );
            return Err(VaultError::NotParticipant { caller, resource });
        }
        Ok(channel)
    }

    /// Nonce ordering, live-balance bound, then signature.
    fn check_claim<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        caller: Address,
        resource: Address,
        channel: &Channel,
        signed: &SignedIou,
    ) -> Result<()> {
        if signed.nonce() <= channel.closed_nonce {
            return Err(VaultError::StaleNonce {
                supplied: signed.nonce(),
                recorded: channel.closed_nonce,
            });
        }
        let balance = ledger.balance_of(resource, self.custodian)?;
        if signed.amount() > balance {
            return Err(VaultError::AmountExceedsBalance {
                amount: signed.amount(),
                balance,
            });
        }
        self.verifier
            .verify(resource, signed, caller, channel.signer)
            .inspect_err(|e| {
                tracing::warn!(
                    resource = %resource.short(),
                    caller = %caller.short(),
                    nonce = %signed.nonce(),
                    error = %e,
                    "IOU signature rejected"
                );
            })
    }
}

/// Current block height; block 0 is reserved for "never closed".
pub(crate) fn current_block<L: Ledger + ?Sized>(ledger: &L) -> Result<u64> {
    match ledger.block_number() {
        0 => Err(VaultError::Internal(
            "ledger reports block 0; closes need a positive height".to_string(),
        )),
        block => Ok(block),
    }
}
