//! Native-currency conversion.
//!
//! Native currency sent to the custodian sits outside every channel until
//! the recipient of the wrapped-native channel converts it. The conversion
//! is authorized by a zero IOU (`nonce == 0 && amount == 0`) from the
//! channel's signer, so it can never be mistaken for a payment claim.

use iouvault_types::{Address, AddressExt, ChannelEvent, Result, SignedIou, U256, VaultError};

use crate::engine::current_block;
use crate::{NativeWrapper, SettlementEngine};

impl SettlementEngine {
    /// Wrap the custodian's native balance into the `resource` channel.
    ///
    /// `amount` is how much native currency to convert; zero converts all
    /// of it. Returns the amount converted.
    ///
    /// # Errors
    /// - `ChannelNotFound`
    /// - `NotRecipient` unless `caller` is the channel's recipient
    /// - `NonZeroIou` if the IOU carries a nonce or amount
    /// - `MalformedSignature`, `SelfSigned`, `SignerMismatch`
    /// - `NotWrappedNative` if `resource` is not the wrapped-native token
    /// - `NothingToConvert` if the request exceeds the native balance or
    ///   there is nothing to wrap
    pub fn deposit_native<L: NativeWrapper + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: Address,
        resource: Address,
        signed: &SignedIou,
        amount: U256,
    ) -> Result<U256> {
        let block = current_block(ledger)?;
        let channel = self.registry.load(resource)?;
        if caller != channel.recipient {
            return Err(VaultError::NotRecipient { caller });
        }
        if !signed.iou.is_zero() {
            return Err(VaultError::NonZeroIou {
                nonce: signed.nonce(),
                amount: signed.amount(),
            });
        }
        self.verifier
            .verify(resource, signed, caller, channel.signer)?;

        let wrapped = ledger.wrapped_native();
        if resource != wrapped {
            return Err(VaultError::NotWrappedNative { resource, wrapped });
        }

        let available = ledger.native_balance(self.custodian);
        let converted = if amount.is_zero() { available } else { amount };
        if converted.is_zero() || converted > available {
            return Err(VaultError::NothingToConvert {
                requested: amount,
                available,
            });
        }
        ledger.wrap(self.custodian, converted)?;

        tracing::info!(
            resource = %resource.short(),
            caller = %caller.short(),
            amount = %converted,
            block,
            "Native currency wrapped into channel"
        );
        self.journal.record(
            block,
            resource,
            ChannelEvent::NativeDeposited { amount: converted },
        );
        Ok(converted)
    }
}
