//! The custodied-resource capability.
//!
//! The engine never tracks balances itself. Everything it knows about
//! money and time comes through [`Ledger`], so it cannot drift from the
//! ground truth of a token whose supply moves on its own (burns, rebases,
//! fees on transfer).

use iouvault_types::{Address, Result, U256};
use serde::{Deserialize, Serialize};

/// One leg of a payout batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub to: Address,
    pub amount: U256,
}

/// Host ledger: block height and fungible-token balances.
pub trait Ledger {
    /// Current block height.
    fn block_number(&self) -> u64;

    /// Live balance of `holder` in `token`.
    ///
    /// # Errors
    /// Returns [`iouvault_types::VaultError::UnknownToken`] if the ledger
    /// has no such token.
    fn balance_of(&self, token: Address, holder: Address) -> Result<U256>;

    /// Move every leg of `transfers` out of `from`, or none of them.
    ///
    /// # Errors
    /// Any error leaves every balance unchanged.
    fn transfer_batch(&mut self, token: Address, from: Address, transfers: &[Transfer])
    -> Result<()>;

    /// Move `amount` of `token` from `from` to `to`.
    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        self.transfer_batch(token, from, &[Transfer { to, amount }])
    }
}

/// Native currency and its wrapped-token adapter.
pub trait NativeWrapper: Ledger {
    /// Address of the wrapped native token.
    fn wrapped_native(&self) -> Address;

    /// Native-currency balance of `holder`.
    fn native_balance(&self, holder: Address) -> U256;

    /// Convert `amount` of `holder`'s native currency into wrapped tokens
    /// credited to `holder`.
    ///
    /// # Errors
    /// Any error leaves both balances unchanged.
    fn wrap(&mut self, holder: Address, amount: U256) -> Result<()>;
}
