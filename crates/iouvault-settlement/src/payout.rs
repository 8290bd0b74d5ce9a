//! Payout computation and conservation check.
//!
//! Invariant enforced before any value moves:
//! ```text
//! to_recipient + to_user + retained == live balance
//! ```
//!
//! The split is always computed from the balance read at settle time. The
//! recipient is paid exactly the recorded claim; if the custodied balance
//! shrank below it since the close (a burn, a rebase), no split exists.

use iouvault_types::{Address, Result, U256, VaultError};
use serde::{Deserialize, Serialize};

use crate::Transfer;

/// How one settlement splits the live custodied balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Live balance the split was computed from.
    pub balance: U256,
    /// Paid to the recipient: exactly the recorded claim.
    pub to_recipient: U256,
    /// Paid back to the user when the close asked for it.
    pub to_user: U256,
    /// Left in custody.
    pub retained: U256,
}

impl Payout {
    /// Split `balance` for a claim of `owed`.
    ///
    /// # Errors
    /// Returns [`VaultError::AmountExceedsBalance`] if `owed > balance`.
    pub fn compute(balance: U256, owed: U256, should_return_token: bool) -> Result<Self> {
        if owed > balance {
            return Err(VaultError::AmountExceedsBalance {
                amount: owed,
                balance,
            });
        }
        let remainder = balance - owed;
        let (to_user, retained) = if should_return_token {
            (remainder, U256::zero())
        } else {
            (U256::zero(), remainder)
        };
        Ok(Self {
            balance,
            to_recipient: owed,
            to_user,
            retained,
        })
    }

    /// Total leaving custody.
    #[must_use]
    pub fn paid_out(&self) -> U256 {
        self.to_recipient.saturating_add(self.to_user)
    }

    /// Check the split adds up to the balance exactly.
    ///
    /// # Errors
    /// Returns [`VaultError::PayoutNotConserved`] on overflow or mismatch.
    pub fn verify(&self) -> Result<()> {
        let total = self
            .to_recipient
            .checked_add(self.to_user)
            .and_then(|sum| sum.checked_add(self.retained))
            .ok_or_else(|| VaultError::PayoutNotConserved {
                reason: "payout legs overflow".to_string(),
            })?;
        if total != self.balance {
            return Err(VaultError::PayoutNotConserved {
                reason: format!(
                    "recipient {} + user {} + retained {} != balance {}",
                    self.to_recipient, self.to_user, self.retained, self.balance
                ),
            });
        }
        Ok(())
    }

    /// Ledger legs for this payout, skipping zero amounts.
    #[must_use]
    pub fn transfers(&self, recipient: Address, user: Address) -> Vec<Transfer> {
        [(recipient, self.to_recipient), (user, self.to_user)]
            .into_iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(to, amount)| Transfer { to, amount })
            .collect()
    }
}
