//! In-memory [`Ledger`] for tests and local simulation.
//!
//! Tokens are plain balance maps with a tracked total supply. Blocks only
//! advance when told to. A per-token switch makes every transfer fail, for
//! exercising fail-atomic paths.

use std::collections::HashMap;

use iouvault_types::{Address, Result, U256, VaultError};

use crate::{Ledger, NativeWrapper, Transfer};

#[derive(Debug, Default)]
struct TokenState {
    balances: HashMap<Address, U256>,
    total_supply: U256,
    transfers_blocked: bool,
}

/// Deterministic in-memory ledger with a wrapped-native token.
#[derive(Debug)]
pub struct MemoryLedger {
    block: u64,
    tokens: HashMap<Address, TokenState>,
    native: HashMap<Address, U256>,
    wrapped_native: Address,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    /// Ledger at block 1 with the wrapped-native token deployed.
    #[must_use]
    pub fn new() -> Self {
        let wrapped_native = Address::repeat_byte(0xee);
        let mut tokens = HashMap::new();
        tokens.insert(wrapped_native, TokenState::default());
        Self {
            block: 1,
            tokens,
            native: HashMap::new(),
            wrapped_native,
        }
    }

    /// Deploy an empty token (zero supply). No-op if already deployed.
    pub fn deploy_token(&mut self, token: Address) {
        self.tokens.entry(token).or_default();
    }

    /// Create `amount` of `token` in `holder`'s balance.
    ///
    /// # Errors
    /// `UnknownToken` if `token` is not deployed; `Internal` on overflow.
    pub fn mint(&mut self, token: Address, holder: Address, amount: U256) -> Result<()> {
        let state = self.token_mut(token)?;
        let supply = state
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| VaultError::Internal("token supply overflow".to_string()))?;
        state.total_supply = supply;
        *state.balances.entry(holder).or_default() += amount;
        Ok(())
    }

    /// Destroy `amount` of `holder`'s `token`.
    ///
    /// # Errors
    /// `UnknownToken`, or `TransferFailed` if the balance is too small.
    pub fn burn(&mut self, token: Address, holder: Address, amount: U256) -> Result<()> {
        let state = self.token_mut(token)?;
        let balance = state.balances.entry(holder).or_default();
        if *balance < amount {
            return Err(VaultError::TransferFailed {
                reason: format!("burn of {amount} exceeds balance {balance}"),
            });
        }
        *balance -= amount;
        state.total_supply -= amount;
        Ok(())
    }

    /// Total supply of `token`; zero if not deployed.
    #[must_use]
    pub fn total_supply(&self, token: Address) -> U256 {
        self.tokens
            .get(&token)
            .map_or_else(U256::zero, |s| s.total_supply)
    }

    /// Balance of `holder` in `token`; zero if either is unknown.
    #[must_use]
    pub fn balance(&self, token: Address, holder: Address) -> U256 {
        self.balance_of(token, holder).unwrap_or_default()
    }

    /// Make every transfer of `token` fail (or succeed again).
    pub fn set_transfers_blocked(&mut self, token: Address, blocked: bool) {
        self.tokens.entry(token).or_default().transfers_blocked = blocked;
    }

    pub fn advance_blocks(&mut self, n: u64) {
        self.block = self.block.saturating_add(n);
    }

    pub fn set_block(&mut self, block: u64) {
        self.block = block;
    }

    /// Credit native currency to `holder`, as a plain value send would.
    pub fn receive_native(&mut self, holder: Address, amount: U256) {
        let balance = self.native.entry(holder).or_default();
        *balance = balance.saturating_add(amount);
    }

    fn token_mut(&mut self, token: Address) -> Result<&mut TokenState> {
        self.tokens
            .get_mut(&token)
            .ok_or(VaultError::UnknownToken(token))
    }
}

impl Ledger for MemoryLedger {
    fn block_number(&self) -> u64 {
        self.block
    }

    fn balance_of(&self, token: Address, holder: Address) -> Result<U256> {
        let state = self
            .tokens
            .get(&token)
            .ok_or(VaultError::UnknownToken(token))?;
        Ok(state.balances.get(&holder).copied().unwrap_or_default())
    }

    fn transfer_batch(
        &mut self,
        token: Address,
        from: Address,
        transfers: &[Transfer],
    ) -> Result<()> {
        let state = self.token_mut(token)?;
        if state.transfers_blocked {
            return Err(VaultError::TransferFailed {
                reason: format!("transfers of {token:?} are blocked"),
            });
        }

        let total = transfers
            .iter()
            .try_fold(U256::zero(), |acc, t| acc.checked_add(t.amount))
            .ok_or_else(|| VaultError::TransferFailed {
                reason: "batch total overflows".to_string(),
            })?;
        let available = state.balances.get(&from).copied().unwrap_or_default();
        if total > available {
            return Err(VaultError::TransferFailed {
                reason: format!("batch of {total} exceeds balance {available}"),
            });
        }

        for t in transfers {
            *state.balances.entry(from).or_default() -= t.amount;
            *state.balances.entry(t.to).or_default() += t.amount;
        }
        Ok(())
    }
}

impl NativeWrapper for MemoryLedger {
    fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    fn native_balance(&self, holder: Address) -> U256 {
        self.native.get(&holder).copied().unwrap_or_default()
    }

    fn wrap(&mut self, holder: Address, amount: U256) -> Result<()> {
        let available = self.native_balance(holder);
        if amount > available {
            return Err(VaultError::TransferFailed {
                reason: format!("wrap of {amount} exceeds native balance {available}"),
            });
        }
        self.mint(self.wrapped_native, holder, amount)?;
        self.native.insert(holder, available - amount);
        Ok(())
    }
}
