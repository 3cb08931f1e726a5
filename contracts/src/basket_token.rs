//! Basket Token Contract
//!
//! CEP-18 style token representing one basket's synthetic debt. Transfers
//! and allowances are open; minting and burning are reserved for the
//! collateral vault, which holds the only mint/burn capability.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::ProtocolError;

/// Basket Token Contract
#[odra::module]
pub struct BasketToken {
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Decimals (18, matching the protocol's WAD scale)
    decimals: Var<u8>,
    /// Total supply
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner -> spender -> amount)
    allowances: Mapping<(Address, Address), U256>,
    /// Collateral vault address (sole mint/burn authority)
    vault: Var<Address>,
}

#[odra::module]
impl BasketToken {
    /// Initialize the token
    pub fn init(&mut self, name: String, symbol: String, vault: Address) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(18);
        self.total_supply.set(U256::zero());
        self.vault.set(vault);
    }

    // ========== Standard Token Functions ==========

    /// Get token name
    pub fn name(&self) -> String {
        self.name.get().unwrap_or_default()
    }

    /// Get token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get().unwrap_or_default()
    }

    /// Get decimals
    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(18)
    }

    /// Get total supply
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    /// Get balance of an account
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    /// Get allowance for spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Transfer tokens to recipient
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    /// Approve spender to spend tokens
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        true
    }

    /// Transfer tokens from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(ProtocolError::InsufficientAllowance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.allowances.set(&(owner, spender), current_allowance - amount);
        true
    }

    // ========== Vault Functions (Restricted) ==========

    /// Mint tokens against freshly opened debt (vault only)
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.require_vault();

        let balance = self.balance_of(to);
        self.balances.set(&to, balance + amount);
        self.total_supply.set(self.total_supply() + amount);
    }

    /// Burn tokens on debt repayment (vault only)
    pub fn burn_from(&mut self, from: Address, amount: U256) {
        self.require_vault();

        let balance = self.balance_of(from);
        if balance < amount {
            self.env().revert(ProtocolError::InsufficientTokenBalance);
        }
        self.balances.set(&from, balance - amount);
        self.total_supply.set(self.total_supply() - amount);
    }

    /// Get the vault address
    pub fn get_vault(&self) -> Option<Address> {
        self.vault.get()
    }

    // ========== Internal Functions ==========

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(ProtocolError::InsufficientTokenBalance);
        }
        self.balances.set(&from, from_balance - amount);
        self.balances.set(&to, self.balance_of(to) + amount);
    }

    fn require_vault(&self) {
        let caller = self.env().caller();
        let is_vault = self.vault.get().map_or(false, |vault| vault == caller);
        if !is_vault {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }
}
