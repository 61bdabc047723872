//! In-memory multi-mint token ledger with allowance-based transfers

use anchor_lang::prelude::Pubkey;
use std::collections::HashMap;
use tollgate::{FeeLedger, LedgerError, TransferReceipt};
use tracing::debug;

/// Descriptive token metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug)]
struct TokenState {
    metadata: TokenMetadata,
    total_supply: u128,
    balances: HashMap<Pubkey, u128>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(Pubkey, Pubkey), u128>,
}

impl TokenState {
    fn balance(&self, owner: &Pubkey) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn move_balance(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), LedgerError> {
        let available = self.balance(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

/// Token store holding any number of mints
#[derive(Debug, Default)]
pub struct TokenLedger {
    tokens: HashMap<Pubkey, TokenState>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_token(&mut self, token: Pubkey, metadata: TokenMetadata) -> Result<(), LedgerError> {
        if self.tokens.contains_key(&token) {
            return Err(LedgerError::TokenAlreadyExists(token));
        }
        debug!(%token, symbol = %metadata.symbol, "Token created");
        self.tokens.insert(
            token,
            TokenState {
                metadata,
                total_supply: 0,
                balances: HashMap::new(),
                allowances: HashMap::new(),
            },
        );
        Ok(())
    }

    pub fn metadata(&self, token: &Pubkey) -> Result<&TokenMetadata, LedgerError> {
        Ok(&self.token(token)?.metadata)
    }

    /// Issue new tokens to `to`
    pub fn mint(&mut self, token: &Pubkey, to: &Pubkey, amount: u128) -> Result<(), LedgerError> {
        let state = self.token_mut(token)?;
        let total_supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let balance = state
            .balance(to)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        state.total_supply = total_supply;
        state.balances.insert(*to, balance);
        debug!(%token, %to, amount, "Tokens minted");
        Ok(())
    }

    /// Set the allowance `owner` grants `spender`, replacing any previous one
    pub fn approve(
        &mut self,
        token: &Pubkey,
        owner: &Pubkey,
        spender: &Pubkey,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let state = self.token_mut(token)?;
        state.allowances.insert((*owner, *spender), amount);
        debug!(%token, %owner, %spender, amount, "Allowance approved");
        Ok(())
    }

    pub fn allowance(&self, token: &Pubkey, owner: &Pubkey, spender: &Pubkey) -> Result<u128, LedgerError> {
        Ok(self.token(token)?.allowance(owner, spender))
    }

    pub fn balance_of(&self, token: &Pubkey, owner: &Pubkey) -> Result<u128, LedgerError> {
        Ok(self.token(token)?.balance(owner))
    }

    pub fn total_supply(&self, token: &Pubkey) -> Result<u128, LedgerError> {
        Ok(self.token(token)?.total_supply)
    }

    /// Move the owner's own tokens
    pub fn transfer(
        &mut self,
        token: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.token_mut(token)?.move_balance(from, to, amount)
    }

    fn token(&self, token: &Pubkey) -> Result<&TokenState, LedgerError> {
        self.tokens.get(token).ok_or(LedgerError::UnknownToken(*token))
    }

    fn token_mut(&mut self, token: &Pubkey) -> Result<&mut TokenState, LedgerError> {
        self.tokens.get_mut(token).ok_or(LedgerError::UnknownToken(*token))
    }
}

impl FeeLedger for TokenLedger {
    fn transfer_from(
        &mut self,
        token: &Pubkey,
        spender: &Pubkey,
        owner: &Pubkey,
        recipient: &Pubkey,
        amount: u128,
    ) -> Result<TransferReceipt, LedgerError> {
        let state = self.token_mut(token)?;

        let allowance = state.allowance(owner, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                required: amount,
                available: allowance,
            });
        }

        // Balances move first so a failed move leaves the allowance intact
        state.move_balance(owner, recipient, amount)?;
        state.allowances.insert((*owner, *spender), allowance - amount);

        debug!(%token, %spender, %owner, %recipient, amount, "Transferred from allowance");
        Ok(TransferReceipt {
            token: *token,
            spender: *spender,
            owner: *owner,
            recipient: *recipient,
            amount,
        })
    }

    fn reverse(&mut self, receipt: &TransferReceipt) -> Result<(), LedgerError> {
        let state = self.token_mut(&receipt.token)?;

        let restored_allowance = state
            .allowance(&receipt.owner, &receipt.spender)
            .checked_add(receipt.amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        state
            .move_balance(&receipt.recipient, &receipt.owner, receipt.amount)
            .map_err(|_| LedgerError::InvalidReceipt)?;
        state
            .allowances
            .insert((receipt.owner, receipt.spender), restored_allowance);

        debug!(token = %receipt.token, owner = %receipt.owner, amount = receipt.amount, "Transfer reversed");
        Ok(())
    }
}
