//! Tollgate
//!
//! A forwarder that charges a configurable fee in a ledger token before
//! handing an action script to an executor. Authorization, the ledger and the
//! executor are injected through the traits in [`interfaces`]; the tollgate
//! itself only owns its fee configuration.

pub mod error;
pub mod events;
pub mod instructions;
pub mod interfaces;
pub mod roles;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use error::{ExecutionError, LedgerError, Result, TollgateError};
pub use events::TollgateEvent;
pub use instructions::{
    ChangeFeeAmountParams, ChangeFeeDestinationParams, Forwarded, InitializeParams,
};
pub use interfaces::{ActionExecutor, AuthorizationOracle, FeeLedger, Forwarder, TransferReceipt};
pub use roles::{Role, RoleId, CHANGE_AMOUNT_ROLE, CHANGE_DESTINATION_ROLE};
pub use state::{Lifecycle, TollgateConfig};

use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};

// ================================
// Tollgate Instance
// ================================

/// A single tollgate instance and its fee configuration
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct Tollgate {
    /// Identity of this instance: the spender fee payers approve and the
    /// app the authorization oracle scopes roles to
    instance: Pubkey,
    lifecycle: Lifecycle,
}

impl Tollgate {
    /// Create an unconfigured instance awaiting `initialize`
    pub fn new(instance: Pubkey) -> Self {
        Self {
            instance,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Create a template instance that can never be initialized
    pub fn petrified(instance: Pubkey) -> Self {
        Self {
            instance,
            lifecycle: Lifecycle::Petrified,
        }
    }

    pub fn instance(&self) -> Pubkey {
        self.instance
    }

    pub fn config(&self) -> Option<&TollgateConfig> {
        self.lifecycle.config()
    }

    pub fn has_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    pub fn is_petrified(&self) -> bool {
        self.lifecycle.is_petrified()
    }

    pub fn fee_token(&self) -> Option<Pubkey> {
        self.config().map(|config| config.fee_token)
    }

    pub fn fee_amount(&self) -> Option<u128> {
        self.config().map(|config| config.fee_amount)
    }

    pub fn fee_destination(&self) -> Option<Pubkey> {
        self.config().map(|config| config.fee_destination)
    }

    // Entry points

    pub fn initialize(
        &mut self,
        fee_token: Pubkey,
        fee_amount: u128,
        fee_destination: Pubkey,
    ) -> Result<()> {
        instructions::initialize::handler(
            self,
            InitializeParams {
                fee_token,
                fee_amount,
                fee_destination,
            },
        )
    }

    pub fn change_fee_amount<O>(
        &mut self,
        oracle: &O,
        sender: &Pubkey,
        new_amount: u128,
    ) -> Result<TollgateEvent>
    where
        O: AuthorizationOracle + ?Sized,
    {
        instructions::change_fee_amount::handler(
            self,
            oracle,
            sender,
            ChangeFeeAmountParams { new_amount },
        )
    }

    pub fn change_fee_destination<O>(
        &mut self,
        oracle: &O,
        sender: &Pubkey,
        new_destination: Pubkey,
    ) -> Result<TollgateEvent>
    where
        O: AuthorizationOracle + ?Sized,
    {
        instructions::change_fee_destination::handler(
            self,
            oracle,
            sender,
            ChangeFeeDestinationParams { new_destination },
        )
    }

    pub fn forward<L, E>(
        &self,
        ledger: &mut L,
        executor: &mut E,
        sender: &Pubkey,
        payload: &[u8],
    ) -> Result<Forwarded>
    where
        L: FeeLedger + ?Sized,
        E: ActionExecutor + ?Sized,
    {
        instructions::forward::handler(self, ledger, executor, sender, payload)
    }
}

impl Forwarder for Tollgate {
    // Willingness to attempt: solvency is only checked when the fee is debited
    fn can_forward(&self, _sender: &Pubkey, _payload: &[u8]) -> bool {
        self.has_initialized()
    }

    fn forward_fee(&self) -> (Pubkey, u128) {
        self.config()
            .map_or((Pubkey::default(), 0), TollgateConfig::forward_fee)
    }
}

// ================================
// Tollgate Tests
// ================================
