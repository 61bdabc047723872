//! Narrow interfaces a tollgate consumes and exposes.

use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};

use crate::error::{ExecutionError, LedgerError};
use crate::roles::Role;

// ================================
// Consumed Interfaces
// ================================

/// Answers whether a principal may perform a role on a given instance.
pub trait AuthorizationOracle {
    fn may_perform(&self, principal: &Pubkey, instance: &Pubkey, role: Role) -> bool;
}

/// Record of a committed allowance-based debit, enough to compensate it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct TransferReceipt {
    pub token: Pubkey,
    pub spender: Pubkey,
    pub owner: Pubkey,
    pub recipient: Pubkey,
    pub amount: u128,
}

/// Token store supporting allowance-gated debits.
pub trait FeeLedger {
    /// Move `amount` of `token` from `owner` to `recipient`, consuming the
    /// allowance `owner` granted to `spender`.
    fn transfer_from(
        &mut self,
        token: &Pubkey,
        spender: &Pubkey,
        owner: &Pubkey,
        recipient: &Pubkey,
        amount: u128,
    ) -> Result<TransferReceipt, LedgerError>;

    /// Undo a debit returned by `transfer_from`, restoring both balances and
    /// the consumed allowance.
    fn reverse(&mut self, receipt: &TransferReceipt) -> Result<(), LedgerError>;
}

/// Runs an encoded action script on behalf of a sender.
pub trait ActionExecutor {
    fn execute(&mut self, sender: &Pubkey, payload: &[u8]) -> Result<(), ExecutionError>;
}

// ================================
// Exposed Interfaces
// ================================

/// Capability surface hosts query before routing an action through a forwarder.
pub trait Forwarder {
    fn is_forwarder(&self) -> bool {
        true
    }

    fn can_forward(&self, sender: &Pubkey, payload: &[u8]) -> bool;

    /// Token and amount charged per forward; `(Pubkey::default(), 0)` when
    /// nothing is configured.
    fn forward_fee(&self) -> (Pubkey, u128);
}
