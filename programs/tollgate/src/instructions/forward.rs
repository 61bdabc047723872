use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};
use tracing::{debug, error, info, warn};

use crate::error::{Result, TollgateError};
use crate::interfaces::{ActionExecutor, FeeLedger, TransferReceipt};
use crate::Tollgate;

/// Outcome of a successful forward
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct Forwarded {
    pub sender: Pubkey,
    /// The fee debit, absent when the tollgate charges nothing
    pub fee: Option<TransferReceipt>,
}

/// Charge the configured fee, then dispatch `payload`.
///
/// The debit and the dispatch form one unit of work: when the executor fails
/// after a fee was taken, the debit is reversed before the executor error is
/// returned. If the reversal itself fails the caller gets `FeeRefundFailed`
/// carrying both errors.
pub fn handler<L, E>(
    tollgate: &Tollgate,
    ledger: &mut L,
    executor: &mut E,
    sender: &Pubkey,
    payload: &[u8],
) -> Result<Forwarded>
where
    L: FeeLedger + ?Sized,
    E: ActionExecutor + ?Sized,
{
    let instance = tollgate.instance;
    let Some(config) = tollgate.config() else {
        warn!(%instance, %sender, "Forward attempted before initialization");
        return Err(TollgateError::CannotForward);
    };

    let fee = if config.charges_fee() {
        let receipt = ledger
            .transfer_from(
                &config.fee_token,
                &instance,
                sender,
                &config.fee_destination,
                config.fee_amount,
            )
            .map_err(|err| {
                warn!(%instance, %sender, %err, "Fee transfer reverted");
                TollgateError::FeeTransferReverted(err)
            })?;
        debug!(%instance, %sender, amount = receipt.amount, "Fee collected");
        Some(receipt)
    } else {
        None
    };

    if let Err(err) = executor.execute(sender, payload) {
        warn!(%instance, %sender, %err, "Action dispatch failed");
        if let Some(receipt) = &fee {
            if let Err(refund) = ledger.reverse(receipt) {
                error!(%instance, %sender, %refund, "Failed to reverse fee after dispatch failure");
                return Err(TollgateError::FeeRefundFailed {
                    dispatch: err,
                    refund,
                });
            }
        }
        return Err(err.into());
    }

    info!(
        %instance,
        %sender,
        fee = fee.map_or(0, |receipt| receipt.amount),
        "Action forwarded"
    );
    Ok(Forwarded {
        sender: *sender,
        fee,
    })
}
