use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};
use tracing::{info, warn};

use crate::error::{Result, TollgateError};
use crate::events::TollgateEvent;
use crate::interfaces::AuthorizationOracle;
use crate::roles::Role;
use crate::Tollgate;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct ChangeFeeAmountParams {
    /// The new fee amount, zero disables charging
    pub new_amount: u128,
}

pub fn handler<O>(
    tollgate: &mut Tollgate,
    oracle: &O,
    sender: &Pubkey,
    params: ChangeFeeAmountParams,
) -> Result<TollgateEvent>
where
    O: AuthorizationOracle + ?Sized,
{
    let instance = tollgate.instance;

    // No principal holds a role on an unconfigured instance
    if !tollgate.has_initialized() || !oracle.may_perform(sender, &instance, Role::ChangeAmount) {
        warn!(%instance, %sender, role = %Role::ChangeAmount, "Authorization failed");
        return Err(TollgateError::AuthorizationFailed);
    }

    let config = tollgate
        .lifecycle
        .config_mut()
        .ok_or(TollgateError::AuthorizationFailed)?;

    if params.new_amount == config.fee_amount {
        return Err(TollgateError::InvalidFeeAmount);
    }

    let previous_amount = config.fee_amount;
    config.fee_amount = params.new_amount;

    info!(%instance, previous_amount, new_amount = params.new_amount, "Fee amount changed");
    Ok(TollgateEvent::ChangeFeeAmount {
        previous_amount,
        new_amount: params.new_amount,
    })
}
