use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};
use tracing::{info, warn};

use crate::error::{Result, TollgateError};
use crate::events::TollgateEvent;
use crate::interfaces::AuthorizationOracle;
use crate::roles::Role;
use crate::Tollgate;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct ChangeFeeDestinationParams {
    /// The account future fees are sent to
    pub new_destination: Pubkey,
}

pub fn handler<O>(
    tollgate: &mut Tollgate,
    oracle: &O,
    sender: &Pubkey,
    params: ChangeFeeDestinationParams,
) -> Result<TollgateEvent>
where
    O: AuthorizationOracle + ?Sized,
{
    let instance = tollgate.instance;

    if !tollgate.has_initialized()
        || !oracle.may_perform(sender, &instance, Role::ChangeDestination)
    {
        warn!(%instance, %sender, role = %Role::ChangeDestination, "Authorization failed");
        return Err(TollgateError::AuthorizationFailed);
    }

    let config = tollgate
        .lifecycle
        .config_mut()
        .ok_or(TollgateError::AuthorizationFailed)?;

    // Null and unchanged destinations share one error kind
    if params.new_destination == Pubkey::default()
        || params.new_destination == config.fee_destination
    {
        return Err(TollgateError::InvalidFeeDestination);
    }

    let previous_destination = config.fee_destination;
    config.fee_destination = params.new_destination;

    info!(
        %instance,
        %previous_destination,
        new_destination = %params.new_destination,
        "Fee destination changed"
    );
    Ok(TollgateEvent::ChangeFeeDestination {
        previous_destination,
        new_destination: params.new_destination,
    })
}
