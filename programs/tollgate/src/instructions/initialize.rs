use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};
use tracing::info;

use crate::error::{Result, TollgateError};
use crate::state::{Lifecycle, TollgateConfig};
use crate::Tollgate;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitializeParams {
    /// The ledger mint fees are charged in
    pub fee_token: Pubkey,
    /// The fee charged per forwarded action (zero for none)
    pub fee_amount: u128,
    /// The account collected fees are sent to
    pub fee_destination: Pubkey,
}

pub fn handler(tollgate: &mut Tollgate, params: InitializeParams) -> Result<()> {
    // Petrified templates and configured instances both reject here
    if !matches!(tollgate.lifecycle, Lifecycle::Uninitialized) {
        return Err(TollgateError::AlreadyInitialized);
    }

    if params.fee_token == Pubkey::default() {
        return Err(TollgateError::InvalidFeeToken);
    }

    if params.fee_destination == Pubkey::default() {
        return Err(TollgateError::InvalidFeeDestination);
    }

    tollgate.lifecycle = Lifecycle::Initialized(TollgateConfig {
        fee_token: params.fee_token,
        fee_amount: params.fee_amount,
        fee_destination: params.fee_destination,
    });

    info!(
        instance = %tollgate.instance,
        fee_token = %params.fee_token,
        fee_amount = params.fee_amount,
        fee_destination = %params.fee_destination,
        "Tollgate initialized"
    );
    Ok(())
}
