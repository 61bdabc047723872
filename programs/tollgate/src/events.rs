use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};

/// Change notifications emitted by successful fee mutations
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub enum TollgateEvent {
    ChangeFeeAmount {
        previous_amount: u128,
        new_amount: u128,
    },
    ChangeFeeDestination {
        previous_destination: Pubkey,
        new_destination: Pubkey,
    },
}
