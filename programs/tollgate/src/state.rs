use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};

/// Fee configuration of an initialized tollgate
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct TollgateConfig {
    /// Ledger mint the fee is charged in. Fixed at initialization.
    pub fee_token: Pubkey,
    /// Fee charged per forwarded action, zero disables charging
    pub fee_amount: u128,
    /// Recipient of collected fees
    pub fee_destination: Pubkey,
}

impl TollgateConfig {
    pub const SIZE: usize = 32 + // fee_token
        16 + // fee_amount
        32; // fee_destination

    pub fn forward_fee(&self) -> (Pubkey, u128) {
        (self.fee_token, self.fee_amount)
    }

    pub fn charges_fee(&self) -> bool {
        self.fee_amount > 0
    }
}

/// Where a tollgate instance is in its one-way lifecycle.
///
/// `Petrified` marks a template instance that exists only to be cloned; it can
/// never be initialized. `Initialized` carries the config so a null or missing
/// config is unrepresentable once configured.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Petrified,
    Initialized(TollgateConfig),
}

impl Lifecycle {
    pub fn config(&self) -> Option<&TollgateConfig> {
        match self {
            Lifecycle::Initialized(config) => Some(config),
            _ => None,
        }
    }

    pub(crate) fn config_mut(&mut self) -> Option<&mut TollgateConfig> {
        match self {
            Lifecycle::Initialized(config) => Some(config),
            _ => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, Lifecycle::Initialized(_))
    }

    pub fn is_petrified(&self) -> bool {
        matches!(self, Lifecycle::Petrified)
    }
}
