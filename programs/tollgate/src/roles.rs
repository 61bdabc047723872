use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub const CHANGE_AMOUNT_ROLE: &str = "CHANGE_AMOUNT_ROLE";
pub const CHANGE_DESTINATION_ROLE: &str = "CHANGE_DESTINATION_ROLE";

/// 32-byte role identifier, the SHA-256 digest of the role name
pub type RoleId = [u8; 32];

/// Capabilities a tollgate checks before mutating its fee settings
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Role {
    /// May change the fee amount
    ChangeAmount,
    /// May change the fee destination
    ChangeDestination,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::ChangeAmount => CHANGE_AMOUNT_ROLE,
            Role::ChangeDestination => CHANGE_DESTINATION_ROLE,
        }
    }

    pub fn id(&self) -> RoleId {
        Sha256::digest(self.name().as_bytes()).into()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
