pub mod change_fee_amount;
pub mod change_fee_destination;
pub mod forward;
pub mod initialize;

pub use change_fee_amount::ChangeFeeAmountParams;
pub use change_fee_destination::ChangeFeeDestinationParams;
pub use forward::Forwarded;
pub use initialize::InitializeParams;
