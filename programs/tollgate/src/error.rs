use anchor_lang::prelude::Pubkey;
use thiserror::Error;

// ================================
// Tollgate Error Types
// ================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TollgateError {
    #[error("Tollgate has already been initialized")]
    AlreadyInitialized,

    #[error("Fee token cannot be the null address")]
    InvalidFeeToken,

    #[error("Fee destination is null or unchanged")]
    InvalidFeeDestination,

    #[error("Fee amount is unchanged")]
    InvalidFeeAmount,

    #[error("Sender is not authorized to perform this operation")]
    AuthorizationFailed,

    #[error("Tollgate cannot forward before it is initialized")]
    CannotForward,

    #[error("Fee transfer reverted: {0}")]
    FeeTransferReverted(#[source] LedgerError),

    /// Dispatch failed and the fee debit could not be undone; the fee stays
    /// with the destination.
    #[error("Dispatch failed ({dispatch}) and the fee refund failed ({refund})")]
    FeeRefundFailed {
        dispatch: ExecutionError,
        refund: LedgerError,
    },

    /// Executor failures pass through untouched.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl TollgateError {
    /// Stable reason code, matching the revert reasons hosts key on.
    pub fn code(&self) -> &'static str {
        match self {
            TollgateError::AlreadyInitialized => "INIT_ALREADY_INITIALIZED",
            TollgateError::InvalidFeeToken => "TOLLGATE_INVALID_FEE_TOKEN",
            TollgateError::InvalidFeeDestination => "TOLLGATE_INVALID_FEE_DESTINATION",
            TollgateError::InvalidFeeAmount => "TOLLGATE_INVALID_FEE_AMOUNT",
            TollgateError::AuthorizationFailed => "APP_AUTH_FAILED",
            TollgateError::CannotForward => "TOLLGATE_CAN_NOT_FORWARD",
            TollgateError::FeeTransferReverted(_) => "TOLLGATE_FEE_TRANSFER_REVERTED",
            TollgateError::FeeRefundFailed { .. } => "TOLLGATE_FEE_REFUND_FAILED",
            TollgateError::Execution(err) => err.code(),
        }
    }
}

// ================================
// Collaborator Error Types
// ================================

/// Failures reported by a fee ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unknown token: {0}")]
    UnknownToken(Pubkey),

    #[error("Token already exists: {0}")]
    TokenAlreadyExists(Pubkey),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("Insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: u128, available: u128 },

    #[error("Arithmetic operation overflowed")]
    ArithmeticOverflow,

    #[error("Transfer receipt does not match ledger state")]
    InvalidReceipt,
}

/// Failures reported by an action executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Malformed script: {0}")]
    MalformedScript(String),

    #[error("Unsupported script version: {0}")]
    UnsupportedScriptVersion(u32),

    #[error("No execution target registered at {0}")]
    UnknownTarget(Pubkey),

    #[error("Execution target {target} reverted: {reason}")]
    TargetReverted { target: Pubkey, reason: String },
}

impl ExecutionError {
    pub fn code(&self) -> &'static str {
        match self {
            ExecutionError::MalformedScript(_) => "EXECUTOR_MALFORMED_SCRIPT",
            ExecutionError::UnsupportedScriptVersion(_) => "EXECUTOR_UNAVAILABLE",
            ExecutionError::UnknownTarget(_) => "EXECUTOR_UNKNOWN_TARGET",
            ExecutionError::TargetReverted { .. } => "EXECUTOR_CALL_REVERTED",
        }
    }
}

pub type Result<T> = std::result::Result<T, TollgateError>;
