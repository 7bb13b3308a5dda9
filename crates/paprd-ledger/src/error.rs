use paprd_store::StoreError;
use paprd_types::Address;

/// Why an operation was rejected.
///
/// Every variant is raised before the operation writes anything, except
/// [`LedgerError::Store`], which can also surface from a failed write.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("unauthorized: caller {caller} may not perform this operation")]
    Unauthorized { caller: Address },

    #[error("contract is paused")]
    ContractPaused,

    #[error("address is blacklisted: {address}")]
    AddressBlacklisted { address: Address },

    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: u64, requested: u64 },

    #[error("insufficient collateral: available {available}, required {required}")]
    InsufficientCollateral { available: u64, required: u64 },

    #[error(
        "collateral ratio would be too low: {remaining} remaining for balance {balance} at {ratio}%"
    )]
    RatioViolation {
        remaining: u64,
        balance: u64,
        ratio: u64,
    },

    #[error("collateral ratio must be at least 100%, got {0}%")]
    InvalidRatio(u64),

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Stable, machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "Unauthorized",
            Self::ContractPaused => "ContractPaused",
            Self::AddressBlacklisted { .. } => "AddressBlacklisted",
            Self::InsufficientBalance { .. } => "InsufficientBalance",
            Self::InsufficientCollateral { .. } => "InsufficientCollateral",
            Self::RatioViolation { .. } => "RatioViolation",
            Self::InvalidRatio(_) => "InvalidRatio",
            Self::ArithmeticOverflow => "ArithmeticOverflow",
            Self::ArithmeticUnderflow => "ArithmeticUnderflow",
            Self::Store(_) => "Store",
            Self::Config(_) => "Config",
        }
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
