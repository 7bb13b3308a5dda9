use thiserror::Error;

/// Errors produced when parsing foundation types from user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown collateral type: {0}")]
    UnknownCollateralType(String),
}
