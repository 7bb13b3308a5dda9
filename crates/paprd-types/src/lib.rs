//! Foundation types for the PAPRD collateral-backed token ledger.
//!
//! Every other PAPRD crate depends on `paprd-types`.
//!
//! # Key Types
//!
//! - [`Address`] -- Account identity as supplied by the execution host
//! - [`CollateralType`] -- Kind of collateral backing an account's balance

pub mod address;
pub mod collateral;
pub mod error;

pub use address::Address;
pub use collateral::CollateralType;
pub use error::TypeError;
