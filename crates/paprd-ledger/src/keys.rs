//! Storage key layout.
//!
//! Keys are a fixed prefix followed by an address and/or a collateral code.
//! The layout is shared with existing state files and must stay stable.

use paprd_types::{Address, CollateralType};

pub const OWNER: &str = "owner";
pub const TOTAL_SUPPLY: &str = "totalSupply";
pub const PAUSED: &str = "paused";
pub const COLLATERAL_RATIO: &str = "collateral_ratio";
pub const FIAT_RESERVE: &str = "fiat_reserve";
pub const BINOM_TOKEN_ADDRESS: &str = "binom_token_address";

pub const BALANCE_PREFIX: &str = "balance_";
pub const BLACKLIST_PREFIX: &str = "blacklist_";
pub const MINTER_PREFIX: &str = "minter_";
pub const COLLATERAL_PREFIX: &str = "collateral_";
pub const COLLATERAL_TYPE_PREFIX: &str = "collateral_type_";

pub fn balance(address: &Address) -> String {
    format!("{BALANCE_PREFIX}{address}")
}

pub fn blacklist(address: &Address) -> String {
    format!("{BLACKLIST_PREFIX}{address}")
}

pub fn minter(address: &Address) -> String {
    format!("{MINTER_PREFIX}{address}")
}

pub fn collateral(address: &Address, collateral_type: CollateralType) -> String {
    format!("{COLLATERAL_PREFIX}{}_{address}", collateral_type.code())
}

pub fn collateral_type(address: &Address) -> String {
    format!("{COLLATERAL_TYPE_PREFIX}{address}")
}

/// Split a per-account collateral key into its type and address.
///
/// Returns `None` for every other key, including `collateral_ratio` and
/// `collateral_type_*`.
pub fn parse_collateral(key: &str) -> Option<(CollateralType, Address)> {
    if key.starts_with(COLLATERAL_TYPE_PREFIX) {
        return None;
    }
    let rest = key.strip_prefix(COLLATERAL_PREFIX)?;
    let (code, address) = rest.split_once('_')?;
    let ty = CollateralType::from_code(code.parse().ok()?)?;
    Some((ty, Address::new(address)))
}
