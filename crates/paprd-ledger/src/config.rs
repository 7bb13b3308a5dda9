use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Lowest collateral ratio the ledger accepts, in percent.
pub const MIN_COLLATERAL_RATIO: u64 = 100;

/// Ratio reported when none has been stored yet, in percent.
pub const DEFAULT_COLLATERAL_RATIO: u64 = 150;

/// Configuration for a [`Ledger`](crate::Ledger).
///
/// Only `initial_collateral_ratio` touches state, and only once: it is the
/// ratio written by the first initialization. Everything afterwards lives in
/// the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Collateral ratio written at initialization, in percent.
    pub initial_collateral_ratio: u64,
    /// Descriptive token metadata served by the read API.
    pub token: TokenMetadata,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_collateral_ratio: DEFAULT_COLLATERAL_RATIO,
            token: TokenMetadata::default(),
        }
    }
}

impl LedgerConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.initial_collateral_ratio < MIN_COLLATERAL_RATIO {
            return Err(LedgerError::Config(format!(
                "initial_collateral_ratio must be at least {MIN_COLLATERAL_RATIO}, got {}",
                self.initial_collateral_ratio
            )));
        }
        if self.token.symbol.trim().is_empty() {
            return Err(LedgerError::Config("token.symbol must not be empty".into()));
        }
        Ok(())
    }
}

/// Name, symbol, and display precision of the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "Paper Dollar Stablecoin".into(),
            symbol: "PAPRD".into(),
            decimals: 18,
        }
    }
}
