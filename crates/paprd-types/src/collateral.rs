use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Kind of collateral backing an account's token balance.
///
/// Each account has exactly one active collateral type at a time. The
/// numeric code is part of the storage key layout and must not change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollateralType {
    /// Fiat deposits, aggregated into the global fiat reserve.
    #[default]
    Fiat,
    /// The non-fiat collateral asset (the BINOM token).
    Binom,
}

impl CollateralType {
    pub const ALL: [CollateralType; 2] = [CollateralType::Fiat, CollateralType::Binom];

    /// Stable numeric code used in storage keys.
    pub fn code(self) -> u8 {
        match self {
            Self::Fiat => 0,
            Self::Binom => 1,
        }
    }

    /// Inverse of [`CollateralType::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Fiat),
            1 => Some(Self::Binom),
            _ => None,
        }
    }

    pub fn is_fiat(self) -> bool {
        matches!(self, Self::Fiat)
    }
}

impl fmt::Display for CollateralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fiat => write!(f, "FIAT"),
            Self::Binom => write!(f, "BINOM"),
        }
    }
}

impl FromStr for CollateralType {
    type Err = TypeError;

    /// Accepts the name (`fiat`, `binom`, or the generic `other`) in any
    /// case, or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fiat" | "0" => Ok(Self::Fiat),
            "binom" | "other" | "1" => Ok(Self::Binom),
            other => Err(TypeError::UnknownCollateralType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(CollateralType::Fiat.code(), 0);
        assert_eq!(CollateralType::Binom.code(), 1);
        for ty in CollateralType::ALL {
            assert_eq!(CollateralType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(CollateralType::from_code(7), None);
    }

    #[test]
    fn default_is_fiat() {
        assert_eq!(CollateralType::default(), CollateralType::Fiat);
        assert!(CollateralType::default().is_fiat());
    }

    #[test]
    fn parse_names_and_codes() {
        assert_eq!("FIAT".parse::<CollateralType>(), Ok(CollateralType::Fiat));
        assert_eq!("binom".parse::<CollateralType>(), Ok(CollateralType::Binom));
        assert_eq!("Other".parse::<CollateralType>(), Ok(CollateralType::Binom));
        assert_eq!("1".parse::<CollateralType>(), Ok(CollateralType::Binom));
        assert!(matches!(
            "gold".parse::<CollateralType>(),
            Err(TypeError::UnknownCollateralType(_))
        ));
    }

    #[test]
    fn display_is_uppercase() {
        assert_eq!(CollateralType::Fiat.to_string(), "FIAT");
        assert_eq!(CollateralType::Binom.to_string(), "BINOM");
    }
}
