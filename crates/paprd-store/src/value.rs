use std::fmt;

use paprd_types::{Address, CollateralType};
use serde::{Deserialize, Serialize};

/// A single value held under a store key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredValue {
    U64(u64),
    Bool(bool),
    Str(String),
    Collateral(CollateralType),
}

impl StoredValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::U64(_) => ValueKind::U64,
            Self::Bool(_) => ValueKind::Bool,
            Self::Str(_) => ValueKind::Str,
            Self::Collateral(_) => ValueKind::Collateral,
        }
    }

    /// Feed a canonical, kind-tagged encoding of this value to `hasher`.
    pub(crate) fn hash_into(&self, hasher: &mut blake3::Hasher) {
        match self {
            Self::U64(v) => {
                hasher.update(&[0]);
                hasher.update(&v.to_le_bytes());
            }
            Self::Bool(v) => {
                hasher.update(&[1, u8::from(*v)]);
            }
            Self::Str(s) => {
                hasher.update(&[2]);
                hasher.update(&(s.len() as u64).to_le_bytes());
                hasher.update(s.as_bytes());
            }
            Self::Collateral(ty) => {
                hasher.update(&[3, ty.code()]);
            }
        }
    }
}

/// Discriminant of a [`StoredValue`], used in mismatch errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    U64,
    Bool,
    Str,
    Collateral,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U64 => write!(f, "u64"),
            Self::Bool => write!(f, "bool"),
            Self::Str => write!(f, "string"),
            Self::Collateral => write!(f, "collateral type"),
        }
    }
}

/// A Rust type that maps onto exactly one [`ValueKind`].
pub trait StoreValue: Sized {
    const KIND: ValueKind;

    fn into_stored(self) -> StoredValue;

    /// Returns `None` when `value` is of another kind.
    fn from_stored(value: StoredValue) -> Option<Self>;
}

impl StoreValue for u64 {
    const KIND: ValueKind = ValueKind::U64;

    fn into_stored(self) -> StoredValue {
        StoredValue::U64(self)
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        match value {
            StoredValue::U64(v) => Some(v),
            _ => None,
        }
    }
}

impl StoreValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn into_stored(self) -> StoredValue {
        StoredValue::Bool(self)
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        match value {
            StoredValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl StoreValue for String {
    const KIND: ValueKind = ValueKind::Str;

    fn into_stored(self) -> StoredValue {
        StoredValue::Str(self)
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        match value {
            StoredValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl StoreValue for Address {
    const KIND: ValueKind = ValueKind::Str;

    fn into_stored(self) -> StoredValue {
        StoredValue::Str(self.into_string())
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        String::from_stored(value).map(Address::new)
    }
}

impl StoreValue for CollateralType {
    const KIND: ValueKind = ValueKind::Collateral;

    fn into_stored(self) -> StoredValue {
        StoredValue::Collateral(self)
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        match value {
            StoredValue::Collateral(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(StoredValue::U64(1).kind(), ValueKind::U64);
        assert_eq!(StoredValue::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(StoredValue::Str("x".into()).kind(), ValueKind::Str);
        assert_eq!(
            StoredValue::Collateral(CollateralType::Binom).kind(),
            ValueKind::Collateral
        );
    }

    #[test]
    fn from_stored_rejects_other_kinds() {
        assert_eq!(u64::from_stored(StoredValue::Bool(true)), None);
        assert_eq!(bool::from_stored(StoredValue::U64(1)), None);
        assert_eq!(
            CollateralType::from_stored(StoredValue::U64(0)),
            None
        );
    }

    #[test]
    fn address_is_stored_as_string() {
        let stored = Address::new("alice").into_stored();
        assert_eq!(stored, StoredValue::Str("alice".into()));
        assert_eq!(Address::from_stored(stored), Some(Address::new("alice")));
    }

    #[test]
    fn json_shape_is_externally_tagged() {
        let json = serde_json::to_string(&StoredValue::U64(42)).unwrap();
        assert_eq!(json, r#"{"u64":42}"#);
        let json = serde_json::to_string(&StoredValue::Collateral(CollateralType::Fiat)).unwrap();
        assert_eq!(json, r#"{"collateral":"Fiat"}"#);
    }
}
