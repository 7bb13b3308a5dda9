use std::collections::BTreeMap;
use std::fmt;

use crate::error::StoreResult;
use crate::traits::EnumerableStore;
use crate::value::StoredValue;

/// BLAKE3 digest of a store's full contents.
///
/// Two stores with the same keys and values always produce the same digest,
/// regardless of backend or insertion order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateDigest([u8; 32]);

impl StateDigest {
    /// Digest every entry of `store`.
    pub fn of<S: EnumerableStore + ?Sized>(store: &S) -> StoreResult<Self> {
        Ok(state_digest(&store.entries()?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters.
    pub fn short_id(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for StateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateDigest({})", self.short_id())
    }
}

impl fmt::Display for StateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash a key-ordered snapshot. Keys and string values are length-prefixed
/// so adjacent entries cannot alias.
pub fn state_digest(entries: &BTreeMap<String, StoredValue>) -> StateDigest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"paprd-state-v1:");
    hasher.update(&(entries.len() as u64).to_le_bytes());
    for (key, value) in entries {
        hasher.update(&(key.len() as u64).to_le_bytes());
        hasher.update(key.as_bytes());
        value.hash_into(&mut hasher);
    }
    StateDigest(*hasher.finalize().as_bytes())
}
