use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::value::{StoreValue, StoredValue};

/// Host-provided key-value store.
///
/// All implementations must satisfy these invariants:
/// - `get_raw` observes the most recent `set_raw` for the key.
/// - A `set_raw` that returns `Ok` is durable.
/// - A `set_raw` that returns `Err` left the key unchanged.
/// - Keys are never interpreted; the store is a pure key-value map.
pub trait KvStore: Send + Sync {
    /// Read the value under `key`, or `Ok(None)` if the key was never written.
    fn get_raw(&self, key: &str) -> StoreResult<Option<StoredValue>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set_raw(&self, key: &str, value: StoredValue) -> StoreResult<()>;
}

/// Typed `get(key, default)` / `set(key, value)` on top of [`KvStore`].
///
/// Blanket-implemented for every store.
pub trait KvStoreExt: KvStore {
    /// Read a typed value, returning `default` if the key is absent.
    ///
    /// A value of the wrong kind is reported as
    /// [`StoreError::TypeMismatch`] rather than replaced by the default.
    fn get<T: StoreValue>(&self, key: &str, default: T) -> StoreResult<T> {
        match self.get_raw(key)? {
            None => Ok(default),
            Some(value) => {
                let found = value.kind();
                T::from_stored(value).ok_or_else(|| StoreError::TypeMismatch {
                    key: key.to_string(),
                    expected: T::KIND,
                    found,
                })
            }
        }
    }

    fn set<T: StoreValue>(&self, key: &str, value: T) -> StoreResult<()> {
        self.set_raw(key, value.into_stored())
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}

/// A store that can list its full contents, for audits and digests.
pub trait EnumerableStore: KvStore {
    /// Snapshot of every key and value, in key order.
    fn entries(&self) -> StoreResult<BTreeMap<String, StoredValue>>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get_raw(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: StoredValue) -> StoreResult<()> {
        (**self).set_raw(key, value)
    }
}

impl<S: EnumerableStore + ?Sized> EnumerableStore for &S {
    fn entries(&self) -> StoreResult<BTreeMap<String, StoredValue>> {
        (**self).entries()
    }
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get_raw(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: StoredValue) -> StoreResult<()> {
        (**self).set_raw(key, value)
    }
}

impl<S: EnumerableStore + ?Sized> EnumerableStore for Arc<S> {
    fn entries(&self) -> StoreResult<BTreeMap<String, StoredValue>> {
        (**self).entries()
    }
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn get_raw(&self, key: &str) -> StoreResult<Option<StoredValue>> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: StoredValue) -> StoreResult<()> {
        (**self).set_raw(key, value)
    }
}
