//! Key-value storage boundary for the PAPRD ledger.
//!
//! The ledger engine never owns persistence. It reads and writes one key at
//! a time through the [`KvStore`] trait, which the execution host
//! implements. This crate defines that boundary plus two hosts:
//!
//! - [`InMemoryKvStore`] -- `HashMap`-based store for tests and embedding
//! - [`JsonFileStore`] -- whole-file JSON snapshot, rewritten atomically on
//!   every `set`
//!
//! # Design Rules
//!
//! 1. Keys are flat strings; values are one of the [`StoredValue`] kinds.
//! 2. Absent keys read as the caller-supplied default.
//! 3. A key holding a value of the wrong kind is an error, never a default.
//! 4. A `set` is durable once it returns.
//! 5. There are no multi-key transactions. Callers order their writes.

pub mod digest;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod value;

// Re-export primary types at crate root for ergonomic imports.
pub use digest::{state_digest, StateDigest};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::InMemoryKvStore;
pub use traits::{EnumerableStore, KvStore, KvStoreExt};
pub use value::{StoreValue, StoredValue, ValueKind};
