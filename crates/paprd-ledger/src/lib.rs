//! State-transition engine for the PAPRD collateral-backed token.
//!
//! This crate holds every rule of the ledger. It provides:
//! - [`Ledger`], the engine: balances, supply, collateral, and access control
//! - Guards for owner, minter, pause, and blacklist checks
//! - Typed state access over the flat key layout in [`keys`]
//! - [`Operation`] / [`Response`] for hosts that dispatch calls as data
//! - Structured [`LedgerEvent`]s delivered through an [`EventSink`]
//! - Whole-state auditing of supply and reserve aggregates
//!
//! Persistence belongs to the host, behind `paprd_store::KvStore`.

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod guards;
pub mod keys;
pub mod math;
pub mod operation;
pub mod state;

pub use audit::{AuditReport, Violation, ViolationKind};
pub use config::{LedgerConfig, TokenMetadata, DEFAULT_COLLATERAL_RATIO, MIN_COLLATERAL_RATIO};
pub use engine::Ledger;
pub use error::{LedgerError, LedgerResult};
pub use events::{BufferedSink, EventSink, LedgerEvent, NullSink, TracingSink};
pub use operation::{CallValue, Operation, Response};
pub use state::LedgerState;
