use std::sync::{Arc, Mutex, PoisonError};

use paprd_types::{Address, CollateralType};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A state change produced by a successful operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    Initialized {
        owner: Address,
        collateral_ratio: u64,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: u64,
    },
    Mint {
        to: Address,
        amount: u64,
        collateral_type: CollateralType,
    },
    Burn {
        from: Address,
        amount: u64,
    },
    CollateralAdded {
        from: Address,
        amount: u64,
        collateral_type: CollateralType,
    },
    CollateralRemoved {
        to: Address,
        amount: u64,
        collateral_type: CollateralType,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    Paused,
    Unpaused,
    BlacklistAdded {
        address: Address,
    },
    BlacklistRemoved {
        address: Address,
    },
    MinterAdded {
        address: Address,
    },
    MinterRemoved {
        address: Address,
    },
    CollateralRatioUpdated {
        ratio: u64,
    },
    BinomTokenAddressUpdated {
        address: Address,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialized { .. } => "Initialized",
            Self::Transfer { .. } => "Transfer",
            Self::Mint { .. } => "Mint",
            Self::Burn { .. } => "Burn",
            Self::CollateralAdded { .. } => "CollateralAdded",
            Self::CollateralRemoved { .. } => "CollateralRemoved",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
            Self::Paused => "Paused",
            Self::Unpaused => "Unpaused",
            Self::BlacklistAdded { .. } => "BlacklistAdded",
            Self::BlacklistRemoved { .. } => "BlacklistRemoved",
            Self::MinterAdded { .. } => "MinterAdded",
            Self::MinterRemoved { .. } => "MinterRemoved",
            Self::CollateralRatioUpdated { .. } => "CollateralRatioUpdated",
            Self::BinomTokenAddressUpdated { .. } => "BinomTokenAddressUpdated",
        }
    }
}

/// Host-provided notification channel for ledger events.
///
/// Emission is fire-and-forget: sinks cannot fail an operation and the
/// ledger never reads events back.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &LedgerEvent);
}

/// Logs every event at INFO through `tracing`. The default sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &LedgerEvent) {
        match serde_json::to_string(event) {
            Ok(json) => info!(event = event.name(), payload = %json, "ledger event"),
            Err(_) => info!(event = event.name(), "ledger event"),
        }
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &LedgerEvent) {}
}

/// Collects events in memory. Clones share the same buffer, so a test can
/// hand one clone to the ledger and inspect another.
#[derive(Clone, Debug, Default)]
pub struct BufferedSink {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event emitted so far.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for BufferedSink {
    fn emit(&self, event: &LedgerEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: &LedgerEvent) {
        (**self).emit(event)
    }
}
