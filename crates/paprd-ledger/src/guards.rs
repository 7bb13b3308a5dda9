//! Access-control preconditions.
//!
//! Each guard reads current state and either passes or returns the typed
//! failure for its rule. Operations call their guards before computing or
//! writing anything.

use paprd_store::KvStore;
use paprd_types::Address;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::state::LedgerState;

/// The caller must be the current owner. An uninitialized ledger has no
/// owner, so nobody passes.
pub fn require_owner<S: KvStore + ?Sized>(
    state: &LedgerState<'_, S>,
    caller: &Address,
) -> LedgerResult<()> {
    let owner = state.owner()?;
    if owner.is_empty() || &owner != caller {
        debug!(caller = %caller, "rejected: caller is not the owner");
        return Err(LedgerError::Unauthorized {
            caller: caller.clone(),
        });
    }
    Ok(())
}

/// The caller must be a registered minter.
pub fn require_minter<S: KvStore + ?Sized>(
    state: &LedgerState<'_, S>,
    caller: &Address,
) -> LedgerResult<()> {
    if !state.is_minter(caller)? {
        debug!(caller = %caller, "rejected: caller is not a minter");
        return Err(LedgerError::Unauthorized {
            caller: caller.clone(),
        });
    }
    Ok(())
}

pub fn require_not_paused<S: KvStore + ?Sized>(state: &LedgerState<'_, S>) -> LedgerResult<()> {
    if state.is_paused()? {
        debug!("rejected: contract is paused");
        return Err(LedgerError::ContractPaused);
    }
    Ok(())
}

pub fn require_not_blacklisted<S: KvStore + ?Sized>(
    state: &LedgerState<'_, S>,
    address: &Address,
) -> LedgerResult<()> {
    if state.is_blacklisted(address)? {
        debug!(address = %address, "rejected: address is blacklisted");
        return Err(LedgerError::AddressBlacklisted {
            address: address.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use paprd_store::InMemoryKvStore;

    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    #[test]
    fn owner_guard() {
        let store = InMemoryKvStore::new();
        let state = LedgerState::new(&store);
        state.set_owner(&addr("x")).unwrap();

        assert!(require_owner(&state, &addr("x")).is_ok());
        assert!(matches!(
            require_owner(&state, &addr("y")),
            Err(LedgerError::Unauthorized { .. })
        ));
    }

    #[test]
    fn empty_owner_admits_nobody() {
        let store = InMemoryKvStore::new();
        let state = LedgerState::new(&store);
        assert!(require_owner(&state, &Address::empty()).is_err());
    }

    #[test]
    fn minter_guard() {
        let store = InMemoryKvStore::new();
        let state = LedgerState::new(&store);
        assert!(require_minter(&state, &addr("m")).is_err());
        state.set_minter(&addr("m"), true).unwrap();
        assert!(require_minter(&state, &addr("m")).is_ok());
    }

    #[test]
    fn pause_guard() {
        let store = InMemoryKvStore::new();
        let state = LedgerState::new(&store);
        assert!(require_not_paused(&state).is_ok());
        state.set_paused(true).unwrap();
        assert!(matches!(
            require_not_paused(&state),
            Err(LedgerError::ContractPaused)
        ));
    }

    #[test]
    fn blacklist_guard_names_the_address() {
        let store = InMemoryKvStore::new();
        let state = LedgerState::new(&store);
        state.set_blacklisted(&addr("z"), true).unwrap();
        match require_not_blacklisted(&state, &addr("z")) {
            Err(LedgerError::AddressBlacklisted { address }) => assert_eq!(address, addr("z")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(require_not_blacklisted(&state, &addr("w")).is_ok());
    }

    #[test]
    fn guards_do_not_write() {
        let store = InMemoryKvStore::new();
        let state = LedgerState::new(&store);
        let _ = require_owner(&state, &addr("x"));
        let _ = require_minter(&state, &addr("x"));
        let _ = require_not_paused(&state);
        let _ = require_not_blacklisted(&state, &addr("x"));
        assert_eq!(store.writes(), 0);
    }
}
