use paprd_store::KvStore;
use paprd_types::{Address, CollateralType};
use tracing::debug;

use crate::config::{LedgerConfig, TokenMetadata, MIN_COLLATERAL_RATIO};
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventSink, LedgerEvent, TracingSink};
use crate::guards::{require_minter, require_not_blacklisted, require_not_paused, require_owner};
use crate::keys;
use crate::math::{checked_add, checked_sub, covers, covers_wide, required_collateral};
use crate::state::LedgerState;

/// The PAPRD state-transition engine.
///
/// The ledger is the sole writer of its store. Every state-changing
/// operation takes the calling identity supplied by the host, runs its
/// guards and domain checks, and only then writes. A rejected operation
/// performs zero writes. Writes within one operation are ordered so that a
/// crash between them can only understate value held by accounts, never
/// fabricate it (see each operation for its order).
///
/// Successful operations return their events and forward them to the
/// configured [`EventSink`].
pub struct Ledger<S> {
    store: S,
    config: LedgerConfig,
    sink: Box<dyn EventSink>,
}

impl<S: KvStore> Ledger<S> {
    /// Ledger over `store` with the default configuration, logging events
    /// through `tracing`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: LedgerConfig::default(),
            sink: Box::new(TracingSink),
        }
    }

    /// Ledger over `store` with a validated configuration.
    pub fn with_config(store: S, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            sink: Box::new(TracingSink),
        })
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn state(&self) -> LedgerState<'_, S> {
        LedgerState::new(&self.store)
    }

    fn publish(&self, events: Vec<LedgerEvent>) -> Vec<LedgerEvent> {
        for event in &events {
            self.sink.emit(event);
        }
        events
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// First-use setup: makes `caller` the owner and seeds the supply, pause
    /// flag, collateral ratio, and fiat reserve.
    ///
    /// A no-op (no writes, no events) once an owner is recorded. Ownership
    /// can be handed to the empty address, which reopens initialization; the
    /// aggregates are then already recorded and are left untouched.
    pub fn initialize(&self, caller: &Address) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        let owner = state.owner()?;
        if !owner.is_empty() {
            debug!(owner = %owner, "already initialized");
            return Ok(Vec::new());
        }

        // Owner goes last: until it is written the ledger still reads as
        // uninitialized, so an interrupted setup is simply re-run.
        if !state.is_recorded(keys::TOTAL_SUPPLY)? {
            state.set_total_supply(0)?;
        }
        if !state.is_recorded(keys::PAUSED)? {
            state.set_paused(false)?;
        }
        if !state.is_recorded(keys::COLLATERAL_RATIO)? {
            state.set_collateral_ratio(self.config.initial_collateral_ratio)?;
        }
        if !state.is_recorded(keys::FIAT_RESERVE)? {
            state.set_fiat_reserve(0)?;
        }
        state.set_owner(caller)?;
        let ratio = state.collateral_ratio()?;

        Ok(self.publish(vec![LedgerEvent::Initialized {
            owner: caller.clone(),
            collateral_ratio: ratio,
        }]))
    }

    pub fn is_initialized(&self) -> LedgerResult<bool> {
        Ok(!self.state().owner()?.is_empty())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get_balance(&self, address: &Address) -> LedgerResult<u64> {
        self.state().balance(address)
    }

    pub fn get_total_supply(&self) -> LedgerResult<u64> {
        self.state().total_supply()
    }

    pub fn get_collateral_balance(
        &self,
        address: &Address,
        collateral_type: CollateralType,
    ) -> LedgerResult<u64> {
        self.state().collateral(address, collateral_type)
    }

    pub fn get_collateral_type(&self, address: &Address) -> LedgerResult<CollateralType> {
        self.state().collateral_type(address)
    }

    pub fn get_collateral_ratio(&self) -> LedgerResult<u64> {
        self.state().collateral_ratio()
    }

    pub fn get_fiat_reserve(&self) -> LedgerResult<u64> {
        self.state().fiat_reserve()
    }

    pub fn is_blacklisted(&self, address: &Address) -> LedgerResult<bool> {
        self.state().is_blacklisted(address)
    }

    pub fn is_minter(&self, address: &Address) -> LedgerResult<bool> {
        self.state().is_minter(address)
    }

    /// The current owner, or the empty address before initialization.
    pub fn get_owner(&self) -> LedgerResult<Address> {
        self.state().owner()
    }

    pub fn is_paused(&self) -> LedgerResult<bool> {
        self.state().is_paused()
    }

    pub fn get_binom_token_address(&self) -> LedgerResult<Address> {
        self.state().binom_token_address()
    }

    pub fn token_metadata(&self) -> &TokenMetadata {
        &self.config.token
    }

    // -----------------------------------------------------------------------
    // Administration (owner only, not gated by pause or blacklist)
    // -----------------------------------------------------------------------

    pub fn set_collateral_ratio(
        &self,
        caller: &Address,
        ratio: u64,
    ) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_owner(&state, caller)?;
        if ratio < MIN_COLLATERAL_RATIO {
            return Err(LedgerError::InvalidRatio(ratio));
        }
        state.set_collateral_ratio(ratio)?;
        Ok(self.publish(vec![LedgerEvent::CollateralRatioUpdated { ratio }]))
    }

    /// Record the address of the BINOM collateral token. Stored as given.
    pub fn set_binom_token_address(
        &self,
        caller: &Address,
        address: &Address,
    ) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_owner(&state, caller)?;
        state.set_binom_token_address(address)?;
        Ok(self.publish(vec![LedgerEvent::BinomTokenAddressUpdated {
            address: address.clone(),
        }]))
    }

    pub fn add_minter(&self, caller: &Address, address: &Address) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_owner(&state, caller)?;
        state.set_minter(address, true)?;
        Ok(self.publish(vec![LedgerEvent::MinterAdded {
            address: address.clone(),
        }]))
    }

    pub fn remove_minter(
        &self,
        caller: &Address,
        address: &Address,
    ) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_owner(&state, caller)?;
        state.set_minter(address, false)?;
        Ok(self.publish(vec![LedgerEvent::MinterRemoved {
            address: address.clone(),
        }]))
    }

    /// Blacklisting the owner is allowed; it blocks the owner's transfers and
    /// collateral operations but not its administration.
    pub fn blacklist(&self, caller: &Address, address: &Address) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_owner(&state, caller)?;
        state.set_blacklisted(address, true)?;
        Ok(self.publish(vec![LedgerEvent::BlacklistAdded {
            address: address.clone(),
        }]))
    }

    pub fn unblacklist(
        &self,
        caller: &Address,
        address: &Address,
    ) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_owner(&state, caller)?;
        state.set_blacklisted(address, false)?;
        Ok(self.publish(vec![LedgerEvent::BlacklistRemoved {
            address: address.clone(),
        }]))
    }

    pub fn pause(&self, caller: &Address) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_owner(&state, caller)?;
        state.set_paused(true)?;
        Ok(self.publish(vec![LedgerEvent::Paused]))
    }

    pub fn unpause(&self, caller: &Address) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_owner(&state, caller)?;
        state.set_paused(false)?;
        Ok(self.publish(vec![LedgerEvent::Unpaused]))
    }

    /// Hand ownership to `new_owner`, which is not validated.
    pub fn transfer_ownership(
        &self,
        caller: &Address,
        new_owner: &Address,
    ) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_owner(&state, caller)?;
        state.set_owner(new_owner)?;
        Ok(self.publish(vec![LedgerEvent::OwnershipTransferred {
            previous_owner: caller.clone(),
            new_owner: new_owner.clone(),
        }]))
    }

    // -----------------------------------------------------------------------
    // Collateral
    // -----------------------------------------------------------------------

    /// Deposit `amount` of `collateral_type` for the caller and make it the
    /// caller's active type.
    ///
    /// Collateral previously deposited under the other type stays recorded
    /// under its own key but no longer backs the balance.
    ///
    /// Write order: fiat reserve (FIAT only), collateral, active type.
    pub fn add_collateral(
        &self,
        caller: &Address,
        amount: u64,
        collateral_type: CollateralType,
    ) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_not_paused(&state)?;
        require_not_blacklisted(&state, caller)?;

        let new_reserve = if collateral_type.is_fiat() {
            Some(checked_add(state.fiat_reserve()?, amount)?)
        } else {
            None
        };
        let new_collateral = checked_add(state.collateral(caller, collateral_type)?, amount)?;

        if let Some(reserve) = new_reserve {
            state.set_fiat_reserve(reserve)?;
        }
        state.set_collateral(caller, collateral_type, new_collateral)?;
        state.set_collateral_type(caller, collateral_type)?;

        Ok(self.publish(vec![LedgerEvent::CollateralAdded {
            from: caller.clone(),
            amount,
            collateral_type,
        }]))
    }

    /// Withdraw `amount` of the caller's active collateral. What remains must
    /// still cover the caller's balance at the current ratio.
    ///
    /// Write order: collateral, then fiat reserve (FIAT only).
    pub fn remove_collateral(&self, caller: &Address, amount: u64) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_not_paused(&state)?;
        require_not_blacklisted(&state, caller)?;

        let collateral_type = state.collateral_type(caller)?;
        let current = state.collateral(caller, collateral_type)?;
        if amount > current {
            return Err(LedgerError::InsufficientCollateral {
                available: current,
                required: amount,
            });
        }
        let remaining = current - amount;

        let balance = state.balance(caller)?;
        let ratio = state.collateral_ratio()?;
        if !covers(remaining, balance, ratio) {
            return Err(LedgerError::RatioViolation {
                remaining,
                balance,
                ratio,
            });
        }

        let new_reserve = if collateral_type.is_fiat() {
            Some(checked_sub(state.fiat_reserve()?, amount)?)
        } else {
            None
        };

        state.set_collateral(caller, collateral_type, remaining)?;
        if let Some(reserve) = new_reserve {
            state.set_fiat_reserve(reserve)?;
        }

        Ok(self.publish(vec![LedgerEvent::CollateralRemoved {
            to: caller.clone(),
            amount,
            collateral_type,
        }]))
    }

    // -----------------------------------------------------------------------
    // Token movements
    // -----------------------------------------------------------------------

    /// Move `amount` from the caller to `to`.
    ///
    /// Write order: debit, then credit. A self-transfer writes the same key
    /// twice and ends where it started.
    pub fn transfer(
        &self,
        caller: &Address,
        to: &Address,
        amount: u64,
    ) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_not_paused(&state)?;
        require_not_blacklisted(&state, caller)?;
        require_not_blacklisted(&state, to)?;

        let from_balance = state.balance(caller)?;
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: from_balance,
                requested: amount,
            });
        }
        let debited = from_balance - amount;
        let credited = if caller == to {
            from_balance
        } else {
            checked_add(state.balance(to)?, amount)?
        };

        state.set_balance(caller, debited)?;
        state.set_balance(to, credited)?;

        Ok(self.publish(vec![LedgerEvent::Transfer {
            from: caller.clone(),
            to: to.clone(),
            amount,
        }]))
    }

    /// Create `amount` new tokens for `to`, provided `to`'s active collateral
    /// covers the resulting balance at the current ratio.
    ///
    /// Write order: total supply, then balance.
    pub fn mint(&self, caller: &Address, to: &Address, amount: u64) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_minter(&state, caller)?;
        require_not_paused(&state)?;
        require_not_blacklisted(&state, to)?;

        let collateral_type = state.collateral_type(to)?;
        let collateral = state.collateral(to, collateral_type)?;
        let balance = state.balance(to)?;
        let wanted = u128::from(balance) + u128::from(amount);
        let ratio = state.collateral_ratio()?;
        if !covers_wide(collateral, wanted, ratio) {
            return Err(LedgerError::InsufficientCollateral {
                available: collateral,
                required: required_collateral(wanted, ratio),
            });
        }
        let new_balance = checked_add(balance, amount)?;
        let new_supply = checked_add(state.total_supply()?, amount)?;

        state.set_total_supply(new_supply)?;
        state.set_balance(to, new_balance)?;

        Ok(self.publish(vec![LedgerEvent::Mint {
            to: to.clone(),
            amount,
            collateral_type,
        }]))
    }

    /// Destroy `amount` of the caller's tokens. Collateral is not released.
    ///
    /// Write order: balance, then total supply.
    pub fn burn(&self, caller: &Address, amount: u64) -> LedgerResult<Vec<LedgerEvent>> {
        let state = self.state();
        require_not_paused(&state)?;
        require_not_blacklisted(&state, caller)?;

        let balance = state.balance(caller)?;
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: balance,
                requested: amount,
            });
        }
        let new_supply = checked_sub(state.total_supply()?, amount)?;

        state.set_balance(caller, balance - amount)?;
        state.set_total_supply(new_supply)?;

        Ok(self.publish(vec![LedgerEvent::Burn {
            from: caller.clone(),
            amount,
        }]))
    }
}

impl<S> std::fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
