use paprd_store::{KvStore, KvStoreExt};
use paprd_types::{Address, CollateralType};

use crate::config::DEFAULT_COLLATERAL_RATIO;
use crate::error::LedgerResult;
use crate::keys;

/// Typed access to ledger entities over a raw key-value store.
///
/// Reads apply the documented defaults for absent keys. Writes go straight
/// to the store, one key each; ordering is the caller's responsibility.
pub struct LedgerState<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: KvStore + ?Sized> LedgerState<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    // ---- Reads ----

    /// Whether `key` holds any value at all.
    pub fn is_recorded(&self, key: &str) -> LedgerResult<bool> {
        Ok(self.store.get_raw(key)?.is_some())
    }

    pub fn owner(&self) -> LedgerResult<Address> {
        Ok(self.store.get(keys::OWNER, Address::empty())?)
    }

    pub fn is_paused(&self) -> LedgerResult<bool> {
        Ok(self.store.get(keys::PAUSED, false)?)
    }

    pub fn total_supply(&self) -> LedgerResult<u64> {
        Ok(self.store.get(keys::TOTAL_SUPPLY, 0u64)?)
    }

    pub fn collateral_ratio(&self) -> LedgerResult<u64> {
        Ok(self.store.get(keys::COLLATERAL_RATIO, DEFAULT_COLLATERAL_RATIO)?)
    }

    pub fn fiat_reserve(&self) -> LedgerResult<u64> {
        Ok(self.store.get(keys::FIAT_RESERVE, 0u64)?)
    }

    pub fn binom_token_address(&self) -> LedgerResult<Address> {
        Ok(self.store.get(keys::BINOM_TOKEN_ADDRESS, Address::empty())?)
    }

    pub fn balance(&self, address: &Address) -> LedgerResult<u64> {
        Ok(self.store.get(&keys::balance(address), 0u64)?)
    }

    pub fn is_blacklisted(&self, address: &Address) -> LedgerResult<bool> {
        Ok(self.store.get(&keys::blacklist(address), false)?)
    }

    pub fn is_minter(&self, address: &Address) -> LedgerResult<bool> {
        Ok(self.store.get(&keys::minter(address), false)?)
    }

    pub fn collateral(&self, address: &Address, ty: CollateralType) -> LedgerResult<u64> {
        Ok(self.store.get(&keys::collateral(address, ty), 0u64)?)
    }

    pub fn collateral_type(&self, address: &Address) -> LedgerResult<CollateralType> {
        Ok(self
            .store
            .get(&keys::collateral_type(address), CollateralType::Fiat)?)
    }

    // ---- Writes ----

    pub fn set_owner(&self, owner: &Address) -> LedgerResult<()> {
        Ok(self.store.set(keys::OWNER, owner.clone())?)
    }

    pub fn set_paused(&self, paused: bool) -> LedgerResult<()> {
        Ok(self.store.set(keys::PAUSED, paused)?)
    }

    pub fn set_total_supply(&self, supply: u64) -> LedgerResult<()> {
        Ok(self.store.set(keys::TOTAL_SUPPLY, supply)?)
    }

    pub fn set_collateral_ratio(&self, ratio: u64) -> LedgerResult<()> {
        Ok(self.store.set(keys::COLLATERAL_RATIO, ratio)?)
    }

    pub fn set_fiat_reserve(&self, reserve: u64) -> LedgerResult<()> {
        Ok(self.store.set(keys::FIAT_RESERVE, reserve)?)
    }

    pub fn set_binom_token_address(&self, address: &Address) -> LedgerResult<()> {
        Ok(self.store.set(keys::BINOM_TOKEN_ADDRESS, address.clone())?)
    }

    pub fn set_balance(&self, address: &Address, balance: u64) -> LedgerResult<()> {
        Ok(self.store.set(&keys::balance(address), balance)?)
    }

    pub fn set_blacklisted(&self, address: &Address, flag: bool) -> LedgerResult<()> {
        Ok(self.store.set(&keys::blacklist(address), flag)?)
    }

    pub fn set_minter(&self, address: &Address, flag: bool) -> LedgerResult<()> {
        Ok(self.store.set(&keys::minter(address), flag)?)
    }

    pub fn set_collateral(
        &self,
        address: &Address,
        ty: CollateralType,
        amount: u64,
    ) -> LedgerResult<()> {
        Ok(self.store.set(&keys::collateral(address, ty), amount)?)
    }

    pub fn set_collateral_type(&self, address: &Address, ty: CollateralType) -> LedgerResult<()> {
        Ok(self.store.set(&keys::collateral_type(address), ty)?)
    }
}
