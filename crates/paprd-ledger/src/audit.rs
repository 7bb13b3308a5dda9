use std::fmt;

use paprd_store::{EnumerableStore, StoreError, StoreValue, StoredValue};
use paprd_types::{Address, CollateralType};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::MIN_COLLATERAL_RATIO;
use crate::engine::Ledger;
use crate::error::LedgerResult;
use crate::keys;
use crate::math::covers;

/// Result of a whole-state consistency audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub total_supply: u64,
    pub balance_sum: u128,
    pub fiat_reserve: u64,
    pub fiat_collateral_sum: u128,
    pub collateral_ratio: u64,
    /// Number of addresses holding a balance entry.
    pub accounts: usize,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    /// Returns `true` if every global invariant holds.
    ///
    /// Per-account undercollateralization is reported but does not count: it
    /// arises legitimately from transfers and ratio increases.
    pub fn is_consistent(&self) -> bool {
        self.violations
            .iter()
            .all(|v| matches!(v.kind, ViolationKind::Undercollateralized(_)))
    }
}

/// A specific finding from [`Ledger::audit`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    /// `totalSupply` differs from the sum of all balances.
    SupplyMismatch,
    /// `fiat_reserve` differs from the sum of all FIAT collateral.
    ReserveMismatch,
    /// The stored collateral ratio is below the minimum.
    RatioOutOfRange,
    /// The account's active collateral no longer covers its balance.
    Undercollateralized(Address),
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SupplyMismatch => write!(f, "supply-mismatch"),
            Self::ReserveMismatch => write!(f, "reserve-mismatch"),
            Self::RatioOutOfRange => write!(f, "ratio-out-of-range"),
            Self::Undercollateralized(address) => write!(f, "undercollateralized({address})"),
        }
    }
}

fn decode_entry<T: StoreValue>(key: &str, value: &StoredValue) -> Result<T, StoreError> {
    T::from_stored(value.clone()).ok_or_else(|| StoreError::TypeMismatch {
        key: key.to_string(),
        expected: T::KIND,
        found: value.kind(),
    })
}

impl<S: EnumerableStore> Ledger<S> {
    /// Recompute the aggregates from every stored entry and compare them
    /// with the recorded totals.
    ///
    /// Read-only. A consistent report after an interrupted operation shows
    /// the interruption was harmless; a mismatch shows which aggregate is
    /// ahead of the per-account entries.
    pub fn audit(&self) -> LedgerResult<AuditReport> {
        let entries = self.store().entries()?;
        let state = self.state();

        let mut balance_sum: u128 = 0;
        let mut fiat_collateral_sum: u128 = 0;
        let mut holders = Vec::new();

        for (key, value) in &entries {
            if let Some(address) = key.strip_prefix(keys::BALANCE_PREFIX) {
                let balance: u64 = decode_entry(key, value)?;
                balance_sum += u128::from(balance);
                holders.push((Address::new(address), balance));
            } else if let Some((CollateralType::Fiat, _)) = keys::parse_collateral(key) {
                let amount: u64 = decode_entry(key, value)?;
                fiat_collateral_sum += u128::from(amount);
            }
        }

        let total_supply = state.total_supply()?;
        let fiat_reserve = state.fiat_reserve()?;
        let collateral_ratio = state.collateral_ratio()?;
        let mut violations = Vec::new();

        if u128::from(total_supply) != balance_sum {
            violations.push(Violation {
                kind: ViolationKind::SupplyMismatch,
                description: format!(
                    "total supply {total_supply} but balances sum to {balance_sum}"
                ),
            });
        }
        if u128::from(fiat_reserve) != fiat_collateral_sum {
            violations.push(Violation {
                kind: ViolationKind::ReserveMismatch,
                description: format!(
                    "fiat reserve {fiat_reserve} but FIAT collateral sums to {fiat_collateral_sum}"
                ),
            });
        }
        if collateral_ratio < MIN_COLLATERAL_RATIO {
            violations.push(Violation {
                kind: ViolationKind::RatioOutOfRange,
                description: format!(
                    "collateral ratio {collateral_ratio} below minimum {MIN_COLLATERAL_RATIO}"
                ),
            });
        }

        for (address, balance) in &holders {
            if *balance == 0 {
                continue;
            }
            let ty = state.collateral_type(address)?;
            let collateral = state.collateral(address, ty)?;
            if !covers(collateral, *balance, collateral_ratio) {
                violations.push(Violation {
                    kind: ViolationKind::Undercollateralized(address.clone()),
                    description: format!(
                        "{address} holds {balance} against {collateral} {ty} collateral at {collateral_ratio}%"
                    ),
                });
            }
        }

        let report = AuditReport {
            total_supply,
            balance_sum,
            fiat_reserve,
            fiat_collateral_sum,
            collateral_ratio,
            accounts: holders.len(),
            violations,
        };

        if report.is_consistent() {
            info!(
                accounts = report.accounts,
                total_supply,
                fiat_reserve,
                findings = report.violations.len(),
                "audit passed"
            );
        } else {
            for v in &report.violations {
                warn!(kind = %v.kind, "{}", v.description);
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use paprd_store::{InMemoryKvStore, KvStore, StateDigest, StoreResult};
    use proptest::prelude::*;

    use super::*;
    use crate::error::LedgerError;
    use crate::events::NullSink;

    const OWNER: &str = "owner";
    const MINTER: &str = "minter";

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn ledger() -> Ledger<InMemoryKvStore> {
        let ledger = Ledger::new(InMemoryKvStore::new()).with_sink(NullSink);
        ledger.initialize(&addr(OWNER)).unwrap();
        ledger.add_minter(&addr(OWNER), &addr(MINTER)).unwrap();
        ledger
    }

    // -----------------------------------------------------------------------
    // Report contents
    // -----------------------------------------------------------------------

    #[test]
    fn fresh_ledger_is_consistent() {
        let report = ledger().audit().unwrap();
        assert!(report.is_consistent());
        assert!(report.violations.is_empty());
        assert_eq!(report.total_supply, 0);
        assert_eq!(report.accounts, 0);
        assert_eq!(report.collateral_ratio, 150);
    }

    #[test]
    fn aggregates_match_after_activity() {
        let ledger = ledger();
        ledger.add_collateral(&addr("a"), 300, CollateralType::Fiat).unwrap();
        ledger.add_collateral(&addr("b"), 90, CollateralType::Binom).unwrap();
        ledger.mint(&addr(MINTER), &addr("a"), 200).unwrap();
        ledger.mint(&addr(MINTER), &addr("b"), 60).unwrap();
        ledger.transfer(&addr("a"), &addr("c"), 20).unwrap();
        ledger.burn(&addr("b"), 10).unwrap();

        let report = ledger.audit().unwrap();
        assert_eq!(report.total_supply, 250);
        assert_eq!(report.balance_sum, 250);
        assert_eq!(report.fiat_reserve, 300);
        assert_eq!(report.fiat_collateral_sum, 300);
        assert_eq!(report.accounts, 3);
        // c received tokens without collateral.
        assert_eq!(
            report.violations,
            vec![Violation {
                kind: ViolationKind::Undercollateralized(addr("c")),
                description: "c holds 20 against 0 FIAT collateral at 150%".into(),
            }]
        );
        assert!(report.is_consistent());
    }

    #[test]
    fn orphaned_fiat_collateral_still_counts_toward_reserve() {
        let ledger = ledger();
        ledger.add_collateral(&addr("a"), 100, CollateralType::Fiat).unwrap();
        ledger.add_collateral(&addr("a"), 5, CollateralType::Binom).unwrap();
        let report = ledger.audit().unwrap();
        assert_eq!(report.fiat_reserve, 100);
        assert_eq!(report.fiat_collateral_sum, 100);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn detects_tampered_totals() {
        let store = InMemoryKvStore::with_entries([
            (keys::OWNER, StoredValue::Str(OWNER.into())),
            (keys::TOTAL_SUPPLY, StoredValue::U64(10)),
            (keys::FIAT_RESERVE, StoredValue::U64(7)),
            (keys::COLLATERAL_RATIO, StoredValue::U64(80)),
            ("balance_a", StoredValue::U64(4)),
            ("collateral_0_a", StoredValue::U64(100)),
        ]);
        let report = Ledger::new(store).audit().unwrap();
        let kinds: Vec<_> = report.violations.iter().map(|v| v.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::SupplyMismatch,
                ViolationKind::ReserveMismatch,
                ViolationKind::RatioOutOfRange,
            ]
        );
        assert!(!report.is_consistent());
    }

    #[test]
    fn wrong_kind_under_balance_key_is_an_error() {
        let store = InMemoryKvStore::with_entries([("balance_a", StoredValue::Bool(true))]);
        let err = Ledger::new(store).audit().unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Store(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn audit_does_not_write() {
        let ledger = ledger();
        let writes = ledger.store().writes();
        ledger.audit().unwrap();
        assert_eq!(ledger.store().writes(), writes);
    }

    // -----------------------------------------------------------------------
    // Interrupted operations
    // -----------------------------------------------------------------------

    /// Store that accepts `budget` more writes, then fails every write.
    struct FailAfter {
        inner: InMemoryKvStore,
        budget: AtomicU64,
    }

    impl FailAfter {
        fn arm(&self, budget: u64) {
            self.budget.store(budget, Ordering::SeqCst);
        }
    }

    impl KvStore for FailAfter {
        fn get_raw(&self, key: &str) -> StoreResult<Option<StoredValue>> {
            self.inner.get_raw(key)
        }

        fn set_raw(&self, key: &str, value: StoredValue) -> StoreResult<()> {
            let left = self.budget.load(Ordering::SeqCst);
            if left == 0 {
                return Err(StoreError::Backend("simulated crash".into()));
            }
            self.budget.store(left - 1, Ordering::SeqCst);
            self.inner.set_raw(key, value)
        }
    }

    impl EnumerableStore for FailAfter {
        fn entries(&self) -> StoreResult<std::collections::BTreeMap<String, StoredValue>> {
            self.inner.entries()
        }
    }

    /// Funded ledger whose store will accept exactly one more write.
    fn crashing_ledger() -> Ledger<Arc<FailAfter>> {
        let store = Arc::new(FailAfter {
            inner: InMemoryKvStore::new(),
            budget: AtomicU64::new(u64::MAX),
        });
        let ledger = Ledger::new(Arc::clone(&store)).with_sink(NullSink);
        ledger.initialize(&addr(OWNER)).unwrap();
        ledger.add_minter(&addr(OWNER), &addr(MINTER)).unwrap();
        ledger.add_collateral(&addr("a"), 300, CollateralType::Fiat).unwrap();
        ledger.mint(&addr(MINTER), &addr("a"), 100).unwrap();
        store.arm(1);
        ledger
    }

    /// After a crash between writes the aggregates may only overstate what
    /// the accounts hold.
    fn assert_crash_is_conservative(report: &AuditReport) {
        assert!(u128::from(report.total_supply) >= report.balance_sum);
        assert!(u128::from(report.fiat_reserve) >= report.fiat_collateral_sum);
    }

    #[test]
    fn interrupted_transfer_loses_rather_than_creates() {
        let ledger = crashing_ledger();
        assert!(ledger.transfer(&addr("a"), &addr("b"), 40).is_err());
        let report = ledger.audit().unwrap();
        assert_crash_is_conservative(&report);
        assert_eq!(report.balance_sum, 60);
        assert_eq!(report.violations[0].kind, ViolationKind::SupplyMismatch);
    }

    #[test]
    fn interrupted_mint_and_burn_are_conservative() {
        let ledger = crashing_ledger();
        assert!(ledger.mint(&addr(MINTER), &addr("a"), 50).is_err());
        let report = ledger.audit().unwrap();
        assert_crash_is_conservative(&report);
        assert_eq!(report.total_supply, 150);
        assert_eq!(report.balance_sum, 100);

        let ledger = crashing_ledger();
        assert!(ledger.burn(&addr("a"), 30).is_err());
        let report = ledger.audit().unwrap();
        assert_crash_is_conservative(&report);
        assert_eq!(report.total_supply, 100);
        assert_eq!(report.balance_sum, 70);
    }

    #[test]
    fn interrupted_collateral_moves_are_conservative() {
        let ledger = crashing_ledger();
        assert!(ledger
            .add_collateral(&addr("a"), 25, CollateralType::Fiat)
            .is_err());
        let report = ledger.audit().unwrap();
        assert_crash_is_conservative(&report);
        assert_eq!(report.fiat_reserve, 325);
        assert_eq!(report.fiat_collateral_sum, 300);

        let ledger = crashing_ledger();
        assert!(ledger.remove_collateral(&addr("a"), 50).is_err());
        let report = ledger.audit().unwrap();
        assert_crash_is_conservative(&report);
        assert_eq!(report.fiat_reserve, 300);
        assert_eq!(report.fiat_collateral_sum, 250);
    }

    // -----------------------------------------------------------------------
    // Properties over random operation sequences
    // -----------------------------------------------------------------------

    const ACCOUNTS: [&str; 4] = ["a", "b", "c", OWNER];

    #[derive(Clone, Debug)]
    enum Action {
        Transfer(usize, usize, u64),
        Mint(usize, u64),
        Burn(usize, u64),
        AddCollateral(usize, u64, bool),
        RemoveCollateral(usize, u64),
        Blacklist(usize),
        Unblacklist(usize),
        Pause,
        Unpause,
    }

    fn action() -> impl Strategy<Value = Action> {
        let who = 0..ACCOUNTS.len();
        prop_oneof![
            (who.clone(), who.clone(), 0..400u64).prop_map(|(f, t, n)| Action::Transfer(f, t, n)),
            (who.clone(), 0..400u64).prop_map(|(t, n)| Action::Mint(t, n)),
            (who.clone(), 0..400u64).prop_map(|(f, n)| Action::Burn(f, n)),
            (who.clone(), 0..800u64, any::<bool>())
                .prop_map(|(f, n, fiat)| Action::AddCollateral(f, n, fiat)),
            (who.clone(), 0..800u64).prop_map(|(f, n)| Action::RemoveCollateral(f, n)),
            who.clone().prop_map(Action::Blacklist),
            who.prop_map(Action::Unblacklist),
            Just(Action::Pause),
            Just(Action::Unpause),
        ]
    }

    fn apply(
        ledger: &Ledger<InMemoryKvStore>,
        action: &Action,
    ) -> LedgerResult<Vec<crate::events::LedgerEvent>> {
        let owner = addr(OWNER);
        match *action {
            Action::Transfer(f, t, n) => ledger.transfer(&addr(ACCOUNTS[f]), &addr(ACCOUNTS[t]), n),
            Action::Mint(t, n) => ledger.mint(&addr(MINTER), &addr(ACCOUNTS[t]), n),
            Action::Burn(f, n) => ledger.burn(&addr(ACCOUNTS[f]), n),
            Action::AddCollateral(f, n, fiat) => {
                let ty = if fiat {
                    CollateralType::Fiat
                } else {
                    CollateralType::Binom
                };
                ledger.add_collateral(&addr(ACCOUNTS[f]), n, ty)
            }
            Action::RemoveCollateral(f, n) => ledger.remove_collateral(&addr(ACCOUNTS[f]), n),
            Action::Blacklist(t) => ledger.blacklist(&owner, &addr(ACCOUNTS[t])),
            Action::Unblacklist(t) => ledger.unblacklist(&owner, &addr(ACCOUNTS[t])),
            Action::Pause => ledger.pause(&owner),
            Action::Unpause => ledger.unpause(&owner),
        }
    }

    fn is_covered(ledger: &Ledger<InMemoryKvStore>, who: &Address) -> bool {
        let ty = ledger.get_collateral_type(who).unwrap();
        covers(
            ledger.get_collateral_balance(who, ty).unwrap(),
            ledger.get_balance(who).unwrap(),
            ledger.get_collateral_ratio().unwrap(),
        )
    }

    proptest! {
        #[test]
        fn random_sequences_preserve_invariants(actions in prop::collection::vec(action(), 1..60)) {
            let ledger = ledger();
            for action in &actions {
                let before = StateDigest::of(ledger.store()).unwrap();
                match apply(&ledger, action) {
                    Ok(_) => match *action {
                        Action::Mint(t, _) => {
                            prop_assert!(is_covered(&ledger, &addr(ACCOUNTS[t])));
                        }
                        Action::RemoveCollateral(f, _) => {
                            prop_assert!(is_covered(&ledger, &addr(ACCOUNTS[f])));
                        }
                        _ => {}
                    },
                    Err(_) => {
                        prop_assert_eq!(StateDigest::of(ledger.store()).unwrap(), before);
                    }
                }
                let report = ledger.audit().unwrap();
                prop_assert!(report.is_consistent(), "{:?}", report.violations);
            }
        }
    }
}
