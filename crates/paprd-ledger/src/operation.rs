//! A single entry point over every ledger operation.
//!
//! Hosts that receive calls as data (a CLI, a JSON request, a replay log)
//! decode them into an [`Operation`] and hand it to [`Ledger::execute`]
//! together with the authenticated caller.

use std::fmt;

use paprd_store::KvStore;
use paprd_types::{Address, CollateralType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::Ledger;
use crate::error::LedgerResult;
use crate::events::LedgerEvent;

/// One call into the ledger, without the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Operation {
    Initialize,

    // Reads
    GetBalance { address: Address },
    GetTotalSupply,
    GetCollateralBalance {
        address: Address,
        collateral_type: CollateralType,
    },
    GetCollateralType { address: Address },
    GetCollateralRatio,
    GetFiatReserve,
    IsBlacklisted { address: Address },
    IsMinter { address: Address },
    GetOwner,
    IsPaused,
    GetBinomTokenAddress,

    // Value movements
    Transfer { to: Address, amount: u64 },
    Mint { to: Address, amount: u64 },
    Burn { amount: u64 },
    AddCollateral {
        amount: u64,
        collateral_type: CollateralType,
    },
    RemoveCollateral { amount: u64 },

    // Administration
    SetCollateralRatio { ratio: u64 },
    SetBinomTokenAddress { address: Address },
    AddMinter { address: Address },
    RemoveMinter { address: Address },
    Blacklist { address: Address },
    Unblacklist { address: Address },
    Pause,
    Unpause,
    TransferOwnership { new_owner: Address },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::GetBalance { .. } => "getBalance",
            Self::GetTotalSupply => "getTotalSupply",
            Self::GetCollateralBalance { .. } => "getCollateralBalance",
            Self::GetCollateralType { .. } => "getCollateralType",
            Self::GetCollateralRatio => "getCollateralRatio",
            Self::GetFiatReserve => "getFiatReserve",
            Self::IsBlacklisted { .. } => "isBlacklisted",
            Self::IsMinter { .. } => "isMinter",
            Self::GetOwner => "getOwner",
            Self::IsPaused => "isPaused",
            Self::GetBinomTokenAddress => "getBinomTokenAddress",
            Self::Transfer { .. } => "transfer",
            Self::Mint { .. } => "mint",
            Self::Burn { .. } => "burn",
            Self::AddCollateral { .. } => "addCollateral",
            Self::RemoveCollateral { .. } => "removeCollateral",
            Self::SetCollateralRatio { .. } => "setCollateralRatio",
            Self::SetBinomTokenAddress { .. } => "setBinomTokenAddress",
            Self::AddMinter { .. } => "addMinter",
            Self::RemoveMinter { .. } => "removeMinter",
            Self::Blacklist { .. } => "blacklist",
            Self::Unblacklist { .. } => "unblacklist",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::TransferOwnership { .. } => "transferOwnership",
        }
    }

    /// Whether the operation may write to the store.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::GetBalance { .. }
                | Self::GetTotalSupply
                | Self::GetCollateralBalance { .. }
                | Self::GetCollateralType { .. }
                | Self::GetCollateralRatio
                | Self::GetFiatReserve
                | Self::IsBlacklisted { .. }
                | Self::IsMinter { .. }
                | Self::GetOwner
                | Self::IsPaused
                | Self::GetBinomTokenAddress
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value an operation returns. Successful mutators return `Bool(true)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CallValue {
    Unit,
    U64(u64),
    Bool(bool),
    Text(String),
    Collateral(CollateralType),
}

impl fmt::Display for CallValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => Ok(()),
            Self::U64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Collateral(ty) => write!(f, "{ty}"),
        }
    }
}

impl From<Address> for CallValue {
    fn from(address: Address) -> Self {
        Self::Text(address.into_string())
    }
}

/// Outcome of [`Ledger::execute`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Response {
    pub value: CallValue,
    pub events: Vec<LedgerEvent>,
}

impl Response {
    fn read(value: impl Into<CallValue>) -> Self {
        Self {
            value: value.into(),
            events: Vec::new(),
        }
    }

    fn written(events: Vec<LedgerEvent>) -> Self {
        Self {
            value: CallValue::Bool(true),
            events,
        }
    }
}

impl From<u64> for CallValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<bool> for CallValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<CollateralType> for CallValue {
    fn from(ty: CollateralType) -> Self {
        Self::Collateral(ty)
    }
}

impl<S: KvStore> Ledger<S> {
    /// Run `op` on behalf of `caller`.
    ///
    /// `initialize` returns `Unit`. Reads return their value. Every other
    /// operation returns `Bool(true)` together with the events it emitted.
    pub fn execute(&self, caller: &Address, op: &Operation) -> LedgerResult<Response> {
        debug!(op = op.name(), caller = %caller, "execute");
        let response = match op {
            Operation::Initialize => Response {
                value: CallValue::Unit,
                events: self.initialize(caller)?,
            },

            Operation::GetBalance { address } => Response::read(self.get_balance(address)?),
            Operation::GetTotalSupply => Response::read(self.get_total_supply()?),
            Operation::GetCollateralBalance {
                address,
                collateral_type,
            } => Response::read(self.get_collateral_balance(address, *collateral_type)?),
            Operation::GetCollateralType { address } => {
                Response::read(self.get_collateral_type(address)?)
            }
            Operation::GetCollateralRatio => Response::read(self.get_collateral_ratio()?),
            Operation::GetFiatReserve => Response::read(self.get_fiat_reserve()?),
            Operation::IsBlacklisted { address } => Response::read(self.is_blacklisted(address)?),
            Operation::IsMinter { address } => Response::read(self.is_minter(address)?),
            Operation::GetOwner => Response::read(self.get_owner()?),
            Operation::IsPaused => Response::read(self.is_paused()?),
            Operation::GetBinomTokenAddress => Response::read(self.get_binom_token_address()?),

            Operation::Transfer { to, amount } => Response::written(self.transfer(caller, to, *amount)?),
            Operation::Mint { to, amount } => Response::written(self.mint(caller, to, *amount)?),
            Operation::Burn { amount } => Response::written(self.burn(caller, *amount)?),
            Operation::AddCollateral {
                amount,
                collateral_type,
            } => Response::written(self.add_collateral(caller, *amount, *collateral_type)?),
            Operation::RemoveCollateral { amount } => {
                Response::written(self.remove_collateral(caller, *amount)?)
            }

            Operation::SetCollateralRatio { ratio } => {
                Response::written(self.set_collateral_ratio(caller, *ratio)?)
            }
            Operation::SetBinomTokenAddress { address } => {
                Response::written(self.set_binom_token_address(caller, address)?)
            }
            Operation::AddMinter { address } => Response::written(self.add_minter(caller, address)?),
            Operation::RemoveMinter { address } => {
                Response::written(self.remove_minter(caller, address)?)
            }
            Operation::Blacklist { address } => Response::written(self.blacklist(caller, address)?),
            Operation::Unblacklist { address } => {
                Response::written(self.unblacklist(caller, address)?)
            }
            Operation::Pause => Response::written(self.pause(caller)?),
            Operation::Unpause => Response::written(self.unpause(caller)?),
            Operation::TransferOwnership { new_owner } => {
                Response::written(self.transfer_ownership(caller, new_owner)?)
            }
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use paprd_store::InMemoryKvStore;

    use super::*;
    use crate::error::LedgerError;
    use crate::events::NullSink;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn ledger() -> Ledger<InMemoryKvStore> {
        Ledger::new(InMemoryKvStore::new()).with_sink(NullSink)
    }

    #[test]
    fn decodes_camel_case_json() {
        let op: Operation = serde_json::from_str(
            r#"{"op":"addCollateral","amount":200,"collateralType":"Binom"}"#,
        )
        .unwrap();
        assert_eq!(
            op,
            Operation::AddCollateral {
                amount: 200,
                collateral_type: CollateralType::Binom
            }
        );

        let op: Operation =
            serde_json::from_str(r#"{"op":"transferOwnership","newOwner":"heir"}"#).unwrap();
        assert_eq!(op.name(), "transferOwnership");

        let op: Operation = serde_json::from_str(r#"{"op":"pause"}"#).unwrap();
        assert_eq!(op, Operation::Pause);
    }

    #[test]
    fn unknown_operation_is_rejected() {
        assert!(serde_json::from_str::<Operation>(r#"{"op":"selfDestruct"}"#).is_err());
    }

    #[test]
    fn reads_are_not_mutating() {
        assert!(!Operation::GetTotalSupply.is_mutating());
        assert!(!Operation::GetOwner.is_mutating());
        assert!(Operation::Initialize.is_mutating());
        assert!(Operation::Burn { amount: 1 }.is_mutating());
        assert!(Operation::Unpause.is_mutating());
    }

    #[test]
    fn execute_round_trip() {
        let ledger = ledger();
        let owner = addr("owner");

        let init = ledger.execute(&owner, &Operation::Initialize).unwrap();
        assert_eq!(init.value, CallValue::Unit);
        assert_eq!(init.events.len(), 1);

        let ops = [
            Operation::AddMinter { address: owner.clone() },
            Operation::AddCollateral {
                amount: 300,
                collateral_type: CollateralType::Fiat,
            },
            Operation::Mint {
                to: owner.clone(),
                amount: 200,
            },
            Operation::Transfer {
                to: addr("b"),
                amount: 50,
            },
        ];
        for op in &ops {
            let response = ledger.execute(&owner, op).unwrap();
            assert_eq!(response.value, CallValue::Bool(true), "{op}");
            assert_eq!(response.events.len(), 1, "{op}");
        }

        let balance = ledger
            .execute(&owner, &Operation::GetBalance { address: addr("b") })
            .unwrap();
        assert_eq!(balance.value, CallValue::U64(50));
        assert!(balance.events.is_empty());

        let ty = ledger
            .execute(&owner, &Operation::GetCollateralType { address: owner.clone() })
            .unwrap();
        assert_eq!(ty.value, CallValue::Collateral(CollateralType::Fiat));

        let who = ledger.execute(&addr("x"), &Operation::GetOwner).unwrap();
        assert_eq!(who.value, CallValue::Text("owner".into()));
    }

    #[test]
    fn execute_propagates_rejections() {
        let ledger = ledger();
        ledger.execute(&addr("owner"), &Operation::Initialize).unwrap();
        let err = ledger
            .execute(&addr("mallory"), &Operation::Pause)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));
    }

    #[test]
    fn call_values_render_plainly() {
        assert_eq!(CallValue::U64(7).to_string(), "7");
        assert_eq!(CallValue::Bool(false).to_string(), "false");
        assert_eq!(CallValue::Collateral(CollateralType::Binom).to_string(), "BINOM");
        assert_eq!(CallValue::Unit.to_string(), "");
        assert_eq!(serde_json::to_string(&CallValue::U64(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&CallValue::Unit).unwrap(), "null");
    }
}
