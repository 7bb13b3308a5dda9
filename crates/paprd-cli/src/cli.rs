use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use paprd_types::{Address, CollateralType};

#[derive(Parser)]
#[command(
    name = "paprd",
    about = "PAPRD ledger: collateral-backed stablecoin state engine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON state file
    #[arg(long, global = true, default_value = "paprd-state.json")]
    pub state: PathBuf,

    /// Identity the operation runs as
    #[arg(long, global = true, env = "PAPRD_CALLER")]
    pub caller: Option<Address>,

    /// TOML ledger configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize the ledger with the caller as owner
    Init,
    /// Show an account's token balance
    Balance(AddressArgs),
    /// Show the total token supply
    Supply,
    /// Show an account's collateral of one type
    Collateral(CollateralArgs),
    /// Show an account's active collateral type
    CollateralType(AddressArgs),
    /// Show the collateral ratio (percent)
    Ratio,
    /// Show the fiat reserve
    Reserve,
    /// Show the owner
    Owner,
    /// Show whether the ledger is paused
    Paused,
    /// Show whether an address is blacklisted
    Blacklisted(AddressArgs),
    /// Show whether an address is a minter
    Minter(AddressArgs),
    /// Summarize ledger-wide state
    Info,
    /// Transfer tokens from the caller
    Transfer(TransferArgs),
    /// Mint tokens to an account (minters only)
    Mint(TransferArgs),
    /// Burn the caller's tokens
    Burn(AmountArgs),
    /// Deposit collateral for the caller
    AddCollateral(AddCollateralArgs),
    /// Withdraw the caller's active collateral
    RemoveCollateral(AmountArgs),
    /// Grant minting rights (owner only)
    AddMinter(AddressArgs),
    /// Revoke minting rights (owner only)
    RemoveMinter(AddressArgs),
    /// Blacklist an address (owner only)
    Blacklist(AddressArgs),
    /// Lift a blacklist entry (owner only)
    Unblacklist(AddressArgs),
    /// Pause value operations (owner only)
    Pause,
    /// Resume value operations (owner only)
    Unpause,
    /// Set the collateral ratio in percent (owner only)
    SetRatio(RatioArgs),
    /// Record the BINOM token address (owner only)
    SetBinomAddress(AddressArgs),
    /// Hand ownership to another address (owner only)
    TransferOwnership(AddressArgs),
    /// Check supply and reserve aggregates against account entries
    Audit,
    /// Print the BLAKE3 digest of the full state
    Digest,
}

#[derive(Args)]
pub struct AddressArgs {
    pub address: Address,
}

#[derive(Args)]
pub struct CollateralArgs {
    pub address: Address,
    #[arg(long = "type", default_value = "fiat")]
    pub collateral_type: CollateralType,
}

#[derive(Args)]
pub struct TransferArgs {
    pub to: Address,
    pub amount: u64,
}

#[derive(Args)]
pub struct AmountArgs {
    pub amount: u64,
}

#[derive(Args)]
pub struct AddCollateralArgs {
    pub amount: u64,
    #[arg(long = "type", default_value = "fiat")]
    pub collateral_type: CollateralType,
}

#[derive(Args)]
pub struct RatioArgs {
    pub ratio: u64,
}
