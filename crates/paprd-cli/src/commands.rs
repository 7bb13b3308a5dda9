use anyhow::{bail, Context};
use colored::Colorize;
use paprd_ledger::{CallValue, Ledger, LedgerConfig, Operation, Response};
use paprd_store::{JsonFileStore, StateDigest};
use paprd_types::Address;
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => LedgerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    let store = JsonFileStore::open(&cli.state)
        .with_context(|| format!("opening state file {}", cli.state.display()))?;
    debug!(state = %cli.state.display(), entries = store.len(), "state loaded");
    let ledger = Ledger::with_config(store, config)?;

    match &cli.command {
        Command::Info => cmd_info(&ledger, cli.format),
        Command::Audit => cmd_audit(&ledger, cli.format),
        Command::Digest => cmd_digest(&ledger, cli.format),
        command => {
            let op = to_operation(command).context("subcommand has no ledger operation")?;
            cmd_execute(&ledger, cli.caller.as_ref(), &op, cli.format)
        }
    }
}

/// The ledger operation a subcommand stands for. `None` for the
/// host-side commands (`info`, `audit`, `digest`).
pub fn to_operation(command: &Command) -> Option<Operation> {
    let op = match command {
        Command::Init => Operation::Initialize,
        Command::Balance(a) => Operation::GetBalance {
            address: a.address.clone(),
        },
        Command::Supply => Operation::GetTotalSupply,
        Command::Collateral(a) => Operation::GetCollateralBalance {
            address: a.address.clone(),
            collateral_type: a.collateral_type,
        },
        Command::CollateralType(a) => Operation::GetCollateralType {
            address: a.address.clone(),
        },
        Command::Ratio => Operation::GetCollateralRatio,
        Command::Reserve => Operation::GetFiatReserve,
        Command::Owner => Operation::GetOwner,
        Command::Paused => Operation::IsPaused,
        Command::Blacklisted(a) => Operation::IsBlacklisted {
            address: a.address.clone(),
        },
        Command::Minter(a) => Operation::IsMinter {
            address: a.address.clone(),
        },
        Command::Transfer(a) => Operation::Transfer {
            to: a.to.clone(),
            amount: a.amount,
        },
        Command::Mint(a) => Operation::Mint {
            to: a.to.clone(),
            amount: a.amount,
        },
        Command::Burn(a) => Operation::Burn { amount: a.amount },
        Command::AddCollateral(a) => Operation::AddCollateral {
            amount: a.amount,
            collateral_type: a.collateral_type,
        },
        Command::RemoveCollateral(a) => Operation::RemoveCollateral { amount: a.amount },
        Command::AddMinter(a) => Operation::AddMinter {
            address: a.address.clone(),
        },
        Command::RemoveMinter(a) => Operation::RemoveMinter {
            address: a.address.clone(),
        },
        Command::Blacklist(a) => Operation::Blacklist {
            address: a.address.clone(),
        },
        Command::Unblacklist(a) => Operation::Unblacklist {
            address: a.address.clone(),
        },
        Command::Pause => Operation::Pause,
        Command::Unpause => Operation::Unpause,
        Command::SetRatio(a) => Operation::SetCollateralRatio { ratio: a.ratio },
        Command::SetBinomAddress(a) => Operation::SetBinomTokenAddress {
            address: a.address.clone(),
        },
        Command::TransferOwnership(a) => Operation::TransferOwnership {
            new_owner: a.address.clone(),
        },
        Command::Info | Command::Audit | Command::Digest => return None,
    };
    Some(op)
}

fn cmd_execute(
    ledger: &Ledger<JsonFileStore>,
    caller: Option<&Address>,
    op: &Operation,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let caller = match caller {
        Some(caller) => caller.clone(),
        None if op.is_mutating() => {
            bail!("{op} needs a caller: pass --caller or set PAPRD_CALLER")
        }
        None => Address::empty(),
    };

    let response = match ledger.execute(&caller, op) {
        Ok(response) => response,
        Err(err) => {
            if format == OutputFormat::Json {
                println!(
                    "{}",
                    json!({ "op": op.name(), "error": err.kind(), "message": err.to_string() })
                );
            }
            return Err(anyhow::Error::new(err).context(format!("{op} rejected")));
        }
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "op": op.name(),
                    "value": response.value,
                    "events": response.events,
                }))?
            );
        }
        OutputFormat::Text => print_response(op, &response)?,
    }
    Ok(())
}

fn print_response(op: &Operation, response: &Response) -> anyhow::Result<()> {
    if !op.is_mutating() {
        match &response.value {
            CallValue::Text(text) if text.is_empty() => println!("{}", "(none)".dimmed()),
            value => println!("{value}"),
        }
        return Ok(());
    }

    if matches!(op, Operation::Initialize) && response.events.is_empty() {
        println!("{} Ledger already initialized.", "•".yellow());
        return Ok(());
    }
    println!("{} {}", "✓".green().bold(), op.name().bold());
    for event in &response.events {
        println!(
            "  {} {}",
            event.name().cyan(),
            serde_json::to_string(event)?.dimmed()
        );
    }
    Ok(())
}

fn cmd_info(ledger: &Ledger<JsonFileStore>, format: OutputFormat) -> anyhow::Result<()> {
    let token = ledger.token_metadata();
    let initialized = ledger.is_initialized()?;
    let owner = ledger.get_owner()?;
    let binom = ledger.get_binom_token_address()?;
    let paused = ledger.is_paused()?;
    let supply = ledger.get_total_supply()?;
    let ratio = ledger.get_collateral_ratio()?;
    let reserve = ledger.get_fiat_reserve()?;

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "token": token,
                "initialized": initialized,
                "owner": owner,
                "paused": paused,
                "totalSupply": supply,
                "collateralRatio": ratio,
                "fiatReserve": reserve,
                "binomTokenAddress": binom,
                "state": ledger.store().path().display().to_string(),
            }))?
        );
        return Ok(());
    }

    let or_none = |a: &Address| {
        if a.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            a.to_string()
        }
    };
    println!(
        "{} ({}, {} decimals)",
        token.name.bold(),
        token.symbol.cyan(),
        token.decimals
    );
    println!("  State:        {}", ledger.store().path().display());
    println!("  Owner:        {}", or_none(&owner));
    let status = if !initialized {
        "uninitialized".yellow()
    } else if paused {
        "paused".red()
    } else {
        "active".green()
    };
    println!("  Status:       {status}");
    println!("  Supply:       {supply}");
    println!("  Ratio:        {ratio}%");
    println!("  Fiat reserve: {reserve}");
    println!("  BINOM token:  {}", or_none(&binom));
    Ok(())
}

fn cmd_audit(ledger: &Ledger<JsonFileStore>, format: OutputFormat) -> anyhow::Result<()> {
    let report = ledger.audit()?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Accounts:        {}", report.accounts);
        println!(
            "Total supply:    {} (balances sum to {})",
            report.total_supply, report.balance_sum
        );
        println!(
            "Fiat reserve:    {} (FIAT collateral sums to {})",
            report.fiat_reserve, report.fiat_collateral_sum
        );
        println!("Collateral ratio: {}%", report.collateral_ratio);
        for v in &report.violations {
            println!("  {} {}: {}", "!".yellow().bold(), v.kind, v.description);
        }
        if report.is_consistent() {
            println!("{} State is consistent", "✓".green().bold());
        }
    }

    if !report.is_consistent() {
        bail!("state is inconsistent");
    }
    Ok(())
}

fn cmd_digest(ledger: &Ledger<JsonFileStore>, format: OutputFormat) -> anyhow::Result<()> {
    let digest = StateDigest::of(ledger.store())?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "digest": digest.to_hex(), "entries": ledger.store().len() })
        ),
        OutputFormat::Text => println!("{digest}"),
    }
    Ok(())
}
