use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use moneta_core::CategoryKind;

mod commands;
mod prompt;

#[derive(Parser)]
#[command(name = "moneta", version, about = "Move bank statement entries into a remote wallet")]
pub struct Cli {
    /// Folder holding downloaded bank statements.
    #[arg(long, global = true, default_value = "./bank_statements", env = "MONETA_STATEMENTS")]
    pub statements: PathBuf,

    /// Preset rules file; defaults to presets.toml in the data directory.
    #[arg(long, global = true, env = "MONETA_PRESETS")]
    pub presets: Option<PathBuf>,

    /// Wallet to operate on; chosen interactively when omitted.
    #[arg(long, global = true, env = "MONETA_WALLET")]
    pub wallet: Option<String>,

    /// Account email for the wallet service; prompted when needed.
    #[arg(long, global = true, env = "MONETA_EMAIL")]
    pub email: Option<String>,

    /// Drop the cached category listing and fetch it again.
    #[arg(long, global = true)]
    pub refresh: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List wallets with their balance and currency.
    Wallets,
    /// Classify the latest statement against the wallet and presets.
    Report,
    /// Push classified statement rows into the wallet.
    Transfer,
    /// Show wallet entries for the current or previous month.
    Entries {
        /// Show the previous calendar month instead.
        #[arg(long)]
        previous: bool,
    },
    /// Browse a wallet's category hierarchy.
    Categories {
        #[arg(long, value_enum, default_value_t = KindArg::Expense)]
        kind: KindArg,
    },
    /// List preset rules and check their category names.
    Presets,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Expense,
    Income,
    DebtLoan,
}

impl From<KindArg> for CategoryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Expense => CategoryKind::Expense,
            KindArg::Income => CategoryKind::Income,
            KindArg::DebtLoan => CategoryKind::DebtLoan,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    commands::run(Cli::parse())
}
