use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::{Input, Password, Select};
use tracing::warn;

use moneta_core::{Category, CategoryKind, DateRange, Wallet};
use moneta_import::{IngParser, PresetBook, Statement, StatementParser};
use moneta_ledger::{CategoryCache, Credentials, LedgerClient, LedgerError, TokenCache};
use moneta_reconcile::{CategoryTree, Reconciler, RowStatus};

use crate::prompt::{self, CliPrompt};
use crate::{Cli, Command};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Wallets => wallets(&cli),
        Command::Report => report(&cli),
        Command::Transfer => transfer(&cli),
        Command::Entries { previous } => entries(&cli, previous),
        Command::Categories { kind } => categories(&cli, kind.into()),
        Command::Presets => presets(&cli),
    }
}

/// Everything a wallet-scoped command needs: a logged-in client, the
/// chosen wallet and the (cached) category listing for all wallets.
struct Session {
    client: LedgerClient,
    wallet: Wallet,
    categories: Vec<Category>,
}

fn data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("nl", "moneta", "moneta")
        .context("could not determine a data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

fn connect(cli: &Cli) -> Result<LedgerClient> {
    let token_cache = TokenCache::new(data_dir()?.join("access_token.txt"));
    let email = cli.email.clone();
    let client = LedgerClient::connect(&token_cache, move || {
        println!("Wallet service login required");
        let email = match email {
            Some(email) => email,
            None => ask("E-mail")?,
        };
        let password = Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|err| LedgerError::Io(io::Error::other(err)))?;
        Ok(Credentials { email, password })
    })?;
    Ok(client)
}

fn ask(prompt: &str) -> Result<String, LedgerError> {
    Input::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(|err| LedgerError::Io(io::Error::other(err)))
}

fn open_session(cli: &Cli) -> Result<Session> {
    let client = connect(cli)?;
    let wallets = client.wallets()?;
    if wallets.is_empty() {
        bail!("the account has no wallets");
    }

    let category_cache = CategoryCache::new(data_dir()?.join("categories.json"));
    let categories = if cli.refresh {
        category_cache.refresh(&client, &wallets)?
    } else {
        category_cache.load_or_fetch(&client, &wallets)?
    };

    let wallet = choose_wallet(wallets, cli.wallet.as_deref())?;
    Ok(Session {
        client,
        wallet,
        categories,
    })
}

fn choose_wallet(mut wallets: Vec<Wallet>, name: Option<&str>) -> Result<Wallet> {
    if let Some(name) = name {
        return wallets
            .into_iter()
            .find(|wallet| wallet.name == name)
            .with_context(|| format!("no wallet named {name:?}"));
    }

    let labels: Vec<String> = wallets.iter().map(Wallet::to_string).collect();
    let index = Select::new()
        .with_prompt("Select a wallet")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(wallets.swap_remove(index))
}

fn load_presets(cli: &Cli, categories: &[Category]) -> Result<PresetBook> {
    let path = match &cli.presets {
        Some(path) => path.clone(),
        None => data_dir()?.join("presets.toml"),
    };
    let book = PresetBook::load(&path)
        .with_context(|| format!("could not load presets from {}", path.display()))?;

    let known: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    for name in book.unknown_categories(&known) {
        warn!(category = name, "preset names a category the wallets do not have");
    }
    Ok(book)
}

fn load_statement(cli: &Cli) -> Result<Statement> {
    IngParser.load(&cli.statements).with_context(|| {
        format!(
            "could not load a bank statement from {}",
            cli.statements.display()
        )
    })
}

fn wallets(cli: &Cli) -> Result<()> {
    let client = connect(cli)?;
    println!("Your wallets:");
    for wallet in client.wallets()? {
        println!("  {wallet}");
    }
    Ok(())
}

fn report(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let presets = load_presets(cli, &session.categories)?;
    let statement = load_statement(cli)?;

    let ledger = session
        .client
        .transactions(&session.wallet.id, statement.range)?;
    let engine = Reconciler::new(&session.wallet.id, &presets, &session.categories);
    let rows = engine.classify(&statement.transactions, &ledger);

    println!(
        "Statement {} against wallet {:?}:",
        statement.range, session.wallet.name
    );
    prompt::print_report(&rows);
    Ok(())
}

fn transfer(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let presets = load_presets(cli, &session.categories)?;
    let statement = load_statement(cli)?;

    let engine = Reconciler::new(&session.wallet.id, &presets, &session.categories);
    let mut cli_prompt = CliPrompt;
    let rows = engine.run(
        &session.client,
        &mut cli_prompt,
        &statement.transactions,
        statement.range,
    )?;

    let unresolved: Vec<_> = rows
        .iter()
        .filter(|row| row.status() == RowStatus::RequiresManualEntry)
        .collect();
    if unresolved.is_empty() {
        println!("{}", "All statement rows are accounted for.".green());
    } else {
        println!("\n{} rows left unresolved:", unresolved.len());
        for row in unresolved {
            println!("{}", prompt::row_line(row, "skipped").red());
        }
    }
    Ok(())
}

fn entries(cli: &Cli, previous: bool) -> Result<()> {
    let session = open_session(cli)?;
    let today = chrono::Local::now().date_naive();
    let range = if previous {
        DateRange::previous_month(today)
    } else {
        DateRange::month_to_date(today)
    };

    let entries = session.client.transactions(&session.wallet.id, range)?;
    println!("Entries in {:?} for {}:", session.wallet.name, range);
    for entry in &entries {
        println!(
            "  {}  {:>10}  {:<20}  {}",
            entry.date,
            entry.amount.to_string(),
            entry.category.as_deref().unwrap_or("-"),
            entry.note.as_deref().unwrap_or("")
        );
    }
    if entries.is_empty() {
        println!("  (none)");
    }
    Ok(())
}

fn categories(cli: &Cli, kind: CategoryKind) -> Result<()> {
    let session = open_session(cli)?;
    let of_kind: Vec<Category> = session
        .categories
        .iter()
        .filter(|category| category.wallet_id == session.wallet.id && category.kind == kind)
        .cloned()
        .collect();

    let tree = CategoryTree::build(&of_kind);
    match prompt::pick_category(&tree) {
        Some(name) => println!("Selected category: {name}"),
        None => println!("No category selected"),
    }
    Ok(())
}

fn presets(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let book = load_presets(cli, &session.categories)?;

    println!("{} preset rules:", book.len());
    for rule in book.rules() {
        let conditions: Vec<String> = rule
            .conditions
            .iter()
            .map(|(field, pattern)| format!("{field}~{pattern:?}"))
            .collect();
        println!(
            "  {:<40} -> {} ({}), note {:?}",
            conditions.join(", "),
            rule.label.category,
            rule.label.kind,
            rule.label.note
        );
    }

    let known: Vec<&str> = session.categories.iter().map(|c| c.name.as_str()).collect();
    let unknown = book.unknown_categories(&known);
    if unknown.is_empty() {
        println!("{}", "All preset categories exist in the wallets.".green());
    } else {
        println!("{}", "Presets naming unknown categories:".red());
        for name in unknown {
            println!("  {name}");
        }
    }
    Ok(())
}
