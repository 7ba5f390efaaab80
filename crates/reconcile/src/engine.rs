use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info, warn};

use moneta_core::{BankTransaction, Category, CategoryKind, DateRange, LedgerEntry, Money};
use moneta_import::PresetBook;
use moneta_ledger::{LedgerError, NewEntry};

use crate::ports::{Prompt, WalletService};
use crate::tree::CategoryTree;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// A resolved category name has no id in this wallet. Fatal for the
    /// row and for the rest of the transfer batch.
    #[error("no {kind} category named {name:?} in this wallet")]
    UnknownCategory { name: String, kind: CategoryKind },
}

/// Terminal classification of one statement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// Amount and date both already appear in the wallet.
    InLedger,
    /// Classified by a preset or by hand; carries a resolution.
    AutoMatched,
    RequiresManualEntry,
}

/// Classification attached to a row by a preset or by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub note: String,
    pub category: String,
    pub kind: CategoryKind,
}

/// A statement row carried through the reconciliation passes. Created per
/// run and discarded with it.
#[derive(Debug, Clone)]
pub struct ReconcileRow {
    pub index: usize,
    pub transaction: BankTransaction,
    pub in_ledger: bool,
    pub has_preset: bool,
    pub resolution: Option<Resolution>,
}

impl ReconcileRow {
    /// Dedup outranks a preset match: a row already in the wallet stays
    /// `InLedger` even when a preset also matched it.
    pub fn status(&self) -> RowStatus {
        if self.in_ledger {
            RowStatus::InLedger
        } else if self.resolution.is_some() {
            RowStatus::AutoMatched
        } else {
            RowStatus::RequiresManualEntry
        }
    }
}

/// Drives the dedup, preset, manual and transfer passes for one wallet.
///
/// Presets and the category listing are loaded by the caller and passed in
/// by reference, so the passes run without touching the network or the
/// filesystem.
pub struct Reconciler<'a> {
    wallet_id: String,
    presets: &'a PresetBook,
    categories: &'a [Category],
}

impl<'a> Reconciler<'a> {
    pub fn new(
        wallet_id: impl Into<String>,
        presets: &'a PresetBook,
        categories: &'a [Category],
    ) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            presets,
            categories,
        }
    }

    /// Dedup and preset passes. Both flags are computed for every row;
    /// neither pass short-circuits the other.
    pub fn classify(
        &self,
        transactions: &[BankTransaction],
        ledger: &[LedgerEntry],
    ) -> Vec<ReconcileRow> {
        let amounts: HashSet<Money> = ledger.iter().map(|entry| entry.amount).collect();
        let dates: HashSet<NaiveDate> = ledger.iter().map(|entry| entry.date).collect();

        transactions
            .iter()
            .enumerate()
            .map(|(index, tx)| {
                // Amount and date membership are tested independently, so
                // two different ledger entries can satisfy one test each.
                let in_ledger = amounts.contains(&tx.amount) && dates.contains(&tx.date);
                let preset = self.presets.matches(tx);
                ReconcileRow {
                    index,
                    transaction: tx.clone(),
                    in_ledger,
                    has_preset: preset.is_some(),
                    resolution: preset.map(|rule| Resolution {
                        note: rule.label.note.clone(),
                        category: rule.label.category.clone(),
                        kind: rule.label.kind,
                    }),
                }
            })
            .collect()
    }

    /// Resolves a category name and kind to an id within this wallet.
    /// Several matches pick the first, with a warning; none is an error.
    pub fn category_id(
        &self,
        name: &str,
        kind: CategoryKind,
    ) -> Result<&str, ReconcileError> {
        let mut matches = self.categories.iter().filter(|category| {
            category.wallet_id == self.wallet_id && category.name == name && category.kind == kind
        });
        let first = matches.next().ok_or_else(|| ReconcileError::UnknownCategory {
            name: name.to_string(),
            kind,
        })?;
        let extra = matches.count();
        if extra > 0 {
            warn!(
                name,
                matches = extra + 1,
                "category name is ambiguous, using the first match"
            );
        }
        Ok(&first.id)
    }

    /// Pushes the given resolved rows to the wallet in row order. An
    /// unresolvable category aborts this and every following row.
    pub fn transfer<W: WalletService>(
        &self,
        service: &W,
        rows: &[&ReconcileRow],
    ) -> Result<usize, ReconcileError> {
        let mut recorded = 0;
        for row in rows {
            let Some(resolution) = &row.resolution else {
                continue;
            };
            let category_id = match self.category_id(&resolution.category, resolution.kind) {
                Ok(id) => id,
                Err(err) => {
                    error!(
                        category = %resolution.category,
                        "not a valid category name for this wallet"
                    );
                    return Err(err);
                }
            };
            service.record(&NewEntry {
                wallet_id: self.wallet_id.clone(),
                category_id: category_id.to_string(),
                amount: row.transaction.amount,
                note: resolution.note.clone(),
                date: row.transaction.date,
            })?;
            info!(
                row = row.index,
                note = %resolution.note,
                amount = %row.transaction.amount,
                "recorded in wallet"
            );
            recorded += 1;
        }
        Ok(recorded)
    }

    /// Interactive pass over rows neither dedup nor presets resolved.
    /// Skipped rows stay unresolved; completed rows are recorded
    /// immediately and gain a resolution.
    pub fn manual_entries<W: WalletService, P: Prompt>(
        &self,
        service: &W,
        prompt: &mut P,
        rows: &mut [ReconcileRow],
    ) -> Result<usize, ReconcileError> {
        let mut recorded = 0;
        for row in rows
            .iter_mut()
            .filter(|row| !row.in_ledger && !row.has_preset)
        {
            let Some(kind) = prompt.choose_kind(row) else {
                continue;
            };
            let tree = CategoryTree::build(&self.categories_of_kind(kind));
            let Some(category) = prompt.choose_category(&tree) else {
                continue;
            };
            let note = prompt.note_for(row);
            let category_id = self.category_id(&category, kind)?.to_string();
            service.record(&NewEntry {
                wallet_id: self.wallet_id.clone(),
                category_id,
                amount: row.transaction.amount,
                note: note.clone(),
                date: row.transaction.date,
            })?;
            row.resolution = Some(Resolution {
                note,
                category,
                kind,
            });
            recorded += 1;
        }
        Ok(recorded)
    }

    /// The full run: fetch the period's ledger entries, classify, push the
    /// preset batch after confirmation, then walk the leftovers. Returns
    /// every row in its final state.
    pub fn run<W: WalletService, P: Prompt>(
        &self,
        service: &W,
        prompt: &mut P,
        transactions: &[BankTransaction],
        range: DateRange,
    ) -> Result<Vec<ReconcileRow>, ReconcileError> {
        let ledger = service.entries(&self.wallet_id, range)?;
        let mut rows = self.classify(transactions, &ledger);

        let matched: Vec<&ReconcileRow> = rows
            .iter()
            .filter(|row| !row.in_ledger && row.has_preset)
            .collect();
        if !matched.is_empty() && prompt.confirm_transfer(&matched) {
            self.transfer(service, &matched)?;
        }

        let wants_manual = {
            let pending: Vec<&ReconcileRow> = rows
                .iter()
                .filter(|row| row.status() == RowStatus::RequiresManualEntry)
                .collect();
            !pending.is_empty() && prompt.confirm_manual(&pending)
        };
        if wants_manual {
            self.manual_entries(service, prompt, &mut rows)?;
        }

        Ok(rows)
    }

    fn categories_of_kind(&self, kind: CategoryKind) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|category| category.wallet_id == self.wallet_id && category.kind == kind)
            .cloned()
            .collect()
    }
}
