use moneta_core::{CategoryKind, DateRange, LedgerEntry};
use moneta_ledger::{LedgerClient, LedgerError, NewEntry};

use crate::engine::ReconcileRow;
use crate::tree::CategoryTree;

/// The wallet operations the engine needs. The HTTP client implements
/// this; tests substitute a scripted stub so runs need no network.
pub trait WalletService {
    fn entries(&self, wallet_id: &str, range: DateRange) -> Result<Vec<LedgerEntry>, LedgerError>;
    fn record(&self, entry: &NewEntry) -> Result<(), LedgerError>;
}

impl WalletService for LedgerClient {
    fn entries(&self, wallet_id: &str, range: DateRange) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.transactions(wallet_id, range)
    }

    fn record(&self, entry: &NewEntry) -> Result<(), LedgerError> {
        self.add_transaction(entry).map(|_| ())
    }
}

/// User decisions the engine needs mid-run. The CLI renders real prompts;
/// tests script the answers. Prompts block until an answer arrives.
pub trait Prompt {
    /// Whether to push the listed preset-matched rows to the wallet.
    fn confirm_transfer(&mut self, rows: &[&ReconcileRow]) -> bool;
    /// Whether to walk the listed unresolved rows one by one.
    fn confirm_manual(&mut self, rows: &[&ReconcileRow]) -> bool;
    /// Kind for a manually entered row; `None` skips the row.
    fn choose_kind(&mut self, row: &ReconcileRow) -> Option<CategoryKind>;
    /// Category picked from the tree; `None` skips the row.
    fn choose_category(&mut self, tree: &CategoryTree) -> Option<String>;
    /// Free-text note for a manually entered row.
    fn note_for(&mut self, row: &ReconcileRow) -> String;
}
