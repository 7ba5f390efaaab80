pub mod engine;
pub mod ports;
pub mod tree;

pub use engine::{ReconcileError, ReconcileRow, Reconciler, Resolution, RowStatus};
pub use ports::{Prompt, WalletService};
pub use tree::{CategoryTree, PickerOutcome, PickerView, Selection, TreePicker};
