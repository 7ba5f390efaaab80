pub mod category;
pub mod money;
pub mod period;
pub mod transaction;
pub mod wallet;

pub use category::{Category, CategoryKind};
pub use money::Money;
pub use period::DateRange;
pub use transaction::{BankTransaction, Direction, LedgerEntry};
pub use wallet::Wallet;
