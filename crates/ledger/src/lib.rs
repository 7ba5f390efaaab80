pub mod cache;
pub mod client;
pub mod error;
pub mod token;

pub use cache::CategoryCache;
pub use client::{login, Credentials, LedgerClient, NewEntry};
pub use error::LedgerError;
pub use token::TokenCache;
