pub mod account;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod session;
pub mod storage;

pub use error::{LedgerError, StorageError};
pub use ledger::{Ledger, WalletView};
