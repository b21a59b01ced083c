//! Account system
//!
//! Username-keyed account records with:
//! - Role-checked password login
//! - Four-digit payment PINs set through a two-step confirmation
//! - Wallet balances and a newest-first debit history

pub mod types;
pub mod store;
pub mod balance;
pub mod auth;
pub mod pin;

pub use types::{Account, AccountId, Pin, Role, Transaction};
pub use store::{AccountStore, StudentBalance};
pub use balance::{credit_balance, debit_balance, parse_amount};
pub use auth::verify_credentials;
pub use pin::{PinSetup, PinStep};
