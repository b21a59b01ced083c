pub mod ops;
pub mod session;
pub mod wallet;

use clap::{Parser, Subcommand};

use crate::account::Role;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::session::Session;
use crate::storage::Storage;

#[derive(Parser)]
#[command(name = "vpay")]
#[command(about = "V-Pay campus wallet", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "vpay.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the default accounts (first run only)
    Seed,
    /// Log in with username, password and role
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// student, vendor or admin
        #[arg(long)]
        role: String,
    },
    /// End the current session
    Logout,
    /// Show the current session and its home screen
    Whoami,
    /// Resolve which screen a path leads to for the current session
    Route {
        path: String,
    },
    /// Set the payment PIN (prompts twice unless both values are given)
    SetPin {
        #[arg(long)]
        pin: Option<String>,
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Pay a vendor from the student wallet
    Pay {
        #[arg(long)]
        vendor: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        pin: String,
    },
    /// Show wallet balance and payment history
    History,
    /// List nearby vendors
    Vendors,
    /// Add funds to a student wallet (admin)
    Credit {
        #[arg(long)]
        student: String,
        #[arg(long)]
        amount: String,
    },
    /// List student balances (admin)
    Students,
    /// Show all student payments (vendor)
    Feed,
}

/// Current session, or `NotLoggedIn`.
pub(crate) fn require_session<S: Storage>(ledger: &Ledger<S>) -> Result<Session, LedgerError> {
    ledger.current_session()?.ok_or(LedgerError::NotLoggedIn)
}

/// Current session, which must carry `role`.
pub(crate) fn require_role<S: Storage>(ledger: &Ledger<S>, role: Role) -> Result<Session, LedgerError> {
    let session = require_session(ledger)?;
    session.require(role)?;
    Ok(session)
}
