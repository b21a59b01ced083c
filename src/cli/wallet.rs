use super::require_role;
use crate::account::{Role, Transaction};
use crate::config::VendorEntry;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::storage::Storage;

pub fn handle_pay<S: Storage>(
    ledger: &Ledger<S>,
    vendor: &str,
    amount: &str,
    pin: &str,
) -> Result<(), LedgerError> {
    let session = require_role(ledger, Role::Student)?;
    let view = ledger.pay(&session, vendor, amount, pin)?;
    if let Some(tx) = view.transactions.first() {
        println!("Payment Successful: {:.2} paid to {}", tx.amount.abs(), tx.vendor);
    }
    println!("Wallet balance: {:.2}", view.balance);
    Ok(())
}

pub fn handle_history<S: Storage>(ledger: &Ledger<S>) -> Result<(), LedgerError> {
    let session = require_role(ledger, Role::Student)?;
    let view = ledger.wallet(&session)?;
    println!("Wallet balance: {:.2}", view.balance);
    if view.transactions.is_empty() {
        println!("No transactions yet");
    }
    for tx in &view.transactions {
        print_transaction(tx);
    }
    Ok(())
}

pub fn handle_vendors(vendors: &[VendorEntry]) {
    println!("Vendors Nearby:");
    for v in vendors {
        println!("  {}\t{}", v.name, v.distance);
    }
}

fn print_transaction(tx: &Transaction) {
    println!("  {}\t{}\t{:.2}", tx.date, tx.vendor, tx.amount);
}
