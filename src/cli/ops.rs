use super::require_role;
use crate::account::{Role, StudentBalance};
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::storage::Storage;

pub fn handle_credit_command<S: Storage>(
    ledger: &Ledger<S>,
    student: &str,
    amount: &str,
) -> Result<(), LedgerError> {
    let session = require_role(ledger, Role::Admin)?;
    let students = ledger.credit(&session, student, amount)?;
    println!("Added {} V-Coins to {}", amount.trim(), student);
    print_balances(&students);
    Ok(())
}

pub fn handle_students_command<S: Storage>(ledger: &Ledger<S>) -> Result<(), LedgerError> {
    require_role(ledger, Role::Admin)?;
    print_balances(&ledger.students()?);
    Ok(())
}

pub fn handle_feed_command<S: Storage>(ledger: &Ledger<S>) -> Result<(), LedgerError> {
    let session = require_role(ledger, Role::Vendor)?;
    let feed = ledger.vendor_feed(&session)?;
    println!("Total Transactions: {}", feed.count());
    println!("Total Amount: {:.2}", feed.total_volume());
    if feed.entries.is_empty() {
        println!("No transactions yet");
    }
    for entry in &feed.entries {
        println!(
            "  {}\t{}\t{}\t{:.2}",
            entry.date,
            entry.student,
            entry.vendor,
            entry.amount.abs()
        );
    }
    Ok(())
}

fn print_balances(students: &[StudentBalance]) {
    if students.is_empty() {
        println!("No students found");
    }
    for s in students {
        println!("  {}\t{} V-Coins", s.username, s.balance);
    }
}
