//! Wallet balance arithmetic

use rust_decimal::Decimal;
use std::str::FromStr;

use super::types::Account;
use crate::error::LedgerError;

/// Parse a user-entered amount. Empty input is a missing field; anything
/// that is not a positive decimal is an invalid amount.
pub fn parse_amount(input: &str) -> Result<Decimal, LedgerError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LedgerError::MissingFields);
    }
    let amount = Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .map_err(|_| LedgerError::InvalidAmount)?;
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(amount.normalize())
}

/// Credit (add) to an account's balance. Returns the new balance.
pub fn credit_balance(account: &mut Account, amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount);
    }
    let new_balance = account
        .balance()
        .checked_add(amount)
        .ok_or(LedgerError::InvalidAmount)?;
    account.balance = Some(new_balance);
    Ok(new_balance)
}

/// Debit (subtract) from an account's balance. Never goes below zero.
pub fn debit_balance(account: &mut Account, amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount);
    }
    let current = account.balance();
    if current < amount {
        return Err(LedgerError::InsufficientBalance);
    }
    let new_balance = current - amount;
    account.balance = Some(new_balance);
    Ok(new_balance)
}
