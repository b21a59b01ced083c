//! Credential checks

use super::store::AccountStore;
use super::types::{Account, Role};
use crate::error::LedgerError;

/// Check a username/password/role triple against the store.
///
/// An unknown user, a wrong password and a role mismatch all fail with the
/// same `InvalidCredentials` so the caller learns nothing about which part
/// was wrong.
pub fn verify_credentials<'a>(
    store: &'a AccountStore,
    username: &str,
    password: &str,
    role: Role,
) -> Result<&'a Account, LedgerError> {
    if username.is_empty() || password.is_empty() {
        return Err(LedgerError::MissingFields);
    }

    let account = store.get(username).ok_or(LedgerError::InvalidCredentials)?;
    if account.password != password || account.role != role {
        return Err(LedgerError::InvalidCredentials);
    }
    Ok(account)
}
