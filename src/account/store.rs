//! Account storage and management

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{Account, AccountId, Role};
use crate::config::SeedConfig;
use crate::error::LedgerError;

/// Every account, keyed by username. Serialized as a plain JSON object so
/// the persisted blob is `{ "<username>": { ...account } }`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct AccountStore {
    accounts: BTreeMap<AccountId, Account>,
}

/// Row of the admin's balance overview
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct StudentBalance {
    pub username: AccountId,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub balance: Decimal,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the first-run population: numbered students plus one admin
    /// and one vendor.
    pub fn seeded(seed: &SeedConfig) -> Self {
        let mut store = Self::new();
        for n in 1..=seed.student_count {
            let id = seed.student_id(n);
            store.accounts.insert(id.clone(), Account::student(&id));
        }
        store.accounts.insert(
            seed.admin_username.clone(),
            Account::staff(&seed.admin_password, Role::Admin),
        );
        store.accounts.insert(
            seed.vendor_username.clone(),
            Account::staff(&seed.vendor_password, Role::Vendor),
        );
        store
    }

    /// Insert an account. Usernames are unique; an existing entry is replaced.
    pub fn insert(&mut self, name: impl Into<AccountId>, account: Account) -> Option<Account> {
        self.accounts.insert(name.into(), account)
    }

    pub fn get(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    /// Mutable lookup; a missing account is an error.
    pub fn require_mut(&mut self, name: &str) -> Result<&mut Account, LedgerError> {
        self.accounts
            .get_mut(name)
            .ok_or_else(|| LedgerError::AccountNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Student accounts in username order
    pub fn students(&self) -> impl Iterator<Item = (&AccountId, &Account)> {
        self.accounts.iter().filter(|(_, account)| account.is_student())
    }

    pub fn student_balances(&self) -> Vec<StudentBalance> {
        self.students()
            .map(|(username, account)| StudentBalance {
                username: username.clone(),
                balance: account.balance(),
            })
            .collect()
    }
}
