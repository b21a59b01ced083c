//! Vendor view: every student payment in one newest-first list.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::account::{AccountId, AccountStore};

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FeedEntry {
    pub student: AccountId,
    pub date: NaiveDate,
    pub vendor: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct VendorFeed {
    pub entries: Vec<FeedEntry>,
}

impl VendorFeed {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Sum of absolute amounts across the feed
    pub fn total_volume(&self) -> Decimal {
        self.entries.iter().map(|e| e.amount.abs()).sum()
    }
}

/// Flatten the history of every student account and sort it by date,
/// newest first. Entries on the same day keep their stored order.
pub fn aggregate(store: &AccountStore) -> VendorFeed {
    let mut entries: Vec<FeedEntry> = store
        .students()
        .flat_map(|(username, account)| {
            account.transactions.iter().map(move |tx| FeedEntry {
                student: username.clone(),
                date: tx.date,
                vendor: tx.vendor.clone(),
                amount: tx.amount,
            })
        })
        .collect();

    // Vec::sort_by is stable
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    VendorFeed { entries }
}
