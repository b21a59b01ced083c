//! Account type definitions

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Account identifier - the login username
pub type AccountId = String;

/// Role an account logs in with
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Vendor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "vendor" => Ok(Role::Vendor),
            "admin" => Ok(Role::Admin),
            other => Err(LedgerError::InvalidRole(other.to_string())),
        }
    }
}

/// Four-digit payment PIN
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct Pin(String);

impl Pin {
    pub const LENGTH: usize = 4;

    pub fn parse(value: &str) -> Result<Self, LedgerError> {
        if value.len() == Self::LENGTH && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Pin(value.to_string()))
        } else {
            Err(LedgerError::InvalidPinFormat)
        }
    }

    pub fn matches(&self, attempt: &str) -> bool {
        self.0 == attempt
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Pin {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pin::parse(&value)
    }
}

impl From<Pin> for String {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}

/// A single wallet debit, as shown in the history list
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub vendor: String,
    /// Negative for money leaving the student's wallet
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Stored account record. Field layout mirrors the persisted JSON blob:
/// optional fields are left out until first written.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Account {
    pub password: String,
    pub role: Role,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<Pin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<Transaction>,
}

impl Account {
    pub fn student(password: &str) -> Self {
        Self {
            password: password.to_string(),
            role: Role::Student,
            balance: Some(Decimal::ZERO),
            pin: None,
            transactions: Vec::new(),
        }
    }

    /// Vendor and admin accounts carry no balance.
    pub fn staff(password: &str, role: Role) -> Self {
        Self {
            password: password.to_string(),
            role,
            balance: None,
            pin: None,
            transactions: Vec::new(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance.unwrap_or(Decimal::ZERO)
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }
}
