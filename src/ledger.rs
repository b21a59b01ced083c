//! Wallet operations over an injected storage backend.
//!
//! Every mutating call loads the whole account map, validates, applies the
//! change in memory and writes the whole map back. Nothing is written when a
//! check fails.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::account::{
    credit_balance, debit_balance, parse_amount, verify_credentials, AccountStore, Pin, PinSetup,
    PinStep, Role, StudentBalance, Transaction,
};
use crate::config::SeedConfig;
use crate::error::LedgerError;
use crate::feed::{aggregate, VendorFeed};
use crate::session::{route_after_login, Route, Session};
use crate::storage::{Storage, SESSION_KEY, USERS_KEY};

/// Balance and history shown on the student dashboard
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct WalletView {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub balance: Decimal,
    pub transactions: Vec<Transaction>,
}

pub struct Ledger<S: Storage> {
    storage: S,
    seed: SeedConfig,
}

impl<S: Storage> Ledger<S> {
    pub fn new(storage: S) -> Self {
        Self::with_seed(storage, SeedConfig::default())
    }

    pub fn with_seed(storage: S, seed: SeedConfig) -> Self {
        Self { storage, seed }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the account map. An absent blob reads as an empty store.
    pub fn load(&self) -> Result<AccountStore, LedgerError> {
        let store: Option<AccountStore> = self.storage.get_json(USERS_KEY)?;
        Ok(store.unwrap_or_default())
    }

    pub fn save(&self, store: &AccountStore) -> Result<(), LedgerError> {
        self.storage.put_json(USERS_KEY, store)?;
        Ok(())
    }

    /// Populate the default accounts on first run. Returns `false` without
    /// touching anything when a store already exists.
    pub fn seed(&self) -> Result<bool, LedgerError> {
        if self.storage.get_item(USERS_KEY)?.is_some() {
            debug!("Account store present, skipping seed");
            return Ok(false);
        }
        let store = AccountStore::seeded(&self.seed);
        self.save(&store)?;
        info!("Seeded {} accounts", store.len());
        Ok(true)
    }

    // ========== Session ==========

    /// Check credentials, persist the session and pick the first screen.
    pub fn login(&self, username: &str, password: &str, role: Role) -> Result<(Session, Route), LedgerError> {
        let store = self.load()?;
        let account = match verify_credentials(&store, username, password, role) {
            Ok(account) => account,
            Err(e) => {
                warn!("Login rejected for '{}': {}", username, e);
                return Err(e);
            }
        };

        let session = Session::new(username, role);
        self.storage.put_json(SESSION_KEY, &session)?;
        let route = route_after_login(&session, account);
        info!("{} logged in as {}, routed to {}", username, role, route);
        Ok((session, route))
    }

    pub fn logout(&self) -> Result<(), LedgerError> {
        self.storage.remove_item(SESSION_KEY)?;
        info!("Logged out");
        Ok(())
    }

    pub fn current_session(&self) -> Result<Option<Session>, LedgerError> {
        Ok(self.storage.get_json(SESSION_KEY)?)
    }

    /// Resolve a requested screen for whoever is logged in.
    pub fn resolve_route(&self, requested: Route) -> Result<Route, LedgerError> {
        let session = self.current_session()?;
        let store = self.load()?;
        let account = session.as_ref().and_then(|s| store.get(&s.username));
        Ok(crate::session::guard(requested, session.as_ref(), account))
    }

    // ========== PIN ==========

    /// Run both steps of PIN setup in one call.
    pub fn set_pin(&self, username: &str, first: &str, confirm: &str) -> Result<Route, LedgerError> {
        let mut setup = PinSetup::new();
        setup.submit(first)?;
        match self.complete_pin_setup(username, &mut setup, confirm)? {
            Some(route) => Ok(route),
            None => Err(LedgerError::PinMismatch),
        }
    }

    /// Feed one entry to an in-progress setup. Returns the next route once
    /// the PIN is persisted, or `None` while waiting for the confirm entry.
    pub fn complete_pin_setup(
        &self,
        username: &str,
        setup: &mut PinSetup,
        value: &str,
    ) -> Result<Option<Route>, LedgerError> {
        match setup.submit(value) {
            Ok(PinStep::ConfirmRequired) => Ok(None),
            Ok(PinStep::Confirmed(pin)) => {
                self.store_pin(username, pin)?;
                Ok(Some(Route::StudentDashboard))
            }
            Err(e) => {
                warn!("PIN setup for '{}' failed: {}", username, e);
                Err(e)
            }
        }
    }

    fn store_pin(&self, username: &str, pin: Pin) -> Result<(), LedgerError> {
        let mut store = self.load()?;
        let account = store.require_mut(username)?;
        account.pin = Some(pin);
        account.balance.get_or_insert(Decimal::ZERO);
        self.save(&store)?;
        info!("PIN set for {}", username);
        Ok(())
    }

    // ========== Admin ==========

    /// Add funds to an account. Credits are not recorded in the history.
    /// Returns the refreshed student list.
    pub fn credit(&self, session: &Session, target: &str, amount: &str) -> Result<Vec<StudentBalance>, LedgerError> {
        session.require(Role::Admin)?;
        if target.trim().is_empty() || amount.trim().is_empty() {
            return Err(LedgerError::MissingFields);
        }
        let amount = parse_amount(amount)?;

        let mut store = self.load()?;
        let account = store.require_mut(target)?;
        let new_balance = credit_balance(account, amount)?;
        self.save(&store)?;
        info!("Credited {} to {} (balance {})", amount, target, new_balance);

        Ok(store.student_balances())
    }

    pub fn students(&self) -> Result<Vec<StudentBalance>, LedgerError> {
        Ok(self.load()?.student_balances())
    }

    // ========== Student ==========

    pub fn wallet(&self, session: &Session) -> Result<WalletView, LedgerError> {
        session.require(Role::Student)?;
        let store = self.load()?;
        let account = store
            .get(&session.username)
            .ok_or_else(|| LedgerError::AccountNotFound(session.username.clone()))?;
        Ok(WalletView {
            balance: account.balance(),
            transactions: account.transactions.clone(),
        })
    }

    /// Pay a vendor today (UTC calendar date).
    pub fn pay(&self, session: &Session, vendor: &str, amount: &str, pin: &str) -> Result<WalletView, LedgerError> {
        self.pay_on(session, vendor, amount, pin, Utc::now().date_naive())
    }

    /// Pay a vendor, recording the debit under `date`.
    ///
    /// Checks run in order: missing fields, PIN, amount, balance.
    pub fn pay_on(
        &self,
        session: &Session,
        vendor: &str,
        amount: &str,
        pin: &str,
        date: NaiveDate,
    ) -> Result<WalletView, LedgerError> {
        session.require(Role::Student)?;
        if vendor.trim().is_empty() || amount.trim().is_empty() || pin.is_empty() {
            return Err(LedgerError::MissingFields);
        }

        let mut store = self.load()?;
        let account = store.require_mut(&session.username)?;

        if !account.pin.as_ref().is_some_and(|stored| stored.matches(pin)) {
            warn!("Payment by {} rejected: invalid PIN", session.username);
            return Err(LedgerError::InvalidPin);
        }

        let amount = parse_amount(amount)?;
        let balance = match debit_balance(account, amount) {
            Ok(balance) => balance,
            Err(e) => {
                warn!("Payment by {} of {} rejected: {}", session.username, amount, e);
                return Err(e);
            }
        };
        account.transactions.insert(
            0,
            Transaction {
                date,
                vendor: vendor.to_string(),
                amount: -amount,
            },
        );
        let view = WalletView {
            balance,
            transactions: account.transactions.clone(),
        };

        self.save(&store)?;
        info!("{} paid {} to {} (balance {})", session.username, amount, vendor, balance);
        Ok(view)
    }

    // ========== Vendor ==========

    pub fn vendor_feed(&self, session: &Session) -> Result<VendorFeed, LedgerError> {
        session.require(Role::Vendor)?;
        Ok(aggregate(&self.load()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const STUDENT: &str = "24101C0001";

    fn seeded() -> Ledger<MemoryStorage> {
        let ledger = Ledger::new(MemoryStorage::new());
        assert!(ledger.seed().unwrap());
        ledger
    }

    fn admin() -> Session {
        Session::new("4455", Role::Admin)
    }

    fn student() -> Session {
        Session::new(STUDENT, Role::Student)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn balance_of(ledger: &Ledger<MemoryStorage>, name: &str) -> Decimal {
        ledger.load().unwrap().get(name).unwrap().balance()
    }

    #[test]
    fn test_seed_is_idempotent() {
        let ledger = seeded();
        ledger.credit(&admin(), STUDENT, "5").unwrap();
        let before = ledger.storage().get_item(USERS_KEY).unwrap();

        assert!(!ledger.seed().unwrap());
        assert_eq!(ledger.storage().get_item(USERS_KEY).unwrap(), before);
    }

    #[test]
    fn test_seed_skips_any_existing_store() {
        let ledger = Ledger::new(MemoryStorage::new());
        ledger.save(&AccountStore::new()).unwrap();
        assert!(!ledger.seed().unwrap());
        assert!(ledger.load().unwrap().is_empty());
    }

    #[test]
    fn test_first_login_routes_to_set_pin() {
        let ledger = seeded();

        let (session, route) = ledger.login(STUDENT, STUDENT, Role::Student).unwrap();
        assert_eq!(route, Route::SetPin);
        assert_eq!(ledger.current_session().unwrap(), Some(session));
        assert_eq!(ledger.resolve_route(Route::StudentDashboard).unwrap(), Route::SetPin);

        let next = ledger.set_pin(STUDENT, "1234", "1234").unwrap();
        assert_eq!(next, Route::StudentDashboard);

        let account = ledger.load().unwrap().get(STUDENT).cloned().unwrap();
        assert_eq!(account.pin.unwrap().as_str(), "1234");
        assert_eq!(account.balance, Some(Decimal::ZERO));
        assert_eq!(ledger.resolve_route(Route::StudentDashboard).unwrap(), Route::StudentDashboard);

        let (_, route) = ledger.login(STUDENT, STUDENT, Role::Student).unwrap();
        assert_eq!(route, Route::StudentDashboard);
    }

    #[test]
    fn test_login_wrong_role_never_succeeds() {
        let ledger = seeded();
        assert!(matches!(
            ledger.login(STUDENT, STUDENT, Role::Vendor),
            Err(LedgerError::InvalidCredentials)
        ));
        assert!(matches!(
            ledger.login("4455", "4455", Role::Student),
            Err(LedgerError::InvalidCredentials)
        ));
        assert_eq!(ledger.current_session().unwrap(), None);
    }

    #[test]
    fn test_staff_login_routes() {
        let ledger = seeded();
        assert_eq!(ledger.login("4455", "4455", Role::Admin).unwrap().1, Route::AdminDashboard);
        assert_eq!(ledger.login("5544", "5544", Role::Vendor).unwrap().1, Route::VendorDashboard);

        ledger.logout().unwrap();
        assert_eq!(ledger.current_session().unwrap(), None);
        assert_eq!(ledger.resolve_route(Route::VendorDashboard).unwrap(), Route::Login);
    }

    #[test]
    fn test_pin_mismatch_persists_nothing() {
        let ledger = seeded();
        assert!(matches!(
            ledger.set_pin(STUDENT, "1234", "9999"),
            Err(LedgerError::PinMismatch)
        ));
        assert!(!ledger.load().unwrap().get(STUDENT).unwrap().has_pin());
    }

    #[test]
    fn test_stepwise_pin_setup() {
        let ledger = seeded();
        let mut setup = PinSetup::new();

        assert_eq!(ledger.complete_pin_setup(STUDENT, &mut setup, "1111").unwrap(), None);
        assert!(ledger.complete_pin_setup(STUDENT, &mut setup, "2222").is_err());
        assert_eq!(setup, PinSetup::Enter);

        assert_eq!(ledger.complete_pin_setup(STUDENT, &mut setup, "2222").unwrap(), None);
        assert_eq!(
            ledger.complete_pin_setup(STUDENT, &mut setup, "2222").unwrap(),
            Some(Route::StudentDashboard)
        );
        assert_eq!(ledger.load().unwrap().get(STUDENT).unwrap().pin.as_ref().unwrap().as_str(), "2222");
    }

    #[test]
    fn test_pin_setup_start_over() {
        let ledger = seeded();
        let mut setup = PinSetup::new();

        assert_eq!(ledger.complete_pin_setup(STUDENT, &mut setup, "1111").unwrap(), None);
        setup.reset();
        assert!(ledger.load().unwrap().get(STUDENT).unwrap().pin.is_none());

        assert_eq!(ledger.complete_pin_setup(STUDENT, &mut setup, "2222").unwrap(), None);
        assert_eq!(
            ledger.complete_pin_setup(STUDENT, &mut setup, "2222").unwrap(),
            Some(Route::StudentDashboard)
        );
        assert_eq!(ledger.load().unwrap().get(STUDENT).unwrap().pin.as_ref().unwrap().as_str(), "2222");
    }

    #[test]
    fn test_set_pin_unknown_account() {
        let ledger = seeded();
        assert!(matches!(
            ledger.set_pin("ghost", "1234", "1234"),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_credit_then_pay() {
        let ledger = seeded();
        ledger.set_pin(STUDENT, "1234", "1234").unwrap();

        let students = ledger.credit(&admin(), STUDENT, "50").unwrap();
        assert_eq!(students.len(), 80);
        assert_eq!(students[0].username, STUDENT);
        assert_eq!(students[0].balance, Decimal::from(50));
        assert!(ledger.wallet(&student()).unwrap().transactions.is_empty());

        let view = ledger.pay_on(&student(), "Campus Cafeteria", "20", "1234", day(3)).unwrap();
        assert_eq!(view.balance, Decimal::from(30));
        assert_eq!(view.transactions.len(), 1);
        assert_eq!(view.transactions[0].vendor, "Campus Cafeteria");
        assert_eq!(view.transactions[0].amount, Decimal::from(-20));
        assert_eq!(view.transactions[0].date, day(3));

        assert_eq!(ledger.wallet(&student()).unwrap(), view);
    }

    #[test]
    fn test_payments_prepend_newest_first() {
        let ledger = seeded();
        ledger.set_pin(STUDENT, "1234", "1234").unwrap();
        ledger.credit(&admin(), STUDENT, "100").unwrap();

        ledger.pay_on(&student(), "Bookstore", "10", "1234", day(1)).unwrap();
        let view = ledger.pay_on(&student(), "Coffee Shop", "2.5", "1234", day(2)).unwrap();

        assert_eq!(view.balance, Decimal::new(875, 1));
        let vendors: Vec<&str> = view.transactions.iter().map(|t| t.vendor.as_str()).collect();
        assert_eq!(vendors, vec!["Coffee Shop", "Bookstore"]);
    }

    #[test]
    fn test_wrong_pin_changes_nothing() {
        let ledger = seeded();
        ledger.set_pin(STUDENT, "1234", "1234").unwrap();
        ledger.credit(&admin(), STUDENT, "50").unwrap();

        assert!(matches!(
            ledger.pay_on(&student(), "Bookstore", "10", "0000", day(1)),
            Err(LedgerError::InvalidPin)
        ));
        let view = ledger.wallet(&student()).unwrap();
        assert_eq!(view.balance, Decimal::from(50));
        assert!(view.transactions.is_empty());
    }

    #[test]
    fn test_pay_without_pin_set_is_invalid_pin() {
        let ledger = seeded();
        ledger.credit(&admin(), STUDENT, "50").unwrap();
        assert!(matches!(
            ledger.pay_on(&student(), "Bookstore", "10", "1234", day(1)),
            Err(LedgerError::InvalidPin)
        ));
    }

    #[test]
    fn test_pay_check_order() {
        let ledger = seeded();
        ledger.set_pin(STUDENT, "1234", "1234").unwrap();
        ledger.credit(&admin(), STUDENT, "10").unwrap();

        // Missing fields win over everything else
        assert!(matches!(
            ledger.pay_on(&student(), "", "abc", "0000", day(1)),
            Err(LedgerError::MissingFields)
        ));
        // PIN is checked before the amount
        assert!(matches!(
            ledger.pay_on(&student(), "Bookstore", "abc", "0000", day(1)),
            Err(LedgerError::InvalidPin)
        ));
        assert!(matches!(
            ledger.pay_on(&student(), "Bookstore", "abc", "1234", day(1)),
            Err(LedgerError::InvalidAmount)
        ));
        assert!(matches!(
            ledger.pay_on(&student(), "Bookstore", "-3", "1234", day(1)),
            Err(LedgerError::InvalidAmount)
        ));
        assert!(matches!(
            ledger.pay_on(&student(), "Bookstore", "10.01", "1234", day(1)),
            Err(LedgerError::InsufficientBalance)
        ));
        let view = ledger.wallet(&student()).unwrap();
        assert_eq!(view.balance, Decimal::from(10));
        assert!(view.transactions.is_empty());

        // Spending the exact balance is allowed
        let view = ledger.pay_on(&student(), "Bookstore", "10", "1234", day(1)).unwrap();
        assert_eq!(view.balance, Decimal::ZERO);
    }

    #[test]
    fn test_credit_validation() {
        let ledger = seeded();
        assert!(matches!(ledger.credit(&admin(), "", "5"), Err(LedgerError::MissingFields)));
        assert!(matches!(ledger.credit(&admin(), STUDENT, ""), Err(LedgerError::MissingFields)));
        assert!(matches!(ledger.credit(&admin(), STUDENT, "ten"), Err(LedgerError::InvalidAmount)));
        assert!(matches!(ledger.credit(&admin(), STUDENT, "0"), Err(LedgerError::InvalidAmount)));
        assert!(matches!(ledger.credit(&admin(), STUDENT, "-1"), Err(LedgerError::InvalidAmount)));
        assert!(matches!(
            ledger.credit(&admin(), "24101C0099", "5"),
            Err(LedgerError::AccountNotFound(_))
        ));
        assert_eq!(balance_of(&ledger, STUDENT), Decimal::ZERO);
    }

    #[test]
    fn test_credit_accumulates() {
        let ledger = seeded();
        ledger.credit(&admin(), STUDENT, "12.5").unwrap();
        ledger.credit(&admin(), STUDENT, "7.5").unwrap();
        assert_eq!(balance_of(&ledger, STUDENT), Decimal::from(20));
        assert!(ledger.load().unwrap().get(STUDENT).unwrap().transactions.is_empty());
    }

    #[test]
    fn test_operations_require_role() {
        let ledger = seeded();
        let vendor = Session::new("5544", Role::Vendor);

        assert!(matches!(ledger.credit(&student(), STUDENT, "5"), Err(LedgerError::Unauthorized(_))));
        assert!(matches!(
            ledger.pay_on(&admin(), "Bookstore", "1", "1234", day(1)),
            Err(LedgerError::Unauthorized(_))
        ));
        assert!(matches!(ledger.vendor_feed(&student()), Err(LedgerError::Unauthorized(_))));
        assert!(ledger.vendor_feed(&vendor).is_ok());
    }

    #[test]
    fn test_vendor_feed_counts_all_students() {
        let ledger = seeded();
        let other = "24101C0002";
        for name in [STUDENT, other] {
            ledger.set_pin(name, "1234", "1234").unwrap();
            ledger.credit(&admin(), name, "100").unwrap();
        }
        let other_session = Session::new(other, Role::Student);

        ledger.pay_on(&student(), "Bookstore", "10", "1234", day(1)).unwrap();
        ledger.pay_on(&other_session, "Coffee Shop", "4", "1234", day(4)).unwrap();
        ledger.pay_on(&student(), "Campus Cafeteria", "6", "1234", day(2)).unwrap();

        let feed = ledger.vendor_feed(&Session::new("5544", Role::Vendor)).unwrap();
        assert_eq!(feed.count(), 3);
        assert_eq!(feed.total_volume(), Decimal::from(20));
        assert_eq!(feed.entries[0].student, other);
        assert_eq!(feed.entries[1].vendor, "Campus Cafeteria");
        assert_eq!(feed.entries[2].vendor, "Bookstore");
    }

    #[test]
    fn test_stored_blob_keeps_numeric_amounts() {
        let ledger = seeded();
        ledger.set_pin(STUDENT, "1234", "1234").unwrap();
        ledger.credit(&admin(), STUDENT, "50").unwrap();
        ledger.pay_on(&student(), "Campus Cafeteria", "20", "1234", day(1)).unwrap();

        let raw = ledger.storage().get_item(USERS_KEY).unwrap().unwrap();
        let blob: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let account = &blob[STUDENT];
        assert_eq!(account["balance"].as_f64(), Some(30.0));
        assert_eq!(account["pin"], "1234");
        assert_eq!(account["transactions"][0]["date"], "2024-06-01");
        assert_eq!(account["transactions"][0]["vendor"], "Campus Cafeteria");
        assert_eq!(account["transactions"][0]["amount"].as_f64(), Some(-20.0));
        assert_eq!(blob["24101C0002"]["balance"].as_f64(), Some(0.0));
        assert!(blob["4455"].get("balance").is_none());

        // The view handed to callers uses numbers too
        let view = serde_json::to_value(ledger.wallet(&student()).unwrap()).unwrap();
        assert_eq!(view["balance"].as_f64(), Some(30.0));
    }

    #[test]
    fn test_sled_backend() {
        let ledger = Ledger::new(crate::storage::SledStorage::temporary().unwrap());
        ledger.seed().unwrap();
        ledger.set_pin(STUDENT, "4321", "4321").unwrap();
        ledger.credit(&admin(), STUDENT, "8").unwrap();

        let store = ledger.load().unwrap();
        let account = store.get(STUDENT).unwrap();
        assert_eq!(account.balance(), Decimal::from(8));
        assert_eq!(account.pin.as_ref().unwrap().as_str(), "4321");
    }
}
