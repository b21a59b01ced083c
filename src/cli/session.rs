use std::io::{self, Write};

use super::require_role;
use crate::account::{PinSetup, Role};
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::session::Route;
use crate::storage::Storage;

pub fn handle_login<S: Storage>(
    ledger: &Ledger<S>,
    username: &str,
    password: &str,
    role: &str,
) -> Result<(), LedgerError> {
    if username.is_empty() || password.is_empty() || role.is_empty() {
        return Err(LedgerError::MissingFields);
    }
    let role: Role = role.parse()?;
    let (session, route) = ledger.login(username, password, role)?;
    println!("Login Successful. Welcome back, {}!", session.username);
    if route == Route::SetPin {
        println!("Set your payment PIN next: vpay set-pin");
    }
    println!("-> {}", route);
    Ok(())
}

pub fn handle_logout<S: Storage>(ledger: &Ledger<S>) -> Result<(), LedgerError> {
    ledger.logout()?;
    println!("Logged out.");
    Ok(())
}

pub fn handle_whoami<S: Storage>(ledger: &Ledger<S>) -> Result<(), LedgerError> {
    match ledger.current_session()? {
        Some(session) => {
            let home = ledger.resolve_route(Route::dashboard_for(session.role))?;
            println!("{} ({}) -> {}", session.username, session.role, home);
        }
        None => println!("Not logged in -> {}", Route::Login),
    }
    Ok(())
}

pub fn handle_route<S: Storage>(ledger: &Ledger<S>, path: &str) -> Result<(), LedgerError> {
    let requested = Route::from_path(path);
    let resolved = ledger.resolve_route(requested)?;
    println!("{} -> {} ({})", path, resolved, resolved.path());
    Ok(())
}

/// Two-step PIN setup for the logged-in student. Values given on the
/// command line are used as-is; otherwise the user is prompted until both
/// entries match.
pub fn handle_set_pin<S: Storage>(
    ledger: &Ledger<S>,
    pin: Option<String>,
    confirm: Option<String>,
) -> Result<(), LedgerError> {
    let session = require_role(ledger, Role::Student)?;

    if let (Some(pin), Some(confirm)) = (&pin, &confirm) {
        let route = ledger.set_pin(&session.username, pin, confirm)?;
        println!("PIN set successfully! -> {}", route);
        return Ok(());
    }

    let mut setup = PinSetup::new();
    loop {
        let label = if setup.is_confirming() {
            "Confirm your PIN (r to start over)"
        } else {
            "Enter a 4-digit PIN"
        };
        let value = prompt(label)?;
        if setup.is_confirming() && value.eq_ignore_ascii_case("r") {
            setup.reset();
            continue;
        }
        match ledger.complete_pin_setup(&session.username, &mut setup, &value) {
            Ok(Some(route)) => {
                println!("PIN set successfully! -> {}", route);
                return Ok(());
            }
            Ok(None) => println!("Now confirm your PIN"),
            Err(e @ (LedgerError::PinMismatch | LedgerError::InvalidPinFormat)) => println!("Error: {}", e),
            Err(e) => return Err(e),
        }
    }
}

fn prompt(label: &str) -> Result<String, LedgerError> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(LedgerError::Input(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed",
        )));
    }
    Ok(input.trim().to_string())
}
