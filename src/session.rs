//! Logged-in session and the navigation contract the front end follows.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::{Account, AccountId, Role};
use crate::error::LedgerError;

/// The identity currently logged in. Persisted until logout.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub username: AccountId,
    pub role: Role,
}

impl Session {
    pub fn new(username: impl Into<AccountId>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    /// Fails with `Unauthorized` unless the session carries `role`.
    pub fn require(&self, role: Role) -> Result<(), LedgerError> {
        if self.role == role {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(self.role.to_string()))
        }
    }
}

/// Logical screens of the wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    SetPin,
    StudentDashboard,
    AdminDashboard,
    VendorDashboard,
    NotFound,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::SetPin => "/set-pin",
            Route::StudentDashboard => "/dashboard",
            Route::AdminDashboard => "/admin",
            Route::VendorDashboard => "/vendor",
            Route::NotFound => "*",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::SetPin => "set-pin",
            Route::StudentDashboard => "student-dashboard",
            Route::AdminDashboard => "admin-dashboard",
            Route::VendorDashboard => "vendor-dashboard",
            Route::NotFound => "not-found",
        }
    }

    /// Resolve a path; unknown paths land on `NotFound`.
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "" => Route::Login,
            "/set-pin" => Route::SetPin,
            "/dashboard" => Route::StudentDashboard,
            "/admin" => Route::AdminDashboard,
            "/vendor" => Route::VendorDashboard,
            _ => Route::NotFound,
        }
    }

    /// Home screen for a role
    pub fn dashboard_for(role: Role) -> Self {
        match role {
            Role::Student => Route::StudentDashboard,
            Role::Admin => Route::AdminDashboard,
            Role::Vendor => Route::VendorDashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a freshly logged-in user goes: students without a PIN must set one
/// before anything else.
pub fn route_after_login(session: &Session, account: &Account) -> Route {
    if session.is_student() && !account.has_pin() {
        Route::SetPin
    } else {
        Route::dashboard_for(session.role)
    }
}

/// Resolve a requested route against the current session.
///
/// Dashboards need a session of the matching role, otherwise the user is
/// sent to login. A student with no PIN is held on `SetPin`.
pub fn guard(requested: Route, session: Option<&Session>, account: Option<&Account>) -> Route {
    let needed = match requested {
        Route::Login | Route::NotFound => return requested,
        Route::SetPin | Route::StudentDashboard => Role::Student,
        Route::AdminDashboard => Role::Admin,
        Route::VendorDashboard => Role::Vendor,
    };

    let (session, account) = match (session, account) {
        (Some(s), Some(a)) if s.role == needed && a.role == needed => (s, a),
        _ => return Route::Login,
    };

    if session.is_student() && !account.has_pin() {
        Route::SetPin
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Pin;

    fn student(with_pin: bool) -> Account {
        let mut account = Account::student("s");
        if with_pin {
            account.pin = Some(Pin::parse("1234").unwrap());
        }
        account
    }

    #[test]
    fn test_route_paths() {
        for route in [
            Route::Login,
            Route::SetPin,
            Route::StudentDashboard,
            Route::AdminDashboard,
            Route::VendorDashboard,
        ] {
            assert_eq!(Route::from_path(route.path()), route);
        }
        assert_eq!(Route::from_path("/nope"), Route::NotFound);
        assert_eq!(Route::from_path("/admin/"), Route::AdminDashboard);
    }

    #[test]
    fn test_route_after_login() {
        let s = Session::new("s", Role::Student);
        assert_eq!(route_after_login(&s, &student(false)), Route::SetPin);
        assert_eq!(route_after_login(&s, &student(true)), Route::StudentDashboard);

        let admin = Account::staff("pw", Role::Admin);
        assert_eq!(route_after_login(&Session::new("a", Role::Admin), &admin), Route::AdminDashboard);

        let vendor = Account::staff("pw", Role::Vendor);
        assert_eq!(route_after_login(&Session::new("v", Role::Vendor), &vendor), Route::VendorDashboard);
    }

    #[test]
    fn test_guard_requires_matching_role() {
        let admin_session = Session::new("a", Role::Admin);
        let admin = Account::staff("pw", Role::Admin);

        assert_eq!(guard(Route::AdminDashboard, Some(&admin_session), Some(&admin)), Route::AdminDashboard);
        assert_eq!(guard(Route::VendorDashboard, Some(&admin_session), Some(&admin)), Route::Login);
        assert_eq!(guard(Route::StudentDashboard, None, None), Route::Login);
        assert_eq!(guard(Route::Login, None, None), Route::Login);
        assert_eq!(guard(Route::NotFound, None, None), Route::NotFound);
    }

    #[test]
    fn test_guard_holds_student_without_pin() {
        let session = Session::new("s", Role::Student);
        assert_eq!(guard(Route::StudentDashboard, Some(&session), Some(&student(false))), Route::SetPin);
        assert_eq!(guard(Route::SetPin, Some(&session), Some(&student(false))), Route::SetPin);
        assert_eq!(guard(Route::StudentDashboard, Some(&session), Some(&student(true))), Route::StudentDashboard);
    }

    #[test]
    fn test_require_role() {
        let session = Session::new("5544", Role::Vendor);
        assert!(session.require(Role::Vendor).is_ok());
        assert!(matches!(
            session.require(Role::Admin),
            Err(LedgerError::Unauthorized(role)) if role == "vendor"
        ));
    }

    #[test]
    fn test_session_json_shape() {
        let session = Session::new("24101C0001", Role::Student);
        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(json, r#"{"username":"24101C0001","role":"student"}"#);
    }
}
