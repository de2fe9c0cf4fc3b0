//! Static test fixtures: page paths, login users and well-known bundle ids.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use crate::wait::DEFAULT_TIMEOUT;

/// Bundle id of Mobile Safari on iOS.
pub const SAFARI_BUNDLE_ID: &str = "com.apple.mobilesafari";

/// Pages of the demo web shop, addressed by path relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Cart,
    CheckoutComplete,
    CheckoutPersonalInfo,
    CheckoutSummary,
    Login,
    SwagDetails,
    SwagItems,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Cart,
        Page::CheckoutComplete,
        Page::CheckoutPersonalInfo,
        Page::CheckoutSummary,
        Page::Login,
        Page::SwagDetails,
        Page::SwagItems,
    ];

    /// Path of the page. The login page lives at the site root.
    pub fn path(self) -> &'static str {
        match self {
            Page::Cart => "/cart.html",
            Page::CheckoutComplete => "/checkout-complete.html",
            Page::CheckoutPersonalInfo => "/checkout-step-one.html",
            Page::CheckoutSummary => "/checkout-step-two.html",
            Page::Login => "",
            Page::SwagDetails => "/inventory-item.html",
            Page::SwagItems => "/inventory.html",
        }
    }

    /// Full URL of the page under `base`, ignoring a trailing slash on `base`.
    pub fn url(self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }

    pub fn name(self) -> &'static str {
        match self {
            Page::Cart => "cart",
            Page::CheckoutComplete => "checkout-complete",
            Page::CheckoutPersonalInfo => "checkout-personal-info",
            Page::CheckoutSummary => "checkout-summary",
            Page::Login => "login",
            Page::SwagDetails => "swag-details",
            Page::SwagItems => "swag-items",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Username and password pair for the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: &'static str,
    pub password: &'static str,
}

/// Login fixtures covering the interesting account states of the demo shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginUser {
    Locked,
    NoMatch,
    NoUserDetails,
    NoPassword,
    Performance,
    Standard,
}

impl LoginUser {
    pub const ALL: [LoginUser; 6] = [
        LoginUser::Locked,
        LoginUser::NoMatch,
        LoginUser::NoUserDetails,
        LoginUser::NoPassword,
        LoginUser::Performance,
        LoginUser::Standard,
    ];

    pub fn credentials(self) -> Credentials {
        let (username, password) = match self {
            LoginUser::Locked => ("locked_out_user", "secret_sauce"),
            LoginUser::NoMatch => ("d", "d"),
            LoginUser::NoUserDetails => ("", ""),
            LoginUser::NoPassword => ("standard_user", ""),
            LoginUser::Performance => ("performance_glitch_user", "secret_sauce"),
            LoginUser::Standard => ("standard_user", "secret_sauce"),
        };
        Credentials { username, password }
    }

    pub fn name(self) -> &'static str {
        match self {
            LoginUser::Locked => "locked",
            LoginUser::NoMatch => "no-match",
            LoginUser::NoUserDetails => "no-user-details",
            LoginUser::NoPassword => "no-password",
            LoginUser::Performance => "performance",
            LoginUser::Standard => "standard",
        }
    }
}

impl fmt::Display for LoginUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LoginUser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoginUser::ALL
            .into_iter()
            .find(|user| user.name() == s)
            .ok_or_else(|| format!("Unknown login user '{}'", s))
    }
}
