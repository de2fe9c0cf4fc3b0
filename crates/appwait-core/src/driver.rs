//! Automation driver capability used by the platform and page helpers.
//!
//! This crate does not talk to devices itself. Everything that touches an app,
//! a browser or a simulator goes through the [`AutomationDriver`] trait, which a
//! test harness implements on top of its real automation backend (an Appium or
//! WebDriver session, for example). Tests in this crate use scripted mocks.
//!
//! # Selectors
//!
//! [`Selector`] names an element the way the driver expects to receive it:
//!
//! ```
//! use appwait_core::driver::Selector;
//!
//! let by_id = Selector::AccessibilityId("test-LOGIN".to_string());
//! assert_eq!(by_id.to_string(), "~test-LOGIN");
//!
//! let predicate = Selector::IosPredicate("name CONTAINS 'URL'".to_string());
//! assert_eq!(predicate.to_string(), "-ios predicate string:name CONTAINS 'URL'");
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by an [`AutomationDriver`] or by helpers driving it.
#[derive(Error, Debug)]
pub enum DriverError {
    /// A driver command failed with the given message.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// The automation session is not available.
    #[error("Not connected to automation driver")]
    NotConnected,

    /// An element never became displayed within the wait timeout.
    #[error("Element not displayed: {0}")]
    ElementNotDisplayed(String),

    /// A driver operation timed out.
    #[error("Operation timed out")]
    Timeout,
}

/// Application state as reported by the iOS `mobile: queryAppState` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// The state cannot be determined.
    Unknown,
    /// The application is not running.
    NotRunning,
    /// Running in the background and suspended.
    BackgroundSuspended,
    /// Running in the background and not suspended.
    Background,
    /// Running in the foreground.
    Foreground,
}

impl AppState {
    /// Maps the numeric state code (0..=4) to an [`AppState`].
    ///
    /// Codes outside that range map to [`AppState::Unknown`].
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => AppState::NotRunning,
            2 => AppState::BackgroundSuspended,
            3 => AppState::Background,
            4 => AppState::Foreground,
            _ => AppState::Unknown,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            AppState::Unknown => 0,
            AppState::NotRunning => 1,
            AppState::BackgroundSuspended => 2,
            AppState::Background => 3,
            AppState::Foreground => 4,
        }
    }

    pub fn is_running(self) -> bool {
        matches!(
            self,
            AppState::BackgroundSuspended | AppState::Background | AppState::Foreground
        )
    }
}

/// Locator for a single element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// Cross-platform accessibility id, rendered as `~id`.
    AccessibilityId(String),
    /// iOS `NSPredicate` string.
    IosPredicate(String),
    /// CSS selector, for web contexts.
    Css(String),
    /// XPath expression.
    Xpath(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::AccessibilityId(id) => write!(f, "~{}", id),
            Selector::IosPredicate(predicate) => write!(f, "-ios predicate string:{}", predicate),
            Selector::Css(css) => write!(f, "{}", css),
            Selector::Xpath(xpath) => write!(f, "{}", xpath),
        }
    }
}

/// Trait for the automation backend the helpers in this crate drive.
///
/// Implementors wrap a live automation session. Every method that touches the
/// device is async; the helpers only ever hold the driver behind an
/// `Arc<dyn AutomationDriver>`, so implementations must be `Send + Sync`.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Reset the application under test to a fresh state.
    async fn reset(&self) -> Result<(), DriverError>;

    /// Launch (or bring to the foreground) the app with the given bundle id.
    async fn launch_app(&self, bundle_id: &str) -> Result<(), DriverError>;

    /// Query the state of the app with the given bundle id.
    async fn query_app_state(&self, bundle_id: &str) -> Result<AppState, DriverError>;

    /// Name of the current Android activity (e.g. `.MainActivity`).
    async fn current_activity(&self) -> Result<String, DriverError>;

    /// Open `url` in the given Android package via the native deep-link command.
    ///
    /// # Arguments
    ///
    /// * `url` - The full deep-link URL, scheme included
    /// * `package` - The Android package that should handle the link
    async fn deep_link(&self, url: &str, package: &str) -> Result<(), DriverError>;

    /// Whether the software keyboard is currently shown.
    async fn is_keyboard_shown(&self) -> Result<bool, DriverError>;

    /// Whether the element matched by `selector` exists and is displayed.
    async fn is_displayed(&self, selector: &Selector) -> Result<bool, DriverError>;

    /// Click (tap) the element matched by `selector`.
    async fn click(&self, selector: &Selector) -> Result<(), DriverError>;

    /// Replace the value of the element matched by `selector` with `text`.
    async fn set_value(&self, selector: &Selector, text: &str) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::CommandFailed("reset failed".to_string());
        assert!(err.to_string().contains("reset failed"));

        let err = DriverError::NotConnected;
        assert!(err.to_string().contains("Not connected"));

        let err = DriverError::ElementNotDisplayed("~open".to_string());
        assert_eq!(err.to_string(), "Element not displayed: ~open");

        let err = DriverError::Timeout;
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_app_state_from_code() {
        assert_eq!(AppState::from_code(0), AppState::Unknown);
        assert_eq!(AppState::from_code(1), AppState::NotRunning);
        assert_eq!(AppState::from_code(2), AppState::BackgroundSuspended);
        assert_eq!(AppState::from_code(3), AppState::Background);
        assert_eq!(AppState::from_code(4), AppState::Foreground);
        assert_eq!(AppState::from_code(17), AppState::Unknown);
        assert_eq!(AppState::from_code(-1), AppState::Unknown);
    }

    #[test]
    fn test_app_state_code_matches_from_code() {
        for code in 0..=4 {
            assert_eq!(AppState::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_app_state_is_running() {
        assert!(!AppState::Unknown.is_running());
        assert!(!AppState::NotRunning.is_running());
        assert!(AppState::BackgroundSuspended.is_running());
        assert!(AppState::Foreground.is_running());
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(
            Selector::AccessibilityId("test-Username".to_string()).to_string(),
            "~test-Username"
        );
        assert_eq!(
            Selector::IosPredicate("name CONTAINS 'Open'".to_string()).to_string(),
            "-ios predicate string:name CONTAINS 'Open'"
        );
        assert_eq!(Selector::Css("#login-button".to_string()).to_string(), "#login-button");
        assert_eq!(Selector::Xpath("//button".to_string()).to_string(), "//button");
    }

    #[test]
    fn test_selector_serde_shape() {
        let json = serde_json::to_value(Selector::Css(".cart_list".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"strategy": "css", "value": ".cart_list"}));

        let parsed: Selector =
            serde_json::from_str(r#"{"strategy": "accessibility_id", "value": "menu"}"#).unwrap();
        assert_eq!(parsed, Selector::AccessibilityId("menu".to_string()));
    }
}
