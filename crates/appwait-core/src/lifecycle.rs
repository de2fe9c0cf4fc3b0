//! App lifecycle control between tests.
//!
//! The automation session opens the app under test when it starts, so the
//! very first test must not reset it again. [`AppLifecycle`] keeps that
//! "first start" flag as explicit harness-owned state instead of a global.

use std::sync::Arc;

use tracing::debug;

use crate::driver::{AutomationDriver, DriverError};

/// Tracks whether the app still has its session-start launch pending.
pub struct AppLifecycle {
    driver: Arc<dyn AutomationDriver>,
    first_app_start: bool,
}

impl AppLifecycle {
    /// Creates a lifecycle for a session that has just opened the app.
    pub fn new(driver: Arc<dyn AutomationDriver>) -> Self {
        Self {
            driver,
            first_app_start: true,
        }
    }

    pub fn is_first_start(&self) -> bool {
        self.first_app_start
    }

    /// Puts the app in a fresh state for the next test.
    ///
    /// The first call only consumes the first-start flag, since the session
    /// just launched the app. Every later call resets the app through the
    /// driver. If the reset fails the flag is still cleared.
    pub async fn restart_app(&mut self) -> Result<(), DriverError> {
        let first = std::mem::replace(&mut self.first_app_start, false);
        if first {
            debug!("first app start, skipping reset");
            return Ok(());
        }
        debug!("resetting app");
        self.driver.reset().await
    }
}
