//! Base page object with visibility checks.
//!
//! Page objects in a suite wrap a [`BasePage`] around the selector of an
//! element that identifies the screen (a container, a title, a unique button)
//! and use [`BasePage::wait_for_is_shown`] to decide whether the screen is
//! present.

use std::sync::Arc;

use crate::driver::{AutomationDriver, DriverError, Selector};
use crate::wait::{wait_until, WaitConfig, WaitOutcome, WaitRequest};

/// Waits until the element matched by `selector` is (or is not) displayed.
///
/// Driver errors during polling count as "no match", so an element whose
/// lookup fails while the screen is still transitioning keeps being polled.
pub async fn wait_for_displayed(
    driver: &dyn AutomationDriver,
    selector: &Selector,
    shown: bool,
    config: WaitConfig,
) -> WaitOutcome {
    wait_until(
        WaitRequest::new(move || async move { driver.is_displayed(selector).await })
            .desired(shown)
            .config(config),
    )
    .await
}

/// A screen identified by a single element.
pub struct BasePage {
    selector: Selector,
    driver: Arc<dyn AutomationDriver>,
    wait: WaitConfig,
}

impl BasePage {
    pub fn new(driver: Arc<dyn AutomationDriver>, selector: Selector, wait: WaitConfig) -> Self {
        Self {
            selector,
            driver,
            wait,
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Waits for the page's element to reach the requested visibility.
    ///
    /// Pass `true` to wait for the page to appear and `false` to wait for it
    /// to go away. Returns `true` when that happened within the page's wait
    /// timeout and `false` when it timed out.
    pub async fn wait_for_is_shown(&self, is_shown: bool) -> bool {
        wait_for_displayed(self.driver.as_ref(), &self.selector, is_shown, self.wait)
            .await
            .is_satisfied()
    }

    /// Single, non-waiting check of whether the page's element is displayed.
    pub async fn is_displayed(&self) -> Result<bool, DriverError> {
        self.driver.is_displayed(&self.selector).await
    }
}
