//! Platform-specific flows behind a single capability.
//!
//! The same test step often needs different driver calls on iOS and Android:
//! opening a deep link goes through Safari on iOS but is a single native
//! command on Android, and "the browser opened" means Safari in the
//! foreground on iOS but "our activity is gone" on Android. Instead of
//! branching on the platform inside every helper, the harness picks a
//! [`MobilePlatform`] once with [`select`] and calls through it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use appwait_core::config::E2eConfig;
//! use appwait_core::driver::AutomationDriver;
//! use appwait_core::platform::{self, PlatformKind};
//!
//! # async fn example(driver: Arc<dyn AutomationDriver>) -> Result<(), Box<dyn std::error::Error>> {
//! let platform = platform::select(PlatformKind::Ios, driver, &E2eConfig::default());
//! platform.open_deep_link("cart").await?;
//! assert!(platform.is_browser_opened().await);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};

use crate::config::E2eConfig;
use crate::driver::{AppState, AutomationDriver, DriverError, Selector};
use crate::fixtures::SAFARI_BUNDLE_ID;
use crate::page::wait_for_displayed;
use crate::wait::{wait_until, WaitConfig, WaitRequest};

/// Unicode private-use code point WebDriver maps to the Enter key.
const ENTER_KEY: char = '\u{E007}';

/// Android activities that mean the app under test still owns the screen.
const APP_ACTIVITIES: [&str; 2] = [".MainActivity", ".GrantPermissionsActivity"];

/// The Safari address bar shows up either as a button or as a tab bar title.
const IOS_URL_BUTTON: &str = "name CONTAINS 'URL' OR name CONTAINS 'TabBarItemTitle'";
const IOS_URL_FIELD: &str = "type == 'XCUIElementTypeTextField' && name CONTAINS 'URL'";
const IOS_OPEN_BUTTON: &str = "type == 'XCUIElementTypeButton' && name CONTAINS 'Open'";

/// Which mobile platform the session runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Ios,
    Android,
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Ios => write!(f, "ios"),
            PlatformKind::Android => write!(f, "android"),
        }
    }
}

impl FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(PlatformKind::Ios),
            "android" => Ok(PlatformKind::Android),
            other => Err(format!("Unknown platform '{}'. Use: ios, android", other)),
        }
    }
}

/// Platform-dependent test steps.
#[async_trait]
pub trait MobilePlatform: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Navigate the app under test to `path` through its deep-link scheme.
    async fn open_deep_link(&self, path: &str) -> Result<(), DriverError>;

    /// Whether a browser took over the screen within the wait timeout.
    async fn is_browser_opened(&self) -> bool;

    /// Whether the app with `bundle_id` reached the foreground within the wait timeout.
    async fn is_app_running(&self, bundle_id: &str) -> bool;

    /// [`is_app_running`](Self::is_app_running) for the configured app under test.
    async fn is_app_under_test_running(&self) -> bool;
}

/// Builds the platform implementation for `kind`.
pub fn select(
    kind: PlatformKind,
    driver: Arc<dyn AutomationDriver>,
    config: &E2eConfig,
) -> Box<dyn MobilePlatform> {
    match kind {
        PlatformKind::Ios => Box::new(IosPlatform::new(driver, config)),
        PlatformKind::Android => Box::new(AndroidPlatform::new(driver, config)),
    }
}

/// Waits until `bundle_id` reports [`AppState::Foreground`].
async fn wait_for_foreground(driver: &dyn AutomationDriver, bundle_id: &str, wait: WaitConfig) -> bool {
    let span = info_span!("wait_for_foreground", bundle_id);
    wait_until(
        WaitRequest::new(move || async move {
            driver
                .query_app_state(bundle_id)
                .await
                .map(|state| state == AppState::Foreground)
        })
        .config(wait),
    )
    .instrument(span)
    .await
    .is_satisfied()
}

/// iOS flows. Deep links are typed into Safari's address bar.
pub struct IosPlatform {
    driver: Arc<dyn AutomationDriver>,
    config: E2eConfig,
}

impl IosPlatform {
    pub fn new(driver: Arc<dyn AutomationDriver>, config: &E2eConfig) -> Self {
        Self {
            driver,
            config: config.clone(),
        }
    }

    async fn wait_and_click(&self, selector: &Selector) -> Result<(), DriverError> {
        if wait_for_displayed(self.driver.as_ref(), selector, true, self.config.wait)
            .await
            .is_timed_out()
        {
            return Err(DriverError::ElementNotDisplayed(selector.to_string()));
        }
        self.driver.click(selector).await
    }
}

#[async_trait]
impl MobilePlatform for IosPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Ios
    }

    async fn open_deep_link(&self, path: &str) -> Result<(), DriverError> {
        let span = info_span!("open_deep_link", platform = "ios", path);
        async {
            self.driver.launch_app(SAFARI_BUNDLE_ID).await?;

            // Safari may open with the address bar already focused.
            if !self.driver.is_keyboard_shown().await? {
                let url_button = Selector::IosPredicate(IOS_URL_BUTTON.to_string());
                self.wait_and_click(&url_button).await?;
            }

            let url_field = Selector::IosPredicate(IOS_URL_FIELD.to_string());
            let url = format!("{}{}", self.config.deep_link_url(path), ENTER_KEY);
            self.driver.set_value(&url_field, &url).await?;

            let open_button = Selector::IosPredicate(IOS_OPEN_BUTTON.to_string());
            self.wait_and_click(&open_button).await?;
            debug!("deep link confirmed");
            Ok::<(), DriverError>(())
        }
        .instrument(span)
        .await
    }

    async fn is_browser_opened(&self) -> bool {
        wait_for_foreground(self.driver.as_ref(), SAFARI_BUNDLE_ID, self.config.wait).await
    }

    async fn is_app_running(&self, bundle_id: &str) -> bool {
        wait_for_foreground(self.driver.as_ref(), bundle_id, self.config.wait).await
    }

    async fn is_app_under_test_running(&self) -> bool {
        self.is_app_running(&self.config.ios_bundle_id).await
    }
}

/// Android flows. Deep links use the native `mobile:deepLink` command.
pub struct AndroidPlatform {
    driver: Arc<dyn AutomationDriver>,
    config: E2eConfig,
}

impl AndroidPlatform {
    pub fn new(driver: Arc<dyn AutomationDriver>, config: &E2eConfig) -> Self {
        Self {
            driver,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl MobilePlatform for AndroidPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Android
    }

    async fn open_deep_link(&self, path: &str) -> Result<(), DriverError> {
        let url = self.config.deep_link_url(path);
        let package = &self.config.android_package;
        debug!(url = %url, package = %package, "opening deep link");
        self.driver.deep_link(&url, package).await
    }

    async fn is_browser_opened(&self) -> bool {
        let driver = self.driver.as_ref();
        let span = info_span!("wait_for_browser", platform = "android");
        wait_until(
            WaitRequest::new(move || async move {
                let activity = driver.current_activity().await?;
                Ok::<_, DriverError>(!APP_ACTIVITIES.iter().any(|a| activity.contains(a)))
            })
            .config(self.config.wait),
        )
        .instrument(span)
        .await
        .is_satisfied()
    }

    async fn is_app_running(&self, bundle_id: &str) -> bool {
        wait_for_foreground(self.driver.as_ref(), bundle_id, self.config.wait).await
    }

    async fn is_app_under_test_running(&self) -> bool {
        self.is_app_running(&self.config.android_package).await
    }
}
