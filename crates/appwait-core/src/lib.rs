//! # appwait-core
//!
//! Support library for mobile end-to-end test suites that run on top of an
//! external automation driver.
//!
//! The heart of the crate is [`wait::wait_until`], which polls an async
//! predicate until it returns the desired value or a deadline passes, and
//! reports the result as a [`wait::WaitOutcome`] instead of an error. The other
//! modules build the usual suite helpers on top of it.
//!
//! ## Modules
//!
//! - [`wait`] - Predicate waiter with validated timings and optional cancellation
//! - [`driver`] - The [`AutomationDriver`](driver::AutomationDriver) capability the helpers drive
//! - [`platform`] - iOS and Android flows (deep links, browser detection) behind one trait
//! - [`page`] - Base page object with visibility waits
//! - [`lifecycle`] - Restarting the app under test between tests
//! - [`fixtures`] - Page paths, login users and bundle ids
//! - [`config`] - Persistent suite configuration in `~/.appwait/config.json`
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use appwait_core::config::E2eConfig;
//! use appwait_core::driver::{AutomationDriver, Selector};
//! use appwait_core::page::BasePage;
//!
//! # async fn example(driver: Arc<dyn AutomationDriver>) {
//! let config = E2eConfig::load();
//! let login = BasePage::new(
//!     driver,
//!     Selector::AccessibilityId("test-Login".to_string()),
//!     config.wait,
//! );
//!
//! if login.wait_for_is_shown(true).await {
//!     println!("login screen is up");
//! }
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod fixtures;
pub mod lifecycle;
pub mod page;
pub mod platform;
pub mod wait;
