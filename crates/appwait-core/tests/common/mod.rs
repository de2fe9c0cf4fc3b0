//! Shared test helpers for appwait-core integration tests.
//!
//! This module provides a scripted in-memory [`AutomationDriver`] that records
//! every call it receives, so tests can drive the platform, page and lifecycle
//! helpers without a device.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use appwait_core::config::E2eConfig;
use appwait_core::driver::{AppState, AutomationDriver, DriverError, Selector};
use appwait_core::wait::WaitConfig;

// ---------------------------------------------------------------------------
// Recorded calls
// ---------------------------------------------------------------------------

/// One call received by the [`MockDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Reset,
    LaunchApp(String),
    QueryAppState(String),
    CurrentActivity,
    DeepLink { url: String, package: String },
    IsKeyboardShown,
    IsDisplayed(Selector),
    Click(Selector),
    SetValue(Selector, String),
}

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

/// A sequence of canned results. Each read pops the front entry; the last
/// entry repeats forever. An empty script reports `NotConnected`.
struct Script<T> {
    entries: VecDeque<Result<T, String>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<T: Clone> Script<T> {
    fn new(entries: Vec<Result<T, String>>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    fn next(&mut self) -> Result<T, DriverError> {
        let entry = if self.entries.len() > 1 {
            self.entries.pop_front()
        } else {
            self.entries.front().cloned()
        };
        match entry {
            Some(Ok(value)) => Ok(value),
            Some(Err(msg)) => Err(DriverError::CommandFailed(msg)),
            None => Err(DriverError::NotConnected),
        }
    }
}

// ---------------------------------------------------------------------------
// MockDriver
// ---------------------------------------------------------------------------

/// Scripted [`AutomationDriver`] used across the integration tests.
///
/// Unscripted elements are reported as not displayed, and the keyboard is
/// hidden unless [`with_keyboard_shown`](Self::with_keyboard_shown) is used.
#[derive(Default)]
pub struct MockDriver {
    calls: Mutex<Vec<Call>>,
    app_states: Mutex<Script<AppState>>,
    activities: Mutex<Script<String>>,
    displayed: Mutex<HashMap<Selector, Script<bool>>>,
    keyboard_shown: bool,
    reset_error: Option<String>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_states(self, states: Vec<Result<AppState, String>>) -> Self {
        *self.app_states.lock().unwrap() = Script::new(states);
        self
    }

    pub fn with_activities(self, activities: Vec<Result<&str, String>>) -> Self {
        let entries = activities
            .into_iter()
            .map(|a| a.map(str::to_string))
            .collect();
        *self.activities.lock().unwrap() = Script::new(entries);
        self
    }

    pub fn with_displayed(self, selector: Selector, values: Vec<Result<bool, String>>) -> Self {
        self.displayed
            .lock()
            .unwrap()
            .insert(selector, Script::new(values));
        self
    }

    pub fn with_keyboard_shown(mut self, shown: bool) -> Self {
        self.keyboard_shown = shown;
        self
    }

    pub fn with_reset_error(mut self, message: &str) -> Self {
        self.reset_error = Some(message.to_string());
        self
    }

    pub fn into_arc(self) -> Arc<MockDriver> {
        Arc::new(self)
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than the polling queries, in order.
    pub fn actions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| {
                !matches!(
                    call,
                    Call::IsDisplayed(_) | Call::QueryAppState(_) | Call::CurrentActivity
                )
            })
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AutomationDriver for MockDriver {
    async fn reset(&self) -> Result<(), DriverError> {
        self.record(Call::Reset);
        match &self.reset_error {
            Some(msg) => Err(DriverError::CommandFailed(msg.clone())),
            None => Ok(()),
        }
    }

    async fn launch_app(&self, bundle_id: &str) -> Result<(), DriverError> {
        self.record(Call::LaunchApp(bundle_id.to_string()));
        Ok(())
    }

    async fn query_app_state(&self, bundle_id: &str) -> Result<AppState, DriverError> {
        self.record(Call::QueryAppState(bundle_id.to_string()));
        self.app_states.lock().unwrap().next()
    }

    async fn current_activity(&self) -> Result<String, DriverError> {
        self.record(Call::CurrentActivity);
        self.activities.lock().unwrap().next()
    }

    async fn deep_link(&self, url: &str, package: &str) -> Result<(), DriverError> {
        self.record(Call::DeepLink {
            url: url.to_string(),
            package: package.to_string(),
        });
        Ok(())
    }

    async fn is_keyboard_shown(&self) -> Result<bool, DriverError> {
        self.record(Call::IsKeyboardShown);
        Ok(self.keyboard_shown)
    }

    async fn is_displayed(&self, selector: &Selector) -> Result<bool, DriverError> {
        self.record(Call::IsDisplayed(selector.clone()));
        match self.displayed.lock().unwrap().get_mut(selector) {
            Some(script) => script.next(),
            None => Ok(false),
        }
    }

    async fn click(&self, selector: &Selector) -> Result<(), DriverError> {
        self.record(Call::Click(selector.clone()));
        Ok(())
    }

    async fn set_value(&self, selector: &Selector, text: &str) -> Result<(), DriverError> {
        self.record(Call::SetValue(selector.clone(), text.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

/// A one-second wait polled every 100 ms.
pub fn short_wait() -> WaitConfig {
    WaitConfig::from_millis(1000, 100).unwrap()
}

/// Default suite config with [`short_wait`] timings.
pub fn test_config() -> E2eConfig {
    E2eConfig {
        wait: short_wait(),
        ..Default::default()
    }
}
