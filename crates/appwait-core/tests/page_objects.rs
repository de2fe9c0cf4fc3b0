//! Integration tests for [`BasePage`] and [`wait_for_displayed`].

mod common;

use std::time::Duration;

use common::{short_wait, Call, MockDriver};

use appwait_core::driver::{DriverError, Selector};
use appwait_core::page::{wait_for_displayed, BasePage};
use appwait_core::wait::WaitOutcome;

fn login_screen() -> Selector {
    Selector::AccessibilityId("test-Login".to_string())
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_is_shown_after_a_few_polls() {
    let driver = MockDriver::new()
        .with_displayed(login_screen(), vec![Ok(false), Ok(false), Ok(true)])
        .into_arc();
    let page = BasePage::new(driver.clone(), login_screen(), short_wait());

    let start = tokio::time::Instant::now();
    assert!(page.wait_for_is_shown(true).await);
    assert_eq!(start.elapsed(), Duration::from_millis(200));
    assert_eq!(driver.count(&Call::IsDisplayed(login_screen())), 3);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_is_shown_times_out() {
    let driver = MockDriver::new().into_arc();
    let page = BasePage::new(driver, login_screen(), short_wait());

    let start = tokio::time::Instant::now();
    assert!(!page.wait_for_is_shown(true).await);
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_is_hidden() {
    let driver = MockDriver::new()
        .with_displayed(login_screen(), vec![Ok(true), Ok(true), Ok(false)])
        .into_arc();
    let page = BasePage::new(driver, login_screen(), short_wait());

    assert!(page.wait_for_is_shown(false).await);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_is_hidden_on_missing_element_is_immediate() {
    let driver = MockDriver::new().into_arc();
    let page = BasePage::new(driver.clone(), login_screen(), short_wait());

    let start = tokio::time::Instant::now();
    assert!(page.wait_for_is_shown(false).await);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(driver.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_is_hidden_fails_when_element_stays() {
    let driver = MockDriver::new()
        .with_displayed(login_screen(), vec![Ok(true)])
        .into_arc();
    let page = BasePage::new(driver, login_screen(), short_wait());

    assert!(!page.wait_for_is_shown(false).await);
}

#[tokio::test]
async fn test_is_displayed_is_a_single_check() {
    let driver = MockDriver::new()
        .with_displayed(login_screen(), vec![Ok(true)])
        .into_arc();
    let page = BasePage::new(driver.clone(), login_screen(), short_wait());

    assert!(page.is_displayed().await.unwrap());
    assert_eq!(driver.calls(), vec![Call::IsDisplayed(login_screen())]);
    assert_eq!(page.selector(), &login_screen());
}

#[tokio::test]
async fn test_is_displayed_propagates_driver_errors() {
    let driver = MockDriver::new()
        .with_displayed(login_screen(), vec![Err("session gone".to_string())])
        .into_arc();
    let page = BasePage::new(driver, login_screen(), short_wait());

    let err = page.is_displayed().await.unwrap_err();
    assert!(matches!(err, DriverError::CommandFailed(ref msg) if msg == "session gone"));
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_displayed_ignores_transient_errors() {
    let driver = MockDriver::new()
        .with_displayed(
            login_screen(),
            vec![Err("stale element".to_string()), Ok(true)],
        )
        .into_arc();

    let outcome = wait_for_displayed(driver.as_ref(), &login_screen(), true, short_wait()).await;
    assert_eq!(outcome, WaitOutcome::Satisfied);
}
