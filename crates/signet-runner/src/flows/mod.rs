//! The flow stages.
//!
//! Each stage appends its own ordered step records to the run's
//! [`signet_report::StepLog`] and hands back a [`StageOutcome`]; the
//! orchestrator inspects outcomes to decide whether to keep going. No
//! stage ever panics or propagates an error past its boundary.

pub mod account;
pub mod alert;
pub mod launch;
pub mod scan;
pub mod verify;

use std::time::Duration;

use crate::driver::{DesktopDriver, DesktopWindow, DriverError};

/// What a stage produced: whether it succeeded, a message describing the
/// failure, and an optional value for the orchestrator.
#[derive(Debug)]
pub struct StageOutcome<T = ()> {
    pub succeeded: bool,
    pub message: Option<String>,
    pub value: Option<T>,
}

impl<T> StageOutcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            succeeded: true,
            message: None,
            value: Some(value),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: Some(message.into()),
            value: None,
        }
    }
}

impl StageOutcome<()> {
    pub fn done() -> Self {
        Self::ok(())
    }
}

/// Find a window by title fragment and bring it to the foreground.
pub(crate) async fn focused_window(
    driver: &dyn DesktopDriver,
    title_fragment: &str,
    timeout: Duration,
) -> Result<Box<dyn DesktopWindow>, DriverError> {
    let window = driver.window(title_fragment, timeout).await?;
    window.focus().await?;
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_constructors() {
        let ok = StageOutcome::ok(42);
        assert!(ok.succeeded);
        assert_eq!(ok.value, Some(42));
        assert!(ok.message.is_none());

        let failed: StageOutcome<()> = StageOutcome::failed("window missing");
        assert!(!failed.succeeded);
        assert_eq!(failed.message.as_deref(), Some("window missing"));
        assert!(failed.value.is_none());
    }
}
