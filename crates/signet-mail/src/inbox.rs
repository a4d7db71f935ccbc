use std::time::Duration;

use async_trait::async_trait;
use signet_report::StepLog;
use tokio::time::Instant;
use tracing::debug;

use crate::{otp, Error};

/// Bounded-wait settings for the inbox polling loop.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    /// Total wall-clock budget for a message to arrive.
    pub max_wait: Duration,
    /// Per-attempt wait for the first message row.
    pub poll_interval: Duration,
    /// Wait for the opened message body to render.
    pub body_wait: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(30),
            poll_interval: Duration::from_secs(3),
            body_wait: Duration::from_secs(20),
        }
    }
}

/// A web inbox the watcher can drive.
///
/// Implementations wrap a live browser session; tests use scripted fakes.
#[async_trait]
pub trait InboxPage {
    /// Navigate to the inbox for `mailbox`.
    async fn open(&self, mailbox: &str) -> Result<(), Error>;

    /// Wait up to `wait` for the first clickable message row and open it.
    /// `Ok(false)` when no row showed up within the window.
    async fn click_first_message(&self, wait: Duration) -> Result<bool, Error>;

    /// Trigger the inbox refresh action.
    async fn refresh(&self) -> Result<(), Error>;

    /// Text of the currently opened message.
    async fn message_body(&self, wait: Duration) -> Result<String, Error>;
}

/// Polls a web inbox until a message arrives, then pulls a 6-digit code
/// out of its body.
///
/// The watcher never hands an error back to its caller: every lookup or
/// navigation failure degrades to a FAIL record in the step log and an
/// empty result.
pub struct InboxWatcher<'a, P: InboxPage> {
    page: &'a P,
}

impl<'a, P: InboxPage> InboxWatcher<'a, P> {
    pub fn new(page: &'a P) -> Self {
        Self { page }
    }

    /// Open the inbox for `mailbox`, wait for a message, and extract the
    /// first 6-digit code from its body.
    pub async fn fetch_code(
        &self,
        mailbox: &str,
        options: &PollOptions,
        log: &mut StepLog,
    ) -> Option<String> {
        if let Err(err) = self.page.open(mailbox).await {
            log.fail(format!("Error opening inbox for {mailbox}: {err}"));
            return None;
        }
        log.pass(format!("Opened inbox for {mailbox}."));

        if !self.wait_for_message(options, log).await {
            return None;
        }

        let body = match self.page.message_body(options.body_wait).await {
            Ok(body) => body,
            Err(err) => {
                log.fail(format!("Error reading message body: {err}"));
                return None;
            }
        };

        match otp::extract_code(&body) {
            Some(code) => {
                log.pass(format!("Extracted OTP: {code}"));
                Some(code)
            }
            None => {
                log.fail("OTP not found in email.");
                None
            }
        }
    }

    /// Poll until the first row opens, `max_wait` elapses, or a refresh
    /// fails (abort early rather than spinning against a dead control).
    async fn wait_for_message(&self, options: &PollOptions, log: &mut StepLog) -> bool {
        let deadline = Instant::now() + options.max_wait;
        loop {
            let attempt = Instant::now();
            match self.page.click_first_message(options.poll_interval).await {
                Ok(true) => {
                    log.pass("Opened first message row.");
                    return true;
                }
                Ok(false) => {}
                Err(err) => debug!("message row lookup failed: {err}"),
            }

            if Instant::now() >= deadline {
                log.fail(format!(
                    "No message arrived within {}s.",
                    options.max_wait.as_secs()
                ));
                return false;
            }

            if let Err(err) = self.page.refresh().await {
                log.fail(format!("Unable to refresh inbox: {err}"));
                return false;
            }
            log.info("Refreshed inbox.");

            // A page that answers faster than the poll window would turn
            // this loop into a busy spin; sleep out the remainder.
            let elapsed = attempt.elapsed();
            if elapsed < options.poll_interval {
                tokio::time::sleep(options.poll_interval - elapsed).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_report::StepStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Inbox whose first row appears only after a number of refreshes.
    struct ArrivesAfter {
        refreshes_needed: usize,
        refreshes: AtomicUsize,
        body: &'static str,
    }

    #[async_trait]
    impl InboxPage for ArrivesAfter {
        async fn open(&self, _mailbox: &str) -> Result<(), Error> {
            Ok(())
        }

        async fn click_first_message(&self, _wait: Duration) -> Result<bool, Error> {
            Ok(self.refreshes.load(Ordering::SeqCst) >= self.refreshes_needed)
        }

        async fn refresh(&self) -> Result<(), Error> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn message_body(&self, _wait: Duration) -> Result<String, Error> {
            Ok(self.body.to_string())
        }
    }

    /// Inbox where the refresh control itself is broken.
    struct RefreshFails;

    #[async_trait]
    impl InboxPage for RefreshFails {
        async fn open(&self, _mailbox: &str) -> Result<(), Error> {
            Ok(())
        }

        async fn click_first_message(&self, _wait: Duration) -> Result<bool, Error> {
            Ok(false)
        }

        async fn refresh(&self) -> Result<(), Error> {
            Err(Error::Navigation("refresh control missing".into()))
        }

        async fn message_body(&self, _wait: Duration) -> Result<String, Error> {
            Ok(String::new())
        }
    }

    /// Inbox that cannot even be opened.
    struct OpenFails;

    #[async_trait]
    impl InboxPage for OpenFails {
        async fn open(&self, _mailbox: &str) -> Result<(), Error> {
            Err(Error::Navigation("connection refused".into()))
        }

        async fn click_first_message(&self, _wait: Duration) -> Result<bool, Error> {
            Ok(false)
        }

        async fn refresh(&self) -> Result<(), Error> {
            Ok(())
        }

        async fn message_body(&self, _wait: Duration) -> Result<String, Error> {
            Ok(String::new())
        }
    }

    fn fast_options() -> PollOptions {
        PollOptions {
            max_wait: Duration::from_millis(100),
            poll_interval: Duration::from_millis(10),
            body_wait: Duration::from_millis(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn code_from_message_already_present() {
        let page = ArrivesAfter {
            refreshes_needed: 0,
            refreshes: AtomicUsize::new(0),
            body: "Your code is 123456, expires in 10 minutes",
        };
        let mut log = StepLog::new();
        let code = InboxWatcher::new(&page)
            .fetch_code("john.smith.abcdtest", &fast_options(), &mut log)
            .await;
        assert_eq!(code.as_deref(), Some("123456"));
        assert!(!log.has_failures());
        assert_eq!(page.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn code_after_two_refreshes() {
        let page = ArrivesAfter {
            refreshes_needed: 2,
            refreshes: AtomicUsize::new(0),
            body: "verification code 654321",
        };
        let mut log = StepLog::new();
        let code = InboxWatcher::new(&page)
            .fetch_code("box", &fast_options(), &mut log)
            .await;
        assert_eq!(code.as_deref(), Some("654321"));
        assert_eq!(page.refreshes.load(Ordering::SeqCst), 2);
        let refreshes = log
            .steps()
            .iter()
            .filter(|s| s.description == "Refreshed inbox.")
            .count();
        assert_eq!(refreshes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_failure_aborts_early() {
        let page = RefreshFails;
        let mut log = StepLog::new();
        let code = InboxWatcher::new(&page)
            .fetch_code("box", &fast_options(), &mut log)
            .await;
        assert_eq!(code, None);
        assert!(log
            .steps()
            .iter()
            .any(|s| s.status == StepStatus::Fail
                && s.description.starts_with("Unable to refresh inbox")));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_by_max_wait_despite_refreshes() {
        let page = ArrivesAfter {
            refreshes_needed: usize::MAX,
            refreshes: AtomicUsize::new(0),
            body: "",
        };
        let mut log = StepLog::new();
        let options = PollOptions {
            max_wait: Duration::from_millis(55),
            poll_interval: Duration::from_millis(10),
            body_wait: Duration::from_millis(10),
        };
        let code = InboxWatcher::new(&page)
            .fetch_code("box", &options, &mut log)
            .await;
        assert_eq!(code, None);
        // One refresh per poll window, plus the attempt that crosses the
        // deadline; the loop cannot run unbounded.
        let refreshes = page.refreshes.load(Ordering::SeqCst);
        assert!(refreshes <= 7, "too many refreshes: {refreshes}");
        assert!(log
            .steps()
            .iter()
            .any(|s| s.description.starts_with("No message arrived")));
    }

    #[tokio::test(start_paused = true)]
    async fn body_without_code_logs_fail_and_returns_none() {
        let page = ArrivesAfter {
            refreshes_needed: 0,
            refreshes: AtomicUsize::new(0),
            body: "no codes here",
        };
        let mut log = StepLog::new();
        let code = InboxWatcher::new(&page)
            .fetch_code("box", &fast_options(), &mut log)
            .await;
        assert_eq!(code, None);
        assert!(log
            .steps()
            .iter()
            .any(|s| s.status == StepStatus::Fail && s.description == "OTP not found in email."));
    }

    #[tokio::test(start_paused = true)]
    async fn open_failure_degrades_to_fail_record() {
        let page = OpenFails;
        let mut log = StepLog::new();
        let code = InboxWatcher::new(&page)
            .fetch_code("box", &fast_options(), &mut log)
            .await;
        assert_eq!(code, None);
        assert!(log.has_failures());
    }
}
