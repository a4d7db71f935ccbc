use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use signet_mail::Identity;
use signet_report::StepLog;
use tracing::{info, warn};

use crate::config::Config;
use crate::driver::{self, web::WebSession};
use crate::flows::{self, launch::AccountEntry};
use crate::Result;

const DIALOG_WAIT: Duration = Duration::from_secs(5);

/// Which end-to-end flow to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Create an account and verify it with the emailed OTP.
    Signup,
    /// Sign in with configured credentials, then exercise the scan screen.
    Signin,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Signup => f.write_str("signup"),
            Flow::Signin => f.write_str("signin"),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// True when no step recorded FAIL.
    pub succeeded: bool,
    /// Number of steps recorded.
    pub steps: usize,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
    /// Where the report landed.
    pub report_path: PathBuf,
}

/// Executes flows and owns the run's step log.
///
/// Stages never abort the process: the orchestrator inspects each
/// [`flows::StageOutcome`] and decides what still makes sense to attempt,
/// and every path ends in report generation.
pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a flow to completion and write the report.
    pub async fn run(&self, flow: Flow) -> Result<RunSummary> {
        let start = Instant::now();
        info!("running {flow} flow");

        let mut log = StepLog::new();
        match flow {
            Flow::Signup => self.run_signup(&mut log).await,
            Flow::Signin => self.run_signin(&mut log).await,
        }

        self.finish(log, start)
    }

    async fn run_signup(&self, log: &mut StepLog) {
        let identity = Identity::generate(&self.config.identity.pools(), &mut rand::thread_rng());
        log.pass(format!("Generated email: {}", identity.email));

        let desktop = match driver::desktop() {
            Ok(desktop) => desktop,
            Err(err) => {
                log.fail(format!("Desktop automation unavailable: {err}, aborting flow."));
                return;
            }
        };

        let launched = flows::launch::open_account_entry(
            desktop.as_ref(),
            &self.config,
            AccountEntry::CreateAccount,
            log,
        )
        .await;
        if !launched.succeeded {
            log.fail("Application launch failed, aborting flow.");
            return;
        }

        // A failed form fill is not fatal: the inbox may still receive a
        // message from a partial submission, and the report should show
        // every stage that was attempted.
        flows::account::fill_signup_form(desktop.as_ref(), &self.config, &identity, log).await;

        let session = match WebSession::open(&self.config.browser).await {
            Ok(session) => Some(session),
            Err(err) => {
                log.fail(format!("Error launching browser for inbox: {err}"));
                None
            }
        };

        let otp = match &session {
            Some(session) => {
                flows::verify::fetch_otp(session, &self.config, &identity.mailbox, log).await
            }
            None => None,
        };

        match otp {
            Some(code) => {
                flows::account::enter_verification_code(
                    desktop.as_ref(),
                    &self.config,
                    &code,
                    log,
                )
                .await;
            }
            None => log.fail("OTP was not retrieved. Skipping verification."),
        }

        flows::alert::accept_alert_if_present(session.as_ref(), DIALOG_WAIT, log).await;

        if let Some(session) = session {
            if let Err(err) = session.close().await {
                warn!("failed to close browser session: {err}");
            }
        }
    }

    async fn run_signin(&self, log: &mut StepLog) {
        let creds = &self.config.signin;
        if creds.email.is_empty() || creds.password.is_empty() {
            log.fail("Sign-in credentials are not configured.");
            return;
        }
        log.pass(format!("Using sign-in credentials: {} / ********", creds.email));

        let desktop = match driver::desktop() {
            Ok(desktop) => desktop,
            Err(err) => {
                log.fail(format!("Desktop automation unavailable: {err}, aborting flow."));
                return;
            }
        };

        let launched = flows::launch::open_account_entry(
            desktop.as_ref(),
            &self.config,
            AccountEntry::SignIn,
            log,
        )
        .await;
        if !launched.succeeded {
            log.fail("Application launch failed, aborting flow.");
            return;
        }

        // Give the account browser window time to open.
        tokio::time::sleep(Duration::from_secs(5)).await;

        flows::account::sign_in(desktop.as_ref(), &self.config, log).await;

        // This flow never opens a browser session of its own.
        flows::alert::accept_alert_if_present(None, DIALOG_WAIT, log).await;

        flows::scan::click_scan(desktop.as_ref(), &self.config, log).await;
        flows::scan::return_home(desktop.as_ref(), &self.config, log).await;
    }

    fn finish(&self, log: StepLog, start: Instant) -> Result<RunSummary> {
        let report = &self.config.report;
        log.write_html(&report.path, &report.title)?;
        info!("report generated: {}", report.path);

        Ok(RunSummary {
            succeeded: !log.has_failures(),
            steps: log.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            report_path: PathBuf::from(&report.path),
        })
    }
}

#[cfg(test)]
#[cfg(not(target_os = "windows"))]
mod tests {
    use super::*;

    fn config_with_report(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.report.path = dir
            .path()
            .join("automation_report.html")
            .display()
            .to_string();
        config
    }

    #[tokio::test]
    async fn signup_without_desktop_backend_still_reports() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_report(&dir);
        let path = config.report.path.clone();

        let summary = Runner::new(config).run(Flow::Signup).await.unwrap();
        assert!(!summary.succeeded);
        assert!(summary.steps >= 2);

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Generated email:"));
        assert!(html.contains("Desktop automation unavailable"));
        assert!(html.contains("<tr><th>Step</th><th>Status</th></tr>"));
    }

    #[tokio::test]
    async fn signin_without_credentials_still_reports() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_report(&dir);
        let path = config.report.path.clone();

        let summary = Runner::new(config).run(Flow::Signin).await.unwrap();
        assert!(!summary.succeeded);

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Sign-in credentials are not configured."));
    }
}
