//! # signet-runner
//!
//! End-to-end account flows for a desktop application and its web
//! sign-up/sign-in journey: launch the app, drive the account forms,
//! fetch the one-time passcode from a disposable web inbox, feed it back
//! into the app, and write an HTML step report.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use signet_runner::{Config, Flow, Runner};
//!
//! # #[tokio::main]
//! # async fn main() -> signet_runner::Result<()> {
//! let config = Config::load("signet.yaml")?;
//! let runner = Runner::new(config);
//! let summary = runner.run(Flow::Signup).await?;
//! println!("all steps passed: {}", summary.succeeded);
//! # Ok(())
//! # }
//! ```
//!
//! The desktop and browser automation backends are reached through narrow
//! seams in [`driver`]; nothing here reimplements them.

mod config;
pub mod driver;
pub mod flows;
pub mod resolve;
mod runner;

pub use config::{
    AccountConfig, AppConfig, BrowserConfig, Config, IdentityConfig, InboxConfig, ReportConfig,
    SigninConfig, Viewport,
};
pub use driver::DriverError;
pub use runner::{Flow, RunSummary, Runner};

/// Result type for signet-runner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or flow execution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("report error: {0}")]
    Report(#[from] signet_report::ReportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = r#"
name: "Account flows"
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.name, "Account flows");
        assert_eq!(config.app.window_title, "HP Smart");
        assert_eq!(config.inbox.url, "https://mailsac.com");
        assert_eq!(config.inbox.max_wait_secs, 30);
        assert_eq!(config.inbox.poll_interval_secs, 3);
        assert!(!config.browser.headless);
        assert_eq!(config.report.path, "automation_report.html");
    }

    #[test]
    fn defaults_cover_a_full_run() {
        let config = Config::default();
        assert!(!config.identity.first_names.is_empty());
        assert!(!config.identity.last_names.is_empty());
        assert_eq!(config.identity.domain, "mailsac.com");
        assert_eq!(config.account.first_name_id, "firstName");
        assert_eq!(config.account.code_field_id, "code");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_browser_overrides() {
        let yaml = r#"
name: "Test"
browser:
  headless: true
  user_agent: "Custom UA"
  viewport:
    width: 1920
    height: 1080
"#;
        let config = Config::parse(yaml).unwrap();
        assert!(config.browser.headless);
        assert_eq!(config.browser.user_agent, Some("Custom UA".into()));
        let viewport = config.browser.viewport.unwrap();
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1080);
    }

    #[test]
    fn parse_identity_pools() {
        let yaml = r#"
name: "Test"
identity:
  first_names: ["Kai"]
  last_names: ["Ito"]
  suffix: "qa"
  domain: "example.org"
"#;
        let config = Config::parse(yaml).unwrap();
        let pools = config.identity.pools();
        assert_eq!(pools.first, vec!["Kai".to_string()]);
        assert_eq!(pools.suffix, "qa");
        assert_eq!(pools.domain, "example.org");
    }

    #[test]
    fn validation_rejects_empty_name() {
        let err = Config::parse("name: \"\"").unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn validation_rejects_zero_poll_interval() {
        let yaml = r#"
name: "Test"
inbox:
  poll_interval_secs: 0
"#;
        let err = Config::parse(yaml).unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn validation_rejects_max_wait_below_poll_interval() {
        let yaml = r#"
name: "Test"
inbox:
  max_wait_secs: 2
  poll_interval_secs: 5
"#;
        let err = Config::parse(yaml).unwrap_err();
        assert!(err.to_string().contains("max_wait"));
    }

    #[test]
    fn validation_rejects_empty_name_pool() {
        let yaml = r#"
name: "Test"
identity:
  first_names: []
"#;
        let err = Config::parse(yaml).unwrap_err();
        assert!(err.to_string().contains("first_names"));
    }

    #[test]
    fn poll_options_carry_configured_durations() {
        let yaml = r#"
name: "Test"
inbox:
  max_wait_secs: 60
  poll_interval_secs: 5
  body_wait_secs: 15
"#;
        let config = Config::parse(yaml).unwrap();
        let options = config.inbox.poll_options();
        assert_eq!(options.max_wait.as_secs(), 60);
        assert_eq!(options.poll_interval.as_secs(), 5);
        assert_eq!(options.body_wait.as_secs(), 15);
    }

    #[test]
    fn load_example_config() {
        let config = Config::load("configs/example.yaml").unwrap();
        assert_eq!(config.name, "Account sign-up with OTP verification");
        assert!(config.browser.headless);
        assert_eq!(config.report.path, "automation_report.html");
    }
}
