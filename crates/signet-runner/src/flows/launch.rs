use std::time::Duration;

use signet_report::StepLog;

use super::{focused_window, StageOutcome};
use crate::config::Config;
use crate::driver::{DesktopDriver, Role};
use crate::resolve::{resolve, TargetSpec};

const CONTROL_TIMEOUT: Duration = Duration::from_secs(15);

/// Which account entry point the launcher opens from the flyout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEntry {
    CreateAccount,
    SignIn,
}

/// Launch the application, focus its main window, and open the account
/// entry point.
pub async fn open_account_entry(
    driver: &dyn DesktopDriver,
    config: &Config,
    entry: AccountEntry,
    log: &mut StepLog,
) -> StageOutcome {
    let app = &config.app;

    if let Err(err) = driver.launch_app(&app.launch_query).await {
        log.fail(format!("Error launching {}: {err}", app.launch_query));
        return StageOutcome::failed(err.to_string());
    }
    log.pass(format!("Sent launch keys for {}.", app.launch_query));

    let window = match focused_window(
        driver,
        &app.window_title,
        Duration::from_secs(app.window_timeout_secs),
    )
    .await
    {
        Ok(window) => window,
        Err(err) => {
            log.fail(format!(
                "Error focusing {} main window: {err}",
                app.window_title
            ));
            return StageOutcome::failed(err.to_string());
        }
    };
    log.pass(format!("Focused {} main window.", app.window_title));

    let manage = TargetSpec::new("Manage Account button")
        .by_id(app.manage_account_id.clone(), Role::Button)
        .by_name(app.manage_account_name.clone(), Role::Button)
        .scan_text(app.manage_account_name.clone(), Role::Button);
    match resolve(window.as_ref(), &manage, CONTROL_TIMEOUT).await {
        Ok(button) => {
            if let Err(err) = button.click().await {
                log.fail(format!("Error clicking Manage Account button: {err}"));
                return StageOutcome::failed(err.to_string());
            }
            log.pass("Clicked Manage Account button.");
        }
        Err(err) => {
            log.fail(format!("Could not find Manage Account button: {err}"));
            return StageOutcome::failed(err.to_string());
        }
    }

    match entry {
        AccountEntry::CreateAccount => {
            let create = TargetSpec::new("Create Account button")
                .by_id(app.create_account_id.clone(), Role::Button)
                .scan_text("Create", Role::Button);
            match resolve(window.as_ref(), &create, CONTROL_TIMEOUT).await {
                Ok(button) => match button.click().await {
                    Ok(()) => log.pass("Clicked Create Account button."),
                    Err(err) => {
                        log.fail(format!("Error clicking Create Account button: {err}"));
                        return StageOutcome::failed(err.to_string());
                    }
                },
                Err(err) => {
                    log.fail(format!("Could not find Create Account button: {err}"));
                    return StageOutcome::failed(err.to_string());
                }
            }
        }
        AccountEntry::SignIn => {
            // The flyout skips straight to the browser when the app has a
            // remembered session, so a missing button is not a failure.
            let sign_in = TargetSpec::new("Sign In button")
                .by_id(app.sign_in_id.clone(), Role::Button)
                .scan_text("Sign in", Role::Button);
            match resolve(window.as_ref(), &sign_in, Duration::from_secs(10)).await {
                Ok(button) => match button.click().await {
                    Ok(()) => log.pass("Clicked Sign In button."),
                    Err(err) => {
                        log.fail(format!("Error clicking Sign In button: {err}"));
                        return StageOutcome::failed(err.to_string());
                    }
                },
                Err(_) => log.info(
                    "Sign In button not found in flyout, assuming browser is already opened.",
                ),
            }
        }
    }

    StageOutcome::done()
}
