use std::time::Duration;

use signet_mail::Identity;
use signet_report::StepLog;
use tokio::time::sleep;

use super::{focused_window, StageOutcome};
use crate::config::Config;
use crate::driver::{DesktopDriver, Role};
use crate::resolve::{resolve, TargetSpec};

const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Fill and submit the account creation form in the account browser
/// window.
pub async fn fill_signup_form(
    driver: &dyn DesktopDriver,
    config: &Config,
    identity: &Identity,
    log: &mut StepLog,
) -> StageOutcome {
    let account = &config.account;

    let window = match focused_window(
        driver,
        &account.window_title,
        Duration::from_secs(account.window_timeout_secs),
    )
    .await
    {
        Ok(window) => window,
        Err(err) => {
            log.fail(format!("Error focusing account browser window: {err}"));
            return StageOutcome::failed(err.to_string());
        }
    };
    log.pass("Focused account sign-up browser window.");

    let fields = [
        (account.first_name_id.as_str(), identity.first_name.as_str()),
        (account.last_name_id.as_str(), identity.last_name.as_str()),
        (account.email_id.as_str(), identity.email.as_str()),
        (
            account.password_id.as_str(),
            account.signup_password.as_str(),
        ),
    ];
    for (id, value) in fields {
        let typed = match window.child_by_id(id, Role::Edit, CONTROL_TIMEOUT).await {
            Ok(field) => field.type_text(value).await,
            Err(err) => Err(err),
        };
        if let Err(err) = typed {
            log.fail(format!("Error filling account form field '{id}': {err}"));
            return StageOutcome::failed(err.to_string());
        }
    }

    let submit = TargetSpec::new("sign-up submit button")
        .by_id(account.submit_id.clone(), Role::Button)
        .scan_text("Create", Role::Button);
    match resolve(window.as_ref(), &submit, CONTROL_TIMEOUT).await {
        Ok(button) => {
            if let Err(err) = button.click().await {
                log.fail(format!("Error submitting account form: {err}"));
                return StageOutcome::failed(err.to_string());
            }
        }
        Err(err) => {
            log.fail(format!("Could not find sign-up submit button: {err}"));
            return StageOutcome::failed(err.to_string());
        }
    }

    log.pass(format!(
        "Filled account form with Name: {} {} | Email: {}",
        identity.first_name, identity.last_name, identity.email
    ));

    // Let the submission land before the inbox poll starts.
    sleep(Duration::from_secs(6)).await;
    StageOutcome::done()
}

/// Drive the sign-in form: email, "Use password", password, submit.
pub async fn sign_in(driver: &dyn DesktopDriver, config: &Config, log: &mut StepLog) -> StageOutcome {
    let account = &config.account;
    let creds = &config.signin;

    let window = match focused_window(
        driver,
        &account.window_title,
        Duration::from_secs(account.window_timeout_secs),
    )
    .await
    {
        Ok(window) => window,
        Err(err) => {
            log.fail(format!("Error focusing sign-in browser window: {err}"));
            return StageOutcome::failed(err.to_string());
        }
    };
    log.pass("Focused account sign-in browser window.");

    // Let the page finish loading; the email box takes focus on load and
    // is typed into blind.
    sleep(Duration::from_secs(2)).await;
    if let Err(err) = window.type_into_focused(&creds.email).await {
        log.fail(format!("Error typing email/username: {err}"));
        return StageOutcome::failed(err.to_string());
    }
    log.pass(format!("Typed email/username: {}", creds.email));
    sleep(Duration::from_secs(1)).await;

    let use_password = TargetSpec::new("Use password button")
        .by_name(account.use_password_name.clone(), Role::Button)
        .scan_text(account.use_password_name.clone(), Role::Button);
    match resolve(window.as_ref(), &use_password, Duration::from_secs(30)).await {
        Ok(button) => match button.click().await {
            Ok(()) => log.pass("Clicked 'Use password' button."),
            Err(err) => {
                log.fail(format!("Error clicking 'Use password' button: {err}"));
                return StageOutcome::failed(err.to_string());
            }
        },
        Err(err) => {
            log.fail(format!("Could not find 'Use password' button: {err}"));
            return StageOutcome::failed(err.to_string());
        }
    }
    sleep(Duration::from_secs(3)).await;

    let password_field = TargetSpec::new("password field")
        .by_id(account.password_id.clone(), Role::Edit)
        .first_of_role(Role::Edit);
    match resolve(window.as_ref(), &password_field, Duration::from_secs(30)).await {
        Ok(field) => {
            if let Err(err) = field.type_text(&creds.password).await {
                log.fail(format!("Error typing password: {err}"));
                return StageOutcome::failed(err.to_string());
            }
            log.pass("Typed password.");
        }
        Err(_) => {
            log.fail("No Edit control found for password field.");
            return StageOutcome::failed("password field not found");
        }
    }
    sleep(Duration::from_secs(1)).await;

    let submit = TargetSpec::new("sign-in submit button")
        .by_id(account.sign_in_submit_id.clone(), Role::Button)
        .scan_text(account.sign_in_submit_text.clone(), Role::Button);
    match resolve(window.as_ref(), &submit, Duration::from_secs(30)).await {
        Ok(button) => match button.click().await {
            Ok(()) => log.pass("Clicked 'Sign in' button."),
            Err(err) => {
                log.fail(format!("Error clicking 'Sign in' button: {err}"));
                return StageOutcome::failed(err.to_string());
            }
        },
        Err(_) => {
            log.fail("Could not locate 'Sign in' button.");
            return StageOutcome::failed("sign-in button not found");
        }
    }

    // Wait for the login round-trip to finish.
    sleep(Duration::from_secs(6)).await;
    StageOutcome::done()
}

/// Paste the OTP into the verification field and submit it.
///
/// The code field rejects synthetic keystrokes, so the transfer goes
/// through the clipboard.
pub async fn enter_verification_code(
    driver: &dyn DesktopDriver,
    config: &Config,
    code: &str,
    log: &mut StepLog,
) -> StageOutcome {
    let account = &config.account;

    let window = match focused_window(
        driver,
        &account.window_title,
        Duration::from_secs(account.window_timeout_secs),
    )
    .await
    {
        Ok(window) => window,
        Err(err) => {
            log.fail(format!("OTP verification failed: {err}"));
            return StageOutcome::failed(err.to_string());
        }
    };
    log.pass("Focused OTP input screen.");

    let field = match window
        .child_by_id(&account.code_field_id, Role::Edit, CONTROL_TIMEOUT)
        .await
    {
        Ok(field) => field,
        Err(err) => {
            log.fail(format!("OTP verification failed: {err}"));
            return StageOutcome::failed(err.to_string());
        }
    };

    if let Err(err) = crate::driver::clipboard::set_text(code) {
        log.fail(format!("Error copying OTP to clipboard: {err}"));
        return StageOutcome::failed(err.to_string());
    }
    sleep(Duration::from_secs(1)).await;

    if let Err(err) = field.paste().await {
        log.fail(format!("Error pasting OTP: {err}"));
        return StageOutcome::failed(err.to_string());
    }
    log.pass("OTP pasted successfully.");

    let verify = TargetSpec::new("Verify button")
        .by_id(account.verify_button_id.clone(), Role::Button)
        .scan_text("Verify", Role::Button);
    match resolve(window.as_ref(), &verify, CONTROL_TIMEOUT).await {
        Ok(button) => match button.click().await {
            Ok(()) => log.pass("Clicked Verify button."),
            Err(err) => {
                log.fail(format!("Error clicking Verify button: {err}"));
                return StageOutcome::failed(err.to_string());
            }
        },
        Err(err) => {
            log.fail(format!("Could not find Verify button: {err}"));
            return StageOutcome::failed(err.to_string());
        }
    }

    sleep(Duration::from_secs(4)).await;
    StageOutcome::done()
}
