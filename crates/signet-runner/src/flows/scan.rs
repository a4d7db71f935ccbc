use std::time::Duration;

use signet_report::StepLog;
use tokio::time::sleep;

use super::{focused_window, StageOutcome};
use crate::config::Config;
use crate::driver::{DesktopDriver, Role};
use crate::resolve::{resolve, TargetSpec};

const CONTROL_TIMEOUT: Duration = Duration::from_secs(15);

/// Click the Scan tile on the application home screen.
pub async fn click_scan(driver: &dyn DesktopDriver, config: &Config, log: &mut StepLog) -> StageOutcome {
    click_main_window_button(
        driver,
        config,
        &config.app.scan_button_name,
        "Refocused main window before clicking 'Scan'.",
        "Clicked 'Scan' button on the home screen.",
        log,
    )
    .await
}

/// Click "Return Home" on the scan screen.
pub async fn return_home(driver: &dyn DesktopDriver, config: &Config, log: &mut StepLog) -> StageOutcome {
    click_main_window_button(
        driver,
        config,
        &config.app.return_home_name,
        "Focused scan screen to click 'Return Home'.",
        "Clicked 'Return Home' button on the scan screen.",
        log,
    )
    .await
}

async fn click_main_window_button(
    driver: &dyn DesktopDriver,
    config: &Config,
    button_name: &str,
    focus_step: &str,
    click_step: &str,
    log: &mut StepLog,
) -> StageOutcome {
    let app = &config.app;

    let window = match focused_window(
        driver,
        &app.window_title,
        Duration::from_secs(app.window_timeout_secs),
    )
    .await
    {
        Ok(window) => window,
        Err(err) => {
            log.fail(format!("Error focusing {} window: {err}", app.window_title));
            return StageOutcome::failed(err.to_string());
        }
    };
    log.pass(focus_step);

    let spec = TargetSpec::new(format!("'{button_name}' button"))
        .by_name(button_name.to_string(), Role::Button)
        .scan_text(button_name.to_string(), Role::Button);
    match resolve(window.as_ref(), &spec, CONTROL_TIMEOUT).await {
        Ok(button) => {
            if let Err(err) = button.click().await {
                log.fail(format!("Error clicking '{button_name}' button: {err}"));
                return StageOutcome::failed(err.to_string());
            }
            log.pass(click_step);
        }
        Err(_) => {
            log.fail(format!(
                "Could not find '{button_name}' button on the {} window.",
                app.window_title
            ));
            return StageOutcome::failed(format!("'{button_name}' button not found"));
        }
    }

    // Wait out the screen transition.
    sleep(Duration::from_secs(5)).await;
    StageOutcome::done()
}
