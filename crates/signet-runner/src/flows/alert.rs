use std::time::Duration;

use signet_report::StepLog;
use tracing::debug;

use crate::driver::web::WebSession;

/// Best-effort acceptance of a pending browser dialog. A no-op when no
/// session is active; an absent dialog is normal, not a failure.
pub async fn accept_alert_if_present(
    session: Option<&WebSession>,
    timeout: Duration,
    log: &mut StepLog,
) {
    let Some(session) = session else {
        return;
    };

    match session.accept_dialog(timeout).await {
        Ok(Some(message)) => {
            log.pass("Browser alert detected.");
            debug!("dialog message: {message}");
            log.pass("Browser alert accepted.");
        }
        Ok(None) => log.info("No browser alert present, continuing normally"),
        Err(err) => {
            debug!("dialog check failed: {err}");
            log.info("No browser alert present, continuing normally");
        }
    }
}
