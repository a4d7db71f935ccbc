use std::time::Duration;

use async_trait::async_trait;
use signet_mail::{Error as MailError, InboxPage, InboxWatcher};
use signet_report::StepLog;

use crate::config::{Config, InboxConfig};
use crate::driver::web::WebSession;

const OPEN_WAIT: Duration = Duration::from_secs(20);

/// The mailsac web UI as seen by the inbox watcher.
pub struct MailsacInbox<'a> {
    session: &'a WebSession,
    config: &'a InboxConfig,
}

impl<'a> MailsacInbox<'a> {
    pub fn new(session: &'a WebSession, config: &'a InboxConfig) -> Self {
        Self { session, config }
    }

    fn mailbox_selector(&self) -> String {
        format!("input[placeholder='{}']", self.config.mailbox_placeholder)
    }
}

#[async_trait]
impl InboxPage for MailsacInbox<'_> {
    async fn open(&self, mailbox: &str) -> Result<(), MailError> {
        self.session.goto(&self.config.url).await.map_err(nav)?;

        let selector = self.mailbox_selector();
        if !self
            .session
            .wait_for(&selector, OPEN_WAIT)
            .await
            .map_err(nav)?
        {
            return Err(MailError::Timeout(format!("mailbox input '{selector}'")));
        }
        self.session.fill(&selector, mailbox).await.map_err(nav)?;

        if !self
            .session
            .click_by_text(&self.config.check_button_text)
            .await
            .map_err(nav)?
        {
            return Err(MailError::Navigation(format!(
                "check button '{}' not found",
                self.config.check_button_text
            )));
        }
        Ok(())
    }

    async fn click_first_message(&self, wait: Duration) -> Result<bool, MailError> {
        if !self
            .session
            .wait_for(&self.config.row_selector, wait)
            .await
            .map_err(nav)?
        {
            return Ok(false);
        }
        self.session
            .click(&self.config.row_selector)
            .await
            .map_err(nav)?;
        Ok(true)
    }

    async fn refresh(&self) -> Result<(), MailError> {
        match self
            .session
            .click_by_text(&self.config.check_button_text)
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::Navigation(format!(
                "check button '{}' not found",
                self.config.check_button_text
            ))),
            Err(err) => Err(nav(err)),
        }
    }

    async fn message_body(&self, wait: Duration) -> Result<String, MailError> {
        if !self
            .session
            .wait_for(&self.config.body_selector, wait)
            .await
            .map_err(nav)?
        {
            return Err(MailError::Timeout(format!(
                "message body '{}'",
                self.config.body_selector
            )));
        }
        self.session
            .inner_text(&self.config.body_selector)
            .await
            .map_err(nav)?
            .ok_or_else(|| MailError::Navigation("message body disappeared".into()))
    }
}

fn nav(err: crate::Error) -> MailError {
    MailError::Navigation(err.to_string())
}

/// Poll the inbox for `mailbox` and extract the verification code. Every
/// failure inside the loop degrades to a FAIL step; callers only see the
/// optional code.
pub async fn fetch_otp(
    session: &WebSession,
    config: &Config,
    mailbox: &str,
    log: &mut StepLog,
) -> Option<String> {
    let inbox = MailsacInbox::new(session, &config.inbox);
    InboxWatcher::new(&inbox)
        .fetch_code(mailbox, &config.inbox.poll_options(), log)
        .await
}
