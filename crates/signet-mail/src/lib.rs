//! # signet-mail
//!
//! Disposable identities and one-time-passcode retrieval for account
//! automation flows.
//!
//! The crate owns three things: generating a plausible throwaway identity
//! (name plus mailbox address), pulling a 6-digit verification code out of
//! a message body, and the polling loop that watches a web inbox until a
//! message shows up. The inbox itself is reached through the [`InboxPage`]
//! trait so the loop can run against any browser backend (or a scripted
//! fake in tests).

mod identity;
mod inbox;
mod otp;

pub use identity::{Identity, NamePools, DEFAULT_FIRST_NAMES, DEFAULT_LAST_NAMES};
pub use inbox::{InboxPage, InboxWatcher, PollOptions};
pub use otp::extract_code;

/// Errors surfaced by an [`InboxPage`] implementation.
///
/// The watcher itself never propagates these to its caller; they degrade
/// to FAIL step records.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("inbox navigation failed: {0}")]
    Navigation(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),
}
