//! Seams to the external automation collaborators.
//!
//! The flows never talk to an automation backend directly: the desktop
//! side goes through the object-safe traits below (one real backend, on
//! Windows, built on UI Automation), the web side through [`web::WebSession`],
//! and the clipboard through [`clipboard`]. Tests substitute scripted
//! implementations of the traits.

pub mod clipboard;
pub mod web;

#[cfg(target_os = "windows")]
mod windows;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Errors from the desktop automation seam.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("window not found: {0}")]
    WindowNotFound(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("desktop automation is not supported on this platform")]
    Unsupported,
}

/// Control roles the flows address; each backend maps them to its native
/// control types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Button,
    Edit,
}

/// Entry point into the desktop automation backend.
#[async_trait]
pub trait DesktopDriver: Send + Sync {
    /// Launch an application through the OS search/launcher UI.
    async fn launch_app(&self, query: &str) -> Result<(), DriverError>;

    /// Wait up to `timeout` for a top-level window whose title contains
    /// `title_fragment` to exist and become ready.
    async fn window(
        &self,
        title_fragment: &str,
        timeout: Duration,
    ) -> Result<Box<dyn DesktopWindow>, DriverError>;
}

/// A resolved top-level window.
#[async_trait]
pub trait DesktopWindow: Send + Sync {
    /// Bring the window to the foreground.
    async fn focus(&self) -> Result<(), DriverError>;

    /// Child element by stable automation identifier, waiting up to
    /// `timeout` for it to exist and become ready.
    async fn child_by_id(
        &self,
        id: &str,
        role: Role,
        timeout: Duration,
    ) -> Result<Box<dyn DesktopElement>, DriverError>;

    /// Child element by exact name/title attribute.
    async fn child_by_name(
        &self,
        name: &str,
        role: Role,
        timeout: Duration,
    ) -> Result<Box<dyn DesktopElement>, DriverError>;

    /// Every descendant with the given role, in tree order.
    async fn children_with_role(
        &self,
        role: Role,
    ) -> Result<Vec<Box<dyn DesktopElement>>, DriverError>;

    /// Clear and retype whatever control currently holds focus inside
    /// this window (some pages focus their first input on load and only
    /// accept blind typing).
    async fn type_into_focused(&self, text: &str) -> Result<(), DriverError>;
}

/// A resolved control inside a window.
#[async_trait]
pub trait DesktopElement: std::fmt::Debug + Send + Sync {
    /// Visible text / name of the control.
    fn text(&self) -> String;

    async fn click(&self) -> Result<(), DriverError>;

    async fn type_text(&self, text: &str) -> Result<(), DriverError>;

    /// Paste the clipboard into the control (Ctrl+V), for fields that
    /// swallow direct keystroke injection.
    async fn paste(&self) -> Result<(), DriverError>;
}

/// Construct the platform's desktop driver. Only Windows ships a real
/// backend; everywhere else the caller gets [`DriverError::Unsupported`]
/// and the flows degrade to FAIL steps.
pub fn desktop() -> Result<Arc<dyn DesktopDriver>, DriverError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsDriver::new()?))
    }
    #[cfg(not(target_os = "windows"))]
    {
        Err(DriverError::Unsupported)
    }
}
