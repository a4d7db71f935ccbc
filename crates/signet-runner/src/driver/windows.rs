//! Windows desktop backend on top of UI Automation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::task;
use tracing::debug;
use uiautomation::controls::ControlType;
use uiautomation::{UIAutomation, UIElement};

use super::{DesktopDriver, DesktopElement, DesktopWindow, DriverError, Role};

const READY_POLL: Duration = Duration::from_millis(200);
const KEY_INTERVAL_MS: u64 = 20;

// UI Automation COM pointers carry thread affinity; calls run inside
// spawn_blocking and the handles cross threads through these wrappers.
#[derive(Clone)]
struct SharedAutomation(Arc<UIAutomation>);
unsafe impl Send for SharedAutomation {}
unsafe impl Sync for SharedAutomation {}

#[derive(Clone)]
struct SharedElement(Arc<UIElement>);
unsafe impl Send for SharedElement {}
unsafe impl Sync for SharedElement {}

fn control_type(role: Role) -> ControlType {
    match role {
        Role::Button => ControlType::Button,
        Role::Edit => ControlType::Edit,
    }
}

fn platform_err(e: uiautomation::Error) -> DriverError {
    DriverError::Platform(e.to_string())
}

fn join_err(e: task::JoinError) -> DriverError {
    DriverError::Platform(format!("task join error: {e}"))
}

/// Block until the element reports enabled, up to `timeout`.
fn wait_ready(element: &UIElement, timeout: Duration) -> Result<(), DriverError> {
    let deadline = Instant::now() + timeout;
    loop {
        if element.is_enabled().unwrap_or(false) {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(DriverError::Timeout(format!(
                "element '{}' never became ready",
                element.get_name().unwrap_or_default()
            )));
        }
        std::thread::sleep(READY_POLL);
    }
}

pub(crate) struct WindowsDriver {
    automation: SharedAutomation,
}

impl WindowsDriver {
    pub(crate) fn new() -> Result<Self, DriverError> {
        let automation = UIAutomation::new().map_err(platform_err)?;
        Ok(Self {
            automation: SharedAutomation(Arc::new(automation)),
        })
    }
}

#[async_trait]
impl DesktopDriver for WindowsDriver {
    async fn launch_app(&self, query: &str) -> Result<(), DriverError> {
        let automation = self.automation.clone();
        let sequence = format!("{{Win}}{query}{{Enter}}");
        task::spawn_blocking(move || {
            let root = automation.0.get_root_element().map_err(platform_err)?;
            root.send_keys(&sequence, KEY_INTERVAL_MS * 3)
                .map_err(platform_err)
        })
        .await
        .map_err(join_err)?
    }

    async fn window(
        &self,
        title_fragment: &str,
        timeout: Duration,
    ) -> Result<Box<dyn DesktopWindow>, DriverError> {
        let automation = self.automation.clone();
        let fragment = title_fragment.to_string();
        let element = task::spawn_blocking(move || {
            automation
                .0
                .create_matcher()
                .control_type(ControlType::Window)
                .contains_name(&fragment)
                .depth(3)
                .timeout(timeout.as_millis() as u64)
                .find_first()
                .map_err(|e| DriverError::WindowNotFound(format!("title ~ '{fragment}': {e}")))
        })
        .await
        .map_err(join_err)??;

        Ok(Box::new(WindowsWindow {
            automation: self.automation.clone(),
            element: SharedElement(Arc::new(element)),
        }))
    }
}

struct WindowsWindow {
    automation: SharedAutomation,
    element: SharedElement,
}

impl WindowsWindow {
    async fn find_child(
        &self,
        role: Role,
        timeout: Duration,
        describe: String,
        predicate: impl Fn(&UIElement) -> bool + Send + Sync + 'static,
    ) -> Result<Box<dyn DesktopElement>, DriverError> {
        let automation = self.automation.clone();
        let root = self.element.clone();
        let element = task::spawn_blocking(move || {
            let found = automation
                .0
                .create_matcher()
                .from_ref(&root.0)
                .control_type(control_type(role))
                .depth(50)
                .timeout(timeout.as_millis() as u64)
                .filter_fn(Box::new(move |e: &UIElement| Ok(predicate(e))))
                .find_first()
                .map_err(|e| DriverError::ElementNotFound(format!("{describe}: {e}")))?;
            wait_ready(&found, timeout)?;
            Ok::<_, DriverError>(found)
        })
        .await
        .map_err(join_err)??;

        Ok(Box::new(WindowsElement {
            element: SharedElement(Arc::new(element)),
        }))
    }
}

#[async_trait]
impl DesktopWindow for WindowsWindow {
    async fn focus(&self) -> Result<(), DriverError> {
        let element = self.element.clone();
        task::spawn_blocking(move || element.0.set_focus().map_err(platform_err))
            .await
            .map_err(join_err)?
    }

    async fn child_by_id(
        &self,
        id: &str,
        role: Role,
        timeout: Duration,
    ) -> Result<Box<dyn DesktopElement>, DriverError> {
        debug!("searching child by automation id '{id}'");
        let id = id.to_string();
        let describe = format!("automation id '{id}'");
        self.find_child(role, timeout, describe, move |e| {
            e.get_automation_id().map(|v| v == id).unwrap_or(false)
        })
        .await
    }

    async fn child_by_name(
        &self,
        name: &str,
        role: Role,
        timeout: Duration,
    ) -> Result<Box<dyn DesktopElement>, DriverError> {
        debug!("searching child by name '{name}'");
        let name = name.to_string();
        let describe = format!("name '{name}'");
        self.find_child(role, timeout, describe, move |e| {
            e.get_name().map(|v| v == name).unwrap_or(false)
        })
        .await
    }

    async fn children_with_role(
        &self,
        role: Role,
    ) -> Result<Vec<Box<dyn DesktopElement>>, DriverError> {
        let automation = self.automation.clone();
        let root = self.element.clone();
        let elements = task::spawn_blocking(move || {
            automation
                .0
                .create_matcher()
                .from_ref(&root.0)
                .control_type(control_type(role))
                .depth(50)
                .find_all()
                .map_err(|e| DriverError::ElementNotFound(format!("role scan: {e}")))
        })
        .await
        .map_err(join_err)??;

        Ok(elements
            .into_iter()
            .map(|e| {
                Box::new(WindowsElement {
                    element: SharedElement(Arc::new(e)),
                }) as Box<dyn DesktopElement>
            })
            .collect())
    }

    async fn type_into_focused(&self, text: &str) -> Result<(), DriverError> {
        let element = self.element.clone();
        let text = text.to_string();
        task::spawn_blocking(move || {
            element.0.set_focus().map_err(platform_err)?;
            element
                .0
                .send_keys("{Ctrl}a{Backspace}", KEY_INTERVAL_MS)
                .map_err(platform_err)?;
            element
                .0
                .send_keys(&text, KEY_INTERVAL_MS)
                .map_err(platform_err)
        })
        .await
        .map_err(join_err)?
    }
}

struct WindowsElement {
    element: SharedElement,
}

impl std::fmt::Debug for WindowsElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowsElement").finish_non_exhaustive()
    }
}

#[async_trait]
impl DesktopElement for WindowsElement {
    fn text(&self) -> String {
        self.element.0.get_name().unwrap_or_default()
    }

    async fn click(&self) -> Result<(), DriverError> {
        let element = self.element.clone();
        task::spawn_blocking(move || element.0.click().map_err(platform_err))
            .await
            .map_err(join_err)?
    }

    async fn type_text(&self, text: &str) -> Result<(), DriverError> {
        let element = self.element.clone();
        let text = text.to_string();
        task::spawn_blocking(move || {
            element.0.click().map_err(platform_err)?;
            element
                .0
                .send_keys(&text, KEY_INTERVAL_MS)
                .map_err(platform_err)
        })
        .await
        .map_err(join_err)?
    }

    async fn paste(&self) -> Result<(), DriverError> {
        let element = self.element.clone();
        task::spawn_blocking(move || {
            element.0.click().map_err(platform_err)?;
            element
                .0
                .send_keys("{Ctrl}v", KEY_INTERVAL_MS)
                .map_err(platform_err)
        })
        .await
        .map_err(join_err)?
    }
}
