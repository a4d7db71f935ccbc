//! Element resolution with ordered fallback.
//!
//! A semantic target ("the Scan button") carries a list of strategies
//! tried in sequence; the first one that yields an element wins. The
//! usual chain is a stable-identifier lookup followed by a scan of every
//! control of the expected role for one whose visible text contains a
//! fragment.

use std::time::Duration;

use tracing::debug;

use crate::driver::{DesktopElement, DesktopWindow, DriverError, Role};

/// A single way to resolve a control.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Stable automation identifier.
    ById { id: String, role: Role },
    /// Exact name/title attribute.
    ByName { name: String, role: Role },
    /// First element of `role` whose visible text contains `fragment`.
    ScanByText { fragment: String, role: Role },
    /// First element of `role`, whatever its text.
    FirstOfRole { role: Role },
}

/// A semantic control target: a display name plus the ordered strategies
/// used to find it.
#[derive(Debug, Clone)]
pub struct TargetSpec {
    describe: String,
    strategies: Vec<Strategy>,
}

impl TargetSpec {
    pub fn new(describe: impl Into<String>) -> Self {
        Self {
            describe: describe.into(),
            strategies: Vec::new(),
        }
    }

    pub fn describe(&self) -> &str {
        &self.describe
    }

    pub fn by_id(mut self, id: impl Into<String>, role: Role) -> Self {
        self.strategies.push(Strategy::ById {
            id: id.into(),
            role,
        });
        self
    }

    pub fn by_name(mut self, name: impl Into<String>, role: Role) -> Self {
        self.strategies.push(Strategy::ByName {
            name: name.into(),
            role,
        });
        self
    }

    pub fn scan_text(mut self, fragment: impl Into<String>, role: Role) -> Self {
        self.strategies.push(Strategy::ScanByText {
            fragment: fragment.into(),
            role,
        });
        self
    }

    pub fn first_of_role(mut self, role: Role) -> Self {
        self.strategies.push(Strategy::FirstOfRole { role });
        self
    }
}

/// Try each strategy in order; the first element found wins. Strategy
/// errors are treated as misses so a throwing primary lookup still falls
/// through to the scan.
pub async fn resolve(
    window: &dyn DesktopWindow,
    spec: &TargetSpec,
    timeout: Duration,
) -> Result<Box<dyn DesktopElement>, DriverError> {
    for (i, strategy) in spec.strategies.iter().enumerate() {
        match try_strategy(window, strategy, timeout).await {
            Ok(Some(element)) => {
                debug!(
                    "resolved {} via strategy {} ({strategy:?})",
                    spec.describe,
                    i + 1
                );
                return Ok(element);
            }
            Ok(None) => debug!("strategy {} missed for {}", i + 1, spec.describe),
            Err(err) => debug!("strategy {} failed for {}: {err}", i + 1, spec.describe),
        }
    }
    Err(DriverError::ElementNotFound(spec.describe.clone()))
}

async fn try_strategy(
    window: &dyn DesktopWindow,
    strategy: &Strategy,
    timeout: Duration,
) -> Result<Option<Box<dyn DesktopElement>>, DriverError> {
    match strategy {
        Strategy::ById { id, role } => window.child_by_id(id, *role, timeout).await.map(Some),
        Strategy::ByName { name, role } => {
            window.child_by_name(name, *role, timeout).await.map(Some)
        }
        Strategy::ScanByText { fragment, role } => {
            let elements = window.children_with_role(*role).await?;
            Ok(elements
                .into_iter()
                .find(|e| e.text().contains(fragment.as_str())))
        }
        Strategy::FirstOfRole { role } => {
            let mut elements = window.children_with_role(*role).await?;
            if elements.is_empty() {
                Ok(None)
            } else {
                Ok(Some(elements.remove(0)))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted control: a label and a shared click counter.
    #[derive(Clone, Debug)]
    pub(crate) struct FakeElement {
        pub text: String,
        pub clicks: Arc<AtomicUsize>,
        pub typed: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl FakeElement {
        pub fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                clicks: Arc::new(AtomicUsize::new(0)),
                typed: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl DesktopElement for FakeElement {
        fn text(&self) -> String {
            self.text.clone()
        }

        async fn click(&self) -> Result<(), DriverError> {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn type_text(&self, text: &str) -> Result<(), DriverError> {
            self.typed.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn paste(&self) -> Result<(), DriverError> {
            self.typed.lock().unwrap().push("<paste>".into());
            Ok(())
        }
    }

    /// Scripted window: id lookups either resolve or throw; role scans
    /// return a fixed element list.
    #[derive(Default)]
    pub(crate) struct FakeWindow {
        pub by_id: HashMap<String, FakeElement>,
        pub by_name: HashMap<String, FakeElement>,
        pub buttons: Vec<FakeElement>,
        pub edits: Vec<FakeElement>,
    }

    #[async_trait]
    impl DesktopWindow for FakeWindow {
        async fn focus(&self) -> Result<(), DriverError> {
            Ok(())
        }

        async fn child_by_id(
            &self,
            id: &str,
            _role: Role,
            _timeout: Duration,
        ) -> Result<Box<dyn DesktopElement>, DriverError> {
            self.by_id
                .get(id)
                .map(|e| Box::new(e.clone()) as Box<dyn DesktopElement>)
                .ok_or_else(|| DriverError::ElementNotFound(format!("automation id '{id}'")))
        }

        async fn child_by_name(
            &self,
            name: &str,
            _role: Role,
            _timeout: Duration,
        ) -> Result<Box<dyn DesktopElement>, DriverError> {
            self.by_name
                .get(name)
                .map(|e| Box::new(e.clone()) as Box<dyn DesktopElement>)
                .ok_or_else(|| DriverError::ElementNotFound(format!("name '{name}'")))
        }

        async fn children_with_role(
            &self,
            role: Role,
        ) -> Result<Vec<Box<dyn DesktopElement>>, DriverError> {
            let pool = match role {
                Role::Button => &self.buttons,
                Role::Edit => &self.edits,
            };
            Ok(pool
                .iter()
                .map(|e| Box::new(e.clone()) as Box<dyn DesktopElement>)
                .collect())
        }

        async fn type_into_focused(&self, _text: &str) -> Result<(), DriverError> {
            Ok(())
        }
    }

    fn timeout() -> Duration {
        Duration::from_millis(10)
    }

    #[tokio::test]
    async fn primary_id_lookup_wins_when_present() {
        let mut window = FakeWindow::default();
        window.by_id.insert("scanBtn".into(), FakeElement::new("Scan"));
        window.buttons.push(FakeElement::new("Scan Now"));

        let spec = TargetSpec::new("Scan button")
            .by_id("scanBtn", Role::Button)
            .scan_text("Scan", Role::Button);
        let element = resolve(&window, &spec, timeout()).await.unwrap();
        assert_eq!(element.text(), "Scan");
    }

    #[tokio::test]
    async fn failing_id_lookup_falls_back_to_text_scan() {
        let mut window = FakeWindow::default();
        window.buttons.push(FakeElement::new("Copy"));
        window.buttons.push(FakeElement::new("Scan Now"));
        window.buttons.push(FakeElement::new("Settings"));

        let spec = TargetSpec::new("Scan button")
            .by_id("does-not-exist", Role::Button)
            .scan_text("Scan", Role::Button);
        let element = resolve(&window, &spec, timeout()).await.unwrap();
        assert_eq!(element.text(), "Scan Now");
    }

    #[tokio::test]
    async fn first_of_role_falls_back_to_first_edit() {
        let mut window = FakeWindow::default();
        window.edits.push(FakeElement::new("username"));
        window.edits.push(FakeElement::new("password"));

        let spec = TargetSpec::new("password field")
            .by_id("password", Role::Edit)
            .first_of_role(Role::Edit);
        let element = resolve(&window, &spec, timeout()).await.unwrap();
        assert_eq!(element.text(), "username");
    }

    #[tokio::test]
    async fn exhausted_chain_reports_element_not_found() {
        let window = FakeWindow::default();
        let spec = TargetSpec::new("Return Home button")
            .by_name("Return Home", Role::Button)
            .scan_text("Return Home", Role::Button);
        let err = resolve(&window, &spec, timeout()).await.unwrap_err();
        match err {
            DriverError::ElementNotFound(what) => assert_eq!(what, "Return Home button"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn scan_prefers_document_order() {
        let mut window = FakeWindow::default();
        window.buttons.push(FakeElement::new("Sign in with mobile"));
        window.buttons.push(FakeElement::new("Sign in"));

        let spec = TargetSpec::new("sign-in button").scan_text("Sign in", Role::Button);
        let element = resolve(&window, &spec, timeout()).await.unwrap();
        assert_eq!(element.text(), "Sign in with mobile");
    }
}
