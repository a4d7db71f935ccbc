use std::time::Duration;

use eoka::{Browser, Page};
use tracing::debug;

use crate::config::BrowserConfig;
use crate::Result;

/// Find a clickable element whose visible text contains the needle and
/// return a CSS selector for it.
const FIND_CLICKABLE_BY_TEXT_JS: &str = r#"(() => {
    const needle = __NEEDLE__.toLowerCase();
    const cssPath = (el) => {
        if (el.id) return '#' + CSS.escape(el.id);
        const path = [];
        let node = el;
        while (node && node !== document.body) {
            let sel = node.tagName.toLowerCase();
            if (node.id) { path.unshift('#' + CSS.escape(node.id)); break; }
            const kids = node.parentNode ? Array.from(node.parentNode.children) : [];
            if (kids.length > 1) sel += ':nth-child(' + (kids.indexOf(node) + 1) + ')';
            path.unshift(sel);
            node = node.parentNode;
        }
        return path.join(' > ');
    };
    const clickables = document.querySelectorAll(
        'a, button, input[type="button"], input[type="submit"], [role="button"], [onclick]');
    for (const el of clickables) {
        const text = (el.innerText || el.value || '').trim().toLowerCase();
        if (text.includes(needle)) return cssPath(el);
    }
    return null;
})()"#;

/// Record window.alert/confirm calls so a later poll can "accept" them.
/// Hooks live in the current document only; a navigation clears them.
const DIALOG_HOOKS_JS: &str = r#"(() => {
    if (window.__signetDialog !== undefined) return;
    window.__signetDialog = null;
    window.alert = (m) => { window.__signetDialog = String(m); };
    window.confirm = (m) => { window.__signetDialog = String(m); return true; };
})()"#;

const TAKE_DIALOG_JS: &str = r#"(() => {
    const d = window.__signetDialog;
    if (d !== null && d !== undefined) { window.__signetDialog = null; return d; }
    return null;
})()"#;

/// An exclusively-owned browser session.
///
/// Thin wrapper over the automation backend's browser/page pair; the flow
/// that opens it is responsible for closing it, once, at end of run.
pub struct WebSession {
    browser: Browser,
    page: Page,
}

impl WebSession {
    /// Launch a browser and open a blank page.
    pub async fn open(config: &BrowserConfig) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport.as_ref().map(|v| v.width).unwrap_or(1280),
            viewport_height: config.viewport.as_ref().map(|v| v.height).unwrap_or(720),
            ..Default::default()
        };

        debug!("launching browser (headless: {})", config.headless);
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;
        Ok(Self { browser, page })
    }

    /// Navigate and re-install the dialog hooks in the new document.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        self.page.execute(DIALOG_HOOKS_JS).await?;
        Ok(())
    }

    /// Fill an input located by CSS selector.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.page.fill(selector, value).await?;
        Ok(())
    }

    /// Click an element located by CSS selector.
    pub async fn click(&self, selector: &str) -> Result<()> {
        self.page.click(selector).await?;
        Ok(())
    }

    /// Click the first clickable element whose visible text contains
    /// `text`. `Ok(false)` when nothing matches.
    pub async fn click_by_text(&self, text: &str) -> Result<bool> {
        let js = FIND_CLICKABLE_BY_TEXT_JS.replace("__NEEDLE__", &js_str(text));
        let selector: Option<String> = self.page.evaluate(&js).await?;
        match selector {
            Some(sel) => {
                debug!("clicking '{text}' via selector '{sel}'");
                self.page.click(&sel).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Wait for a selector to appear. `Ok(false)` on timeout.
    pub async fn wait_for(&self, selector: &str, wait: Duration) -> Result<bool> {
        match self.page.wait_for(selector, wait.as_millis() as u64).await {
            Ok(_) => Ok(true),
            Err(err) => {
                debug!("wait_for '{selector}' missed: {err}");
                Ok(false)
            }
        }
    }

    /// Inner text of the first element matching `selector`.
    pub async fn inner_text(&self, selector: &str) -> Result<Option<String>> {
        let js = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.innerText : null; }})()",
            js_str(selector)
        );
        let text: Option<String> = self.page.evaluate(&js).await?;
        Ok(text)
    }

    /// Poll for a recorded dialog for up to `timeout`; returns its message
    /// when one was pending. Best-effort: hooks do not survive navigation.
    pub async fn accept_dialog(&self, timeout: Duration) -> Result<Option<String>> {
        self.page.execute(DIALOG_HOOKS_JS).await?;
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let message: Option<String> = self.page.evaluate(TAKE_DIALOG_JS).await?;
            if message.is_some() {
                return Ok(message);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    /// Close the browser. Consumes the session so it can only happen once.
    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".into())
}
